//! Gateway engine library.
//!
//! Adaptive URL tree plus the control plane built on it: policy dispatch,
//! traffic discovery, HAR path obfuscation and flow filter selection.

// Core
pub mod urltree;

// Control plane
pub mod discovery;
pub mod flows;
pub mod obfuscation;
pub mod policy;

// Cross-cutting concerns
pub mod admin;
pub mod config;
pub mod lifecycle;
pub mod observability;

pub use config::schema::GatewayConfig;
pub use discovery::Discovery;
pub use lifecycle::Shutdown;
pub use policy::{PolicyDispatcher, PolicyStore};
pub use urltree::{EndpointTree, Method, UrlTree, UrlTreeConfig, UrlTreeError};
