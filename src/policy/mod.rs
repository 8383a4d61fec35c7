//! Policy subsystem.
//!
//! # Data Flow
//! ```text
//! GatewayConfig.endpoints
//!     → tree.rs (method-keyed policy tree, overlap checks)
//!     → store.rs (versioned snapshot behind ArcSwap)
//!     → dispatcher.rs (method + URL → ordered remedies and diagnoses)
//! ```
//!
//! # Design Decisions
//! - A snapshot is never mutated; a reload builds a new one and swaps it in
//! - A failed reload leaves the active snapshot untouched
//! - Endpoint plugins run before global plugins

pub mod dispatcher;
pub mod store;
pub mod tree;

use thiserror::Error;

use crate::config::PluginConfig;
use crate::urltree::{Method, UrlTreeError};

pub use dispatcher::{PluginKind, PolicyDispatcher, Resolution, ScopedPlugin};
pub use store::{PolicySnapshot, PolicyStore};
pub use tree::build_endpoint_policy_tree;

/// Plugins attached to one method at one URL pattern.
#[derive(Debug, Clone, PartialEq)]
pub struct EndpointPolicy {
    pub method: Method,
    /// Pattern as first declared.
    pub url: String,
    pub remedies: Vec<PluginConfig>,
    pub diagnoses: Vec<PluginConfig>,
}

impl EndpointPolicy {
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            remedies: Vec::new(),
            diagnoses: Vec::new(),
        }
    }

    pub fn enabled_remedies(&self) -> impl Iterator<Item = &PluginConfig> {
        self.remedies.iter().filter(|plugin| plugin.enabled)
    }

    pub fn enabled_diagnoses(&self) -> impl Iterator<Item = &PluginConfig> {
        self.diagnoses.iter().filter(|plugin| plugin.enabled)
    }
}

#[derive(Debug, Error)]
pub enum PolicyError {
    #[error(transparent)]
    Tree(#[from] UrlTreeError),

    #[error(
        "{method} {url} overlaps {method} {existing}: both enable a {kind} '{plugin_type}'"
    )]
    OverlappingEndpoint {
        method: Method,
        url: String,
        existing: String,
        kind: PluginKind,
        plugin_type: String,
    },
}
