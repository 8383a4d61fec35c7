//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the gateway.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

use crate::urltree::UrlTreeConfig;

/// Root configuration for the gateway control plane.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default)]
pub struct GatewayConfig {
    /// Settings of the discovery tree.
    pub urltree: UrlTreeConfig,

    /// Per-endpoint policies.
    pub endpoints: Vec<EndpointConfig>,

    /// Plugins applied to every transaction after endpoint plugins.
    pub global: GlobalPolicyConfig,

    /// Traffic discovery aggregation.
    pub discovery: DiscoveryConfig,

    /// HAR path obfuscation.
    pub obfuscation: ObfuscationConfig,

    pub admin: AdminConfig,

    pub observability: ObservabilityConfig,
}

/// A method and URL pattern with the plugins attached to it.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct EndpointConfig {
    /// HTTP method, case-insensitive.
    pub method: String,

    /// Pattern such as `api.example.com/users/{id}` or `api.example.com/*`.
    pub url: String,

    #[serde(default)]
    pub remedies: Vec<PluginConfig>,

    #[serde(default)]
    pub diagnoses: Vec<PluginConfig>,
}

/// A remedy or diagnosis plugin declaration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct PluginConfig {
    /// Unique name within the endpoint.
    pub name: String,

    /// Plugin type, e.g. `caching` or `har_exporter`.
    #[serde(rename = "type")]
    pub kind: String,

    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Plugin-specific options, passed through untouched.
    #[serde(default)]
    pub options: serde_json::Map<String, serde_json::Value>,
}

fn default_enabled() -> bool {
    true
}

/// Global plugins.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default)]
pub struct GlobalPolicyConfig {
    pub remedies: Vec<PluginConfig>,
    pub diagnoses: Vec<PluginConfig>,
}

/// Discovery aggregation settings.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct DiscoveryConfig {
    pub enabled: bool,

    /// Length of one aggregation window in seconds.
    pub window_secs: u64,

    /// Endpoints declared up front; traffic is aggregated under their
    /// patterns instead of inferred ones.
    pub known_endpoints: Vec<KnownEndpointConfig>,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            window_secs: 60,
            known_endpoints: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct KnownEndpointConfig {
    pub method: String,
    pub url: String,
}

/// HAR path obfuscation settings.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default)]
pub struct ObfuscationConfig {
    pub enabled: bool,

    /// Path parameters left in clear text.
    pub excluded_path_params: Vec<String>,
}

/// Admin API settings.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct AdminConfig {
    pub enabled: bool,

    /// Bind address (e.g., "127.0.0.1:8081").
    pub bind_address: String,

    /// Bearer token required on every admin request.
    pub api_key: String,
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            bind_address: "127.0.0.1:8081".to_string(),
            api_key: String::new(),
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Default filter when `RUST_LOG` is unset.
    pub log_level: String,

    /// Enable the Prometheus scrape endpoint.
    pub metrics_enabled: bool,

    /// Metrics listener address (e.g., "0.0.0.0:9090").
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
