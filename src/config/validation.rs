//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Reject endpoint URLs the tree cannot hold
//! - Validate value ranges (threshold > 0, window > 0, addresses parse)
//! - Detect duplicate plugin names per endpoint
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: GatewayConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system
//! - Overlapping endpoints are detected when the policy tree is built

use std::collections::HashSet;
use std::net::SocketAddr;

use thiserror::Error;

use crate::config::schema::{GatewayConfig, PluginConfig};
use crate::urltree::{validate_url, Method, UrlTreeError};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("unknown HTTP method '{method}' for '{url}'")]
    UnknownMethod { method: String, url: String },

    #[error("invalid URL: {0}")]
    InvalidUrl(#[from] UrlTreeError),

    #[error("urltree.max_split_threshold must be greater than zero")]
    ZeroSplitThreshold,

    #[error("discovery.window_secs must be greater than zero")]
    ZeroDiscoveryWindow,

    #[error("plugin on '{url}' has an empty {field}")]
    EmptyPluginField { url: String, field: &'static str },

    #[error("plugin name '{name}' is used twice on '{url}'")]
    DuplicatePluginName { url: String, name: String },

    #[error("admin.api_key must be set when the admin API is enabled")]
    MissingAdminKey,

    #[error("{field} '{value}' is not a socket address")]
    InvalidAddress { field: &'static str, value: String },
}

/// Validate a parsed configuration, collecting every problem found.
pub fn validate_config(config: &GatewayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.urltree.max_split_threshold == 0 {
        errors.push(ValidationError::ZeroSplitThreshold);
    }

    for endpoint in &config.endpoints {
        check_endpoint(&endpoint.method, &endpoint.url, &mut errors);
        let plugins = endpoint.remedies.iter().chain(&endpoint.diagnoses);
        check_plugins(&endpoint.url, plugins, &mut errors);
    }
    let global = config.global.remedies.iter().chain(&config.global.diagnoses);
    check_plugins("global", global, &mut errors);

    if config.discovery.enabled && config.discovery.window_secs == 0 {
        errors.push(ValidationError::ZeroDiscoveryWindow);
    }
    for known in &config.discovery.known_endpoints {
        check_endpoint(&known.method, &known.url, &mut errors);
    }

    if config.admin.enabled {
        if config.admin.api_key.is_empty() {
            errors.push(ValidationError::MissingAdminKey);
        }
        check_address("admin.bind_address", &config.admin.bind_address, &mut errors);
    }
    if config.observability.metrics_enabled {
        check_address(
            "observability.metrics_address",
            &config.observability.metrics_address,
            &mut errors,
        );
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_endpoint(method: &str, url: &str, errors: &mut Vec<ValidationError>) {
    if !Method::new(method).is_standard() {
        errors.push(ValidationError::UnknownMethod {
            method: method.to_string(),
            url: url.to_string(),
        });
    }
    if let Err(e) = validate_url(url) {
        errors.push(e.into());
    }
}

fn check_plugins<'a>(
    url: &str,
    plugins: impl Iterator<Item = &'a PluginConfig>,
    errors: &mut Vec<ValidationError>,
) {
    let mut seen = HashSet::new();
    for plugin in plugins {
        if plugin.name.is_empty() {
            errors.push(ValidationError::EmptyPluginField {
                url: url.to_string(),
                field: "name",
            });
        } else if !seen.insert(plugin.name.as_str()) {
            errors.push(ValidationError::DuplicatePluginName {
                url: url.to_string(),
                name: plugin.name.clone(),
            });
        }
        if plugin.kind.is_empty() {
            errors.push(ValidationError::EmptyPluginField {
                url: url.to_string(),
                field: "type",
            });
        }
    }
}

fn check_address(field: &'static str, value: &str, errors: &mut Vec<ValidationError>) {
    if value.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidAddress {
            field,
            value: value.to_string(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::EndpointConfig;

    fn plugin(name: &str, kind: &str) -> PluginConfig {
        PluginConfig {
            name: name.to_string(),
            kind: kind.to_string(),
            enabled: true,
            options: Default::default(),
        }
    }

    #[test]
    fn test_default_config_is_valid() {
        assert_eq!(validate_config(&GatewayConfig::default()), Ok(()));
    }

    #[test]
    fn test_collects_all_errors() {
        let mut config = GatewayConfig::default();
        config.urltree.max_split_threshold = 0;
        config.endpoints.push(EndpointConfig {
            method: "FETCH".to_string(),
            url: "api.io/a/*/b".to_string(),
            remedies: vec![plugin("cache", "caching"), plugin("cache", "throttling")],
            diagnoses: vec![],
        });
        config.admin.enabled = true;

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 5);
        assert!(errors.contains(&ValidationError::ZeroSplitThreshold));
        assert!(errors.contains(&ValidationError::MissingAdminKey));
        assert!(errors.contains(&ValidationError::DuplicatePluginName {
            url: "api.io/a/*/b".to_string(),
            name: "cache".to_string(),
        }));
        assert!(errors
            .iter()
            .any(|e| matches!(e, ValidationError::InvalidUrl(UrlTreeError::MisplacedWildcard { .. }))));
        assert!(errors
            .iter()
            .any(|e| matches!(e, ValidationError::UnknownMethod { .. })));
    }

    #[test]
    fn test_same_plugin_name_on_different_endpoints_is_fine() {
        let mut config = GatewayConfig::default();
        for url in ["api.io/a", "api.io/b"] {
            config.endpoints.push(EndpointConfig {
                method: "get".to_string(),
                url: url.to_string(),
                remedies: vec![plugin("cache", "caching")],
                diagnoses: vec![],
            });
        }
        assert_eq!(validate_config(&config), Ok(()));
    }

    #[test]
    fn test_bad_metrics_address() {
        let mut config = GatewayConfig::default();
        config.observability.metrics_enabled = true;
        config.observability.metrics_address = "localhost".to_string();
        assert_eq!(
            validate_config(&config),
            Err(vec![ValidationError::InvalidAddress {
                field: "observability.metrics_address",
                value: "localhost".to_string(),
            }])
        );
    }
}
