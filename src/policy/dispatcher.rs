//! Resolution of a transaction to the plugins that handle it.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde::Serialize;

use crate::config::PluginConfig;
use crate::observability::metrics;
use crate::urltree::Method;

use super::PolicyStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PluginKind {
    Remedy,
    Diagnosis,
}

impl fmt::Display for PluginKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PluginKind::Remedy => f.write_str("remedy"),
            PluginKind::Diagnosis => f.write_str("diagnosis"),
        }
    }
}

/// A plugin bound to the method and pattern it runs for.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScopedPlugin {
    pub name: String,
    #[serde(rename = "type")]
    pub plugin_type: String,
    pub kind: PluginKind,
    pub method: Method,
    pub url: String,
    pub global: bool,
    pub options: serde_json::Map<String, serde_json::Value>,
}

/// Plugins to run for one transaction, in order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Resolution {
    pub policy_version: u64,
    pub matched: bool,
    /// Matched pattern, or the request URL when no endpoint matched.
    pub normalized_url: String,
    pub path_params: HashMap<String, String>,
    pub remedies: Vec<ScopedPlugin>,
    pub diagnoses: Vec<ScopedPlugin>,
}

#[derive(Debug, Clone)]
pub struct PolicyDispatcher {
    store: Arc<PolicyStore>,
}

impl PolicyDispatcher {
    pub fn new(store: Arc<PolicyStore>) -> Self {
        Self { store }
    }

    /// Endpoint plugins first (enabled only), then global ones.
    pub fn resolve(&self, method: &Method, url: &str) -> Resolution {
        let snapshot = self.store.load();
        let hit = snapshot.tree.lookup(method, url);
        metrics::record_policy_lookup(hit.is_some());

        let mut resolution = Resolution {
            policy_version: snapshot.version,
            matched: hit.is_some(),
            normalized_url: url.to_string(),
            path_params: HashMap::new(),
            remedies: Vec::new(),
            diagnoses: Vec::new(),
        };

        if let Some(hit) = hit {
            resolution.normalized_url = hit.normalized_url;
            resolution.path_params = hit.path_params;
            let scope = Scope::new(method, &resolution.normalized_url, false);
            resolution
                .remedies
                .extend(hit.value.enabled_remedies().map(|p| scope.bind(p, PluginKind::Remedy)));
            resolution
                .diagnoses
                .extend(hit.value.enabled_diagnoses().map(|p| scope.bind(p, PluginKind::Diagnosis)));
        } else {
            tracing::debug!(method = %method, url = %url, "No endpoint policy matched");
        }

        let scope = Scope::new(method, &resolution.normalized_url, true);
        let global = &snapshot.global;
        resolution.remedies.extend(
            global
                .remedies
                .iter()
                .filter(|p| p.enabled)
                .map(|p| scope.bind(p, PluginKind::Remedy)),
        );
        resolution.diagnoses.extend(
            global
                .diagnoses
                .iter()
                .filter(|p| p.enabled)
                .map(|p| scope.bind(p, PluginKind::Diagnosis)),
        );

        resolution
    }
}

struct Scope<'a> {
    method: &'a Method,
    url: String,
    global: bool,
}

impl<'a> Scope<'a> {
    fn new(method: &'a Method, url: &str, global: bool) -> Self {
        Self {
            method,
            url: url.to_string(),
            global,
        }
    }

    fn bind(&self, plugin: &PluginConfig, kind: PluginKind) -> ScopedPlugin {
        ScopedPlugin {
            name: plugin.name.clone(),
            plugin_type: plugin.kind.clone(),
            kind,
            method: self.method.clone(),
            url: self.url.clone(),
            global: self.global,
            options: plugin.options.clone(),
        }
    }
}
