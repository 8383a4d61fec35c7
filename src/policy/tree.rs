//! Policy tree construction.

use crate::config::{EndpointConfig, PluginConfig};
use crate::urltree::{try_extract_path_parameter, EndpointTree, Method};

use super::{EndpointPolicy, PluginKind, PolicyError};

/// Build the method-keyed policy tree from endpoint declarations.
///
/// Before each insert the URL is looked up twice against what is already
/// built: as written, so `{…}` queries meet any parametric child, and as a
/// concrete instance, so an enclosing wildcard is found too. When either
/// lands on a policy for the same method that enables a remedy (or
/// diagnosis) of the same type, the build fails: a transaction could not tell
/// which of the two applies. Declarations of the same method and pattern with
/// disjoint types are merged.
pub fn build_endpoint_policy_tree(
    endpoints: &[EndpointConfig],
) -> Result<EndpointTree<EndpointPolicy>, PolicyError> {
    let mut tree: EndpointTree<EndpointPolicy> = EndpointTree::new();

    for endpoint in endpoints {
        let method = Method::new(&endpoint.method);

        let concrete = concrete_instance(&endpoint.url);
        for candidate in [endpoint.url.as_str(), concrete.as_str()] {
            let Some(existing) = tree.lookup(&method, candidate) else {
                continue;
            };
            let existing = existing.value;
            let conflict = shared_enabled_type(&existing.remedies, &endpoint.remedies)
                .map(|t| (PluginKind::Remedy, t))
                .or_else(|| {
                    shared_enabled_type(&existing.diagnoses, &endpoint.diagnoses)
                        .map(|t| (PluginKind::Diagnosis, t))
                });
            if let Some((kind, plugin_type)) = conflict {
                return Err(PolicyError::OverlappingEndpoint {
                    method,
                    url: endpoint.url.clone(),
                    existing: existing.url.clone(),
                    kind,
                    plugin_type: plugin_type.to_string(),
                });
            }
        }

        let policy = tree.get_or_insert_with(method.clone(), &endpoint.url, || {
            EndpointPolicy::new(method, endpoint.url.as_str())
        })?;
        policy.remedies.extend(endpoint.remedies.iter().cloned());
        policy.diagnoses.extend(endpoint.diagnoses.iter().cloned());

        log_enabled_plugins(endpoint);
    }

    Ok(tree)
}

/// Stand-in value for a declared parameter. Matches no constant, so the
/// lookup takes a parametric child or falls back to an enclosing wildcard.
const PARAM_PLACEHOLDER: &str = "\0";

/// `url` with every `{name}` part replaced by [`PARAM_PLACEHOLDER`].
fn concrete_instance(url: &str) -> String {
    let fill = |part: &str| -> String {
        match try_extract_path_parameter(part) {
            Some(_) => PARAM_PLACEHOLDER.to_string(),
            None => part.to_string(),
        }
    };
    let (host, path) = match url.split_once('/') {
        Some((host, path)) => (host, Some(path)),
        None => (url, None),
    };

    let host = host.split('.').map(fill).collect::<Vec<_>>().join(".");
    match path {
        Some(path) => format!("{host}/{}", path.split('/').map(fill).collect::<Vec<_>>().join("/")),
        None => host,
    }
}

fn shared_enabled_type<'a>(existing: &[PluginConfig], incoming: &'a [PluginConfig]) -> Option<&'a str> {
    incoming
        .iter()
        .filter(|plugin| plugin.enabled)
        .find(|plugin| {
            existing
                .iter()
                .any(|other| other.enabled && other.kind == plugin.kind)
        })
        .map(|plugin| plugin.kind.as_str())
}

fn log_enabled_plugins(endpoint: &EndpointConfig) {
    let enabled: Vec<&str> = endpoint
        .remedies
        .iter()
        .chain(&endpoint.diagnoses)
        .filter(|plugin| plugin.enabled)
        .map(|plugin| plugin.name.as_str())
        .collect();
    if !enabled.is_empty() {
        tracing::info!(
            method = %endpoint.method,
            url = %endpoint.url,
            plugins = ?enabled,
            "Enabled plugins for endpoint"
        );
    }
}
