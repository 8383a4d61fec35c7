//! URL path obfuscation guided by the policy tree.
//!
//! Path parts the tree recognizes as constants stay readable. Parts that
//! fill a path parameter are hashed unless the parameter is excluded. From
//! the first part the tree does not explain onwards, everything is hashed.

use std::collections::HashSet;

use crate::config::ObfuscationConfig;
use crate::urltree::{try_extract_path_parameter, UrlTree};

use super::obfuscate_string;

#[derive(Debug, Clone, Default)]
pub struct PathObfuscator {
    enabled: bool,
    excluded_path_params: HashSet<String>,
}

impl PathObfuscator {
    pub fn new(config: &ObfuscationConfig) -> Self {
        Self {
            enabled: config.enabled,
            excluded_path_params: config.excluded_path_params.iter().cloned().collect(),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    fn should_obfuscate_param(&self, name: &str) -> bool {
        !self.excluded_path_params.contains(name)
    }

    /// Obfuscate `path` (as requested on `host`) against `tree`.
    ///
    /// Returns the path unchanged when obfuscation is disabled, otherwise a
    /// `/`-rooted path with the same number of parts.
    pub fn obfuscate_path<V>(&self, tree: &UrlTree<V>, host: &str, path: &str) -> String {
        if !self.enabled {
            return path.to_string();
        }

        let clean_path = path.trim_matches('/');
        let lookup = tree.lookup(&format!("{host}/{clean_path}"));
        let known_parts: Vec<&str> = lookup
            .normalized_url
            .trim_matches('/')
            .split('/')
            .skip(1)
            .collect();

        let mut diverged = false;
        let mut parts = Vec::new();
        for (index, current) in clean_path.split('/').filter(|p| !p.is_empty()).enumerate() {
            let known = known_parts.get(index).copied().unwrap_or_default();
            if !diverged {
                if current == known {
                    parts.push(current.to_string());
                    continue;
                }
                // The pattern is aligned with the request, so the part itself
                // is the parameter value, matched or not.
                if let Some(name) = try_extract_path_parameter(known) {
                    if self.should_obfuscate_param(name) {
                        parts.push(obfuscate_string(current));
                    } else {
                        parts.push(current.to_string());
                    }
                    continue;
                }
                diverged = true;
            }
            parts.push(obfuscate_string(current));
        }

        format!("/{}", parts.join("/"))
    }
}
