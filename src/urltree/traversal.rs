//! Multi-match traversal used by flow selection.

use std::collections::HashMap;

use super::lookup::valued_wildcard;
use super::segment::split_url;
use super::{NormalizedUrl, UrlTree};

/// Every value met while descending, outermost first.
#[derive(Debug, Clone, PartialEq)]
pub struct TraversalResult<'a, V> {
    pub values: Vec<&'a V>,
    pub path_params: Option<HashMap<String, String>>,
    /// Pattern of the deepest node reached.
    pub normalized_url: String,
}

impl<'a, V> TraversalResult<'a, V> {
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl<V> UrlTree<V> {
    /// Descend like [`UrlTree::lookup`] but collect every enclosing wildcard
    /// value on the way, then the landed node's wildcard or own value.
    ///
    /// Never fails; no match is an empty `values`.
    pub fn traversal(&self, url: &str) -> TraversalResult<'_, V> {
        let mut current = &self.root;
        let mut values = Vec::new();
        let mut path_params: Option<HashMap<String, String>> = None;
        let mut normalized = NormalizedUrl::default();
        let mut landed = true;

        for segment in split_url(url) {
            if let Some(value) = valued_wildcard(current).and_then(|w| w.value()) {
                values.push(value);
            }

            if let Some(child) = current.constant_child(&segment) {
                normalized.push(segment.is_part_of_host, segment.value);
                current = child;
                continue;
            }

            match current.matching_parametric_child(segment.is_part_of_host) {
                Some(param) => {
                    if segment.path_parameter().is_none() {
                        path_params
                            .get_or_insert_with(HashMap::new)
                            .insert(param.name().to_string(), segment.value.to_string());
                    }
                    normalized.push_param(segment.is_part_of_host, param.name());
                    current = param.child();
                }
                None => {
                    landed = false;
                    break;
                }
            }
        }

        if landed {
            match valued_wildcard(current).and_then(|w| w.value()) {
                Some(value) => values.push(value),
                None => values.extend(current.value()),
            }
        }

        TraversalResult {
            values,
            path_params,
            normalized_url: normalized.finish(),
        }
    }
}
