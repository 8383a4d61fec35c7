//! Single best match lookup.
//!
//! # Responsibilities
//! - Resolve a concrete URL to the most specific registered value
//! - Capture parametric values and rebuild the matched pattern
//!
//! # Design Decisions
//! - Constant beats parametric beats wildcard, decided segment by segment
//! - The nearest enclosing wildcard is remembered and used only when
//!   descent gets stuck
//! - A `{name}` query segment queries parametric edges without capturing;
//!   it is how overlapping declarations are detected
//! - Never fails loudly: no match is `matched == false`

use std::collections::HashMap;

use super::node::Node;
use super::segment::{split_url, WILDCARD};
use super::{NormalizedUrl, UrlTree};

/// Outcome of [`UrlTree::lookup`].
#[derive(Debug, Clone, PartialEq)]
pub struct LookupResult<'a, V> {
    pub matched: bool,
    pub value: Option<&'a V>,
    /// `None` when nothing was captured.
    pub path_params: Option<HashMap<String, String>>,
    /// Pattern the URL resolved to, e.g. `twitter.com/user/{id}`.
    pub normalized_url: String,
}

impl<'a, V> LookupResult<'a, V> {
    fn found(value: &'a V, path_params: Option<HashMap<String, String>>, normalized: NormalizedUrl) -> Self {
        Self {
            matched: true,
            value: Some(value),
            path_params,
            normalized_url: normalized.finish(),
        }
    }

    fn not_found(normalized: NormalizedUrl) -> Self {
        Self {
            matched: false,
            value: None,
            path_params: None,
            normalized_url: normalized.finish(),
        }
    }

    /// Captured value of a path parameter.
    pub fn path_param(&self, name: &str) -> Option<&str> {
        self.path_params
            .as_ref()
            .and_then(|params| params.get(name))
            .map(String::as_str)
    }
}

/// Wildcard child that actually carries a value.
pub(crate) fn valued_wildcard<V>(node: &Node<V>) -> Option<&Node<V>> {
    node.wildcard_child().filter(|wildcard| wildcard.value.is_some())
}

impl<V> UrlTree<V> {
    /// Resolve `url` to its single best match.
    pub fn lookup(&self, url: &str) -> LookupResult<'_, V> {
        let mut current = &self.root;
        let mut path_params: Option<HashMap<String, String>> = None;
        let mut normalized = NormalizedUrl::default();
        // Nearest enclosing wildcard and the pattern length at its parent.
        let mut found_wildcard: Option<(&Node<V>, usize)> = None;

        for segment in split_url(url) {
            if let Some(wildcard) = valued_wildcard(current) {
                found_wildcard = Some((wildcard, normalized.len()));
            }

            if let Some(child) = current.constant_child(&segment) {
                normalized.push(segment.is_part_of_host, segment.value);
                current = child;
                continue;
            }

            let queried = segment.path_parameter();
            if let Some(param) = current.matching_parametric_child(segment.is_part_of_host) {
                match queried {
                    Some(name) if name != param.name() => tracing::warn!(
                        url = %url,
                        given = %name,
                        existing = %param.name(),
                        "Path parameter query does not match declared name"
                    ),
                    Some(_) => {}
                    None => {
                        path_params
                            .get_or_insert_with(HashMap::new)
                            .insert(param.name().to_string(), segment.value.to_string());
                    }
                }
                normalized.push_param(segment.is_part_of_host, param.name());
                current = param.child();
                continue;
            }

            if queried.is_some() {
                return LookupResult::not_found(normalized);
            }
            return match found_wildcard {
                Some((wildcard, prefix_len)) => {
                    wildcard_result(wildcard, prefix_len, path_params, normalized)
                }
                None => LookupResult::not_found(normalized),
            };
        }

        if let Some(wildcard) = valued_wildcard(current) {
            let prefix_len = normalized.len();
            return wildcard_result(wildcard, prefix_len, path_params, normalized);
        }
        if let Some(value) = current.value() {
            return LookupResult::found(value, path_params, normalized);
        }
        match found_wildcard {
            Some((wildcard, prefix_len)) => wildcard_result(wildcard, prefix_len, path_params, normalized),
            None => LookupResult::not_found(normalized),
        }
    }
}

fn wildcard_result<V>(
    wildcard: &Node<V>,
    prefix_len: usize,
    path_params: Option<HashMap<String, String>>,
    mut normalized: NormalizedUrl,
) -> LookupResult<'_, V> {
    normalized.truncate(prefix_len);
    normalized.push(wildcard.is_part_of_host, WILDCARD);
    match wildcard.value() {
        Some(value) => LookupResult::found(value, path_params, normalized),
        None => LookupResult::not_found(normalized),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct TestStruct {
        data: u32,
    }

    fn value(data: u32) -> TestStruct {
        TestStruct { data }
    }

    fn tree_with(entries: &[(&str, u32)]) -> UrlTree<TestStruct> {
        let mut tree = UrlTree::new();
        for (url, data) in entries {
            tree.insert(url, value(*data)).unwrap();
        }
        tree
    }

    fn params(pairs: &[(&str, &str)]) -> Option<HashMap<String, String>> {
        Some(
            pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        )
    }

    #[test]
    fn test_constant_endpoint_lookup() {
        let tree = tree_with(&[("twitter.com/user/1234", 1)]);
        let result = tree.lookup("twitter.com/user/1234");

        assert!(result.matched);
        assert_eq!(result.value, Some(&value(1)));
        assert_eq!(result.path_params, None);
        assert_eq!(result.normalized_url, "twitter.com/user/1234");
    }

    #[test]
    fn test_wildcard_endpoint_lookup() {
        let tree = tree_with(&[("twitter.com/user/*", 1)]);
        let result = tree.lookup("twitter.com/user/1234/messages");

        assert_eq!(result.value, Some(&value(1)));
        assert_eq!(result.normalized_url, "twitter.com/user/*");
    }

    #[test]
    fn test_prefix_matching_wildcard_lookup() {
        let tree = tree_with(&[("twitter.com/user/*", 1)]);
        let result = tree.lookup("twitter.com/user");

        assert_eq!(result.value, Some(&value(1)));
        assert_eq!(result.normalized_url, "twitter.com/user/*");
    }

    #[test]
    fn test_path_param_lookup_captures_value() {
        let tree = tree_with(&[("twitter.com/user/{userID}", 1)]);
        let result = tree.lookup("twitter.com/user/1234");

        assert_eq!(result.value, Some(&value(1)));
        assert_eq!(result.path_params, params(&[("userID", "1234")]));
        assert_eq!(result.path_param("userID"), Some("1234"));
        assert_eq!(result.normalized_url, "twitter.com/user/{userID}");
    }

    #[test]
    fn test_path_param_query_does_not_capture() {
        let tree = tree_with(&[("twitter.com/user/{userID}", 1)]);

        let same_name = tree.lookup("twitter.com/user/{userID}");
        assert_eq!(same_name.value, Some(&value(1)));
        assert_eq!(same_name.path_params, None);

        let other_name = tree.lookup("twitter.com/user/{uid}");
        assert_eq!(other_name.value, Some(&value(1)));
        assert_eq!(other_name.path_params, None);
        assert_eq!(other_name.normalized_url, "twitter.com/user/{userID}");
    }

    #[test]
    fn test_param_query_against_constant_endpoint_fails() {
        let tree = tree_with(&[("twitter.com/user/1234", 1)]);
        let result = tree.lookup("twitter.com/user/{userID}");
        assert!(!result.matched);
        assert_eq!(result.value, None);
    }

    #[test]
    fn test_param_query_ignores_enclosing_wildcard() {
        let tree = tree_with(&[("twitter.com/*", 1)]);
        assert!(!tree.lookup("twitter.com/{id}").matched);
        assert!(tree.lookup("twitter.com/user").matched);
    }

    #[test]
    fn test_mixed_endpoint_lookup() {
        let tree = tree_with(&[("twitter.com/user/1234/messages", 999), ("twitter.com/user/*", 888)]);

        let constant = tree.lookup("twitter.com/user/1234/messages");
        assert_eq!(constant.value, Some(&value(999)));

        let wildcard = tree.lookup("twitter.com/user/1234/messages/5678");
        assert_eq!(wildcard.value, Some(&value(888)));
        assert_eq!(wildcard.normalized_url, "twitter.com/user/*");
    }

    #[test]
    fn test_unmatched_lookups() {
        let constant = tree_with(&[("twitter.com/user/1234", 1)]);
        assert!(!constant.lookup("twitter.com/user/foobar").matched);

        let wildcard = tree_with(&[("twitter.com/user/*", 1)]);
        assert!(!wildcard.lookup("twitter.com/post/1234").matched);

        let param = tree_with(&[("twitter.com/user/{userID}", 1)]);
        let result = param.lookup("twitter.com/user/1234/messages");
        assert!(!result.matched);
        assert_eq!(result.value, None);
        assert_eq!(result.path_params, None);
    }

    #[test]
    fn test_unmatched_lookup_still_normalizes() {
        let tree = tree_with(&[("twitter.com/user/{userID}", 1)]);
        let result = tree.lookup("twitter.com/user/1234/messages");
        assert_eq!(result.normalized_url, "twitter.com/user/{userID}");
    }

    #[test]
    fn test_priority_constant_param_wildcard() {
        let tree = tree_with(&[
            ("host.com/user/1234", 1),
            ("host.com/user/*", 2),
            ("host.com/user/{id}", 3),
        ]);

        assert_eq!(tree.lookup("host.com/user/1234").value, Some(&value(1)));

        let param = tree.lookup("host.com/user/999");
        assert_eq!(param.value, Some(&value(3)));
        assert_eq!(param.path_params, params(&[("id", "999")]));

        let wildcard = tree.lookup("host.com/user/999/more");
        assert_eq!(wildcard.value, Some(&value(2)));
        assert_eq!(wildcard.normalized_url, "host.com/user/*");
    }

    #[test]
    fn test_node_with_value_and_wildcard_prefers_wildcard() {
        let tree = tree_with(&[("host.com/user", 1), ("host.com/user/*", 2)]);
        let result = tree.lookup("host.com/user");
        assert_eq!(result.value, Some(&value(2)));
        assert_eq!(result.normalized_url, "host.com/user/*");
    }

    #[test]
    fn test_wildcard_in_host_pattern() {
        let tree = tree_with(&[("{host}.com/user/1234/*", 1)]);
        let result = tree.lookup("twitter.com/user/1234/messages");

        assert_eq!(result.value, Some(&value(1)));
        assert_eq!(result.normalized_url, "{host}.com/user/1234/*");
        assert_eq!(result.path_params, params(&[("host", "twitter")]));
    }

    #[test]
    fn test_host_is_not_confused_with_path() {
        let tree = tree_with(&[("{host}.com/user/1234/*", 2)]);
        assert!(!tree.lookup("twitter/com/user/1234/messages").matched);

        let tree = tree_with(&[("api/v1/users", 3)]);
        assert!(!tree.lookup("api.v1/users").matched);
        assert!(tree.lookup("api/v1/users").matched);
    }

    #[test]
    fn test_bare_host_matches_host_wildcard() {
        let tree = tree_with(&[("twitter.com/*", 1)]);
        let result = tree.lookup("twitter.com");
        assert_eq!(result.value, Some(&value(1)));
        assert_eq!(result.normalized_url, "twitter.com/*");
    }

    #[test]
    fn test_normalization_round_trip() {
        let patterns = [
            "twitter.com/user/1234",
            "twitter.com/user/{userID}/posts",
            "{tenant}.shop.io/cart/{cartId}/*",
            "twitter.com/static/*",
        ];
        let mut tree = UrlTree::new();
        for (i, pattern) in patterns.iter().enumerate() {
            tree.insert(pattern, i).unwrap();
        }

        let instances = [
            "twitter.com/user/1234",
            "twitter.com/user/42/posts",
            "acme.shop.io/cart/7/items/3",
            "twitter.com/static/css/main.css",
        ];
        for (pattern, instance) in patterns.iter().zip(instances) {
            assert_eq!(tree.lookup(instance).normalized_url, *pattern);
        }
    }

    #[test]
    fn test_wildcard_without_value_is_ignored() {
        let mut tree: UrlTree<u8> = UrlTree::with_convergence(10);
        tree.converge(["host.com/files/*"]);
        tree.insert("host.com/files", 1).unwrap();

        let result = tree.lookup("host.com/files");
        assert_eq!(result.value, Some(&1));
        assert!(!tree.lookup("host.com/files/a").matched);
    }
}
