//! Method-keyed tree: one URL pattern, one value per HTTP method.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::{LookupResult, UrlTree, UrlTreeError};

const STANDARD_METHODS: [&str; 9] = [
    "GET", "HEAD", "POST", "PUT", "DELETE", "CONNECT", "OPTIONS", "TRACE", "PATCH",
];

/// Upper-cased HTTP method.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct Method(String);

impl Method {
    pub fn new(method: impl AsRef<str>) -> Self {
        Self(method.as_ref().trim().to_ascii_uppercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// One of the RFC 9110 methods plus PATCH.
    pub fn is_standard(&self) -> bool {
        STANDARD_METHODS.contains(&self.0.as_str())
    }
}

impl From<String> for Method {
    fn from(method: String) -> Self {
        Self::new(method)
    }
}

impl From<&str> for Method {
    fn from(method: &str) -> Self {
        Self::new(method)
    }
}

impl From<Method> for String {
    fn from(method: Method) -> Self {
        method.0
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A method-specific hit in an [`EndpointTree`].
#[derive(Debug, Clone, PartialEq)]
pub struct EndpointMatch<'a, V> {
    pub value: &'a V,
    pub normalized_url: String,
    pub path_params: HashMap<String, String>,
}

/// [`UrlTree`] whose values are keyed by method.
#[derive(Debug, Clone)]
pub struct EndpointTree<V> {
    tree: UrlTree<HashMap<Method, V>>,
}

impl<V> EndpointTree<V> {
    pub fn new() -> Self {
        Self {
            tree: UrlTree::new(),
        }
    }

    /// Store `value` for `method` at `url`; other methods at the same
    /// pattern are kept.
    pub fn insert(&mut self, method: Method, url: &str, value: V) -> Result<(), UrlTreeError> {
        self.tree
            .get_or_insert_with(url, HashMap::new)?
            .insert(method, value);
        Ok(())
    }

    pub fn get_or_insert_with<F>(&mut self, method: Method, url: &str, default: F) -> Result<&mut V, UrlTreeError>
    where
        F: FnOnce() -> V,
    {
        Ok(self
            .tree
            .get_or_insert_with(url, HashMap::new)?
            .entry(method)
            .or_insert_with(default))
    }

    pub fn lookup(&self, method: &Method, url: &str) -> Option<EndpointMatch<'_, V>> {
        let result = self.tree.lookup(url);
        let value = result.value?.get(method)?;
        Some(EndpointMatch {
            value,
            normalized_url: result.normalized_url,
            path_params: result.path_params.unwrap_or_default(),
        })
    }

    /// Raw lookup exposing every method registered at the matched pattern.
    pub fn lookup_all(&self, url: &str) -> LookupResult<'_, HashMap<Method, V>> {
        self.tree.lookup(url)
    }

    pub fn tree(&self) -> &UrlTree<HashMap<Method, V>> {
        &self.tree
    }
}

impl<V> Default for EndpointTree<V> {
    fn default() -> Self {
        Self::new()
    }
}
