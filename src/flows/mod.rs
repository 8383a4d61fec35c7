//! Flow selection.
//!
//! # Responsibilities
//! - Index flow filters by URL pattern; many flows may share one pattern
//! - Select every flow whose pattern encloses a request, outermost first
//! - Keep path-parameter declarations structurally consistent
//!
//! # Design Decisions
//! - Selection uses traversal, not lookup: a flow on `api.io/*` and a flow on
//!   `api.io/users/{id}` both run for `api.io/users/7`
//! - An empty method list means any method

pub mod path_params;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::urltree::{Method, UrlTree, UrlTreeError};

pub use path_params::PathParamRegistry;

/// Which requests a flow applies to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlowFilter {
    pub flow: String,
    pub url: String,
    #[serde(default)]
    pub methods: Vec<Method>,
    /// Required path parameter values; any one matching is enough.
    #[serde(default)]
    pub path_params: BTreeMap<String, String>,
}

impl FlowFilter {
    pub fn new(flow: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            flow: flow.into(),
            url: url.into(),
            methods: Vec::new(),
            path_params: BTreeMap::new(),
        }
    }

    pub fn with_methods<I, M>(mut self, methods: I) -> Self
    where
        I: IntoIterator<Item = M>,
        M: Into<Method>,
    {
        self.methods = methods.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_path_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.path_params.insert(name.into(), value.into());
        self
    }

    fn allows_method(&self, method: &Method) -> bool {
        self.methods.is_empty() || self.methods.contains(method)
    }

    fn allows_path_params(&self, captured: Option<&std::collections::HashMap<String, String>>) -> bool {
        if self.path_params.is_empty() {
            return true;
        }
        let Some(captured) = captured else {
            return false;
        };
        self.path_params
            .iter()
            .any(|(name, value)| captured.get(name) == Some(value))
    }
}

/// Flow filters indexed by URL pattern.
#[derive(Debug, Default)]
pub struct FlowFilterIndex {
    tree: UrlTree<Vec<FlowFilter>>,
    len: usize,
}

impl FlowFilterIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, filter: FlowFilter) -> Result<(), UrlTreeError> {
        let url = filter.url.clone();
        self.tree.get_or_insert_with(&url, Vec::new)?.push(filter);
        self.len += 1;
        tracing::debug!(url = %url, "Flow filter registered");
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Every flow applying to `method` on `url`, outermost pattern first.
    pub fn select(&self, method: &Method, url: &str) -> Vec<&FlowFilter> {
        let result = self.tree.traversal(url);
        let captured = result.path_params.as_ref();
        result
            .values
            .into_iter()
            .flatten()
            .filter(|filter| filter.allows_method(method) && filter.allows_path_params(captured))
            .collect()
    }
}
