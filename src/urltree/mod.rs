//! Adaptive URL routing tree.
//!
//! # Data Flow
//! ```text
//! "api.example.com/users/42"
//!     → segment.rs (host labels + path parts, tagged by namespace)
//!     → insert.rs (declare constants, {params}, trailing *)
//!     → convergence.rs (promote crowded literal positions to _param_<k>)
//!     → lookup.rs (single best match: constant > param > wildcard)
//!     → traversal.rs (every matching value along the path)
//! ```
//!
//! # Design Decisions
//! - Owned recursive nodes; each child is owned by exactly one parent slot
//! - Host and path constants live in separate maps, so namespaces never cross
//! - Ordered maps keep convergence merges deterministic
//! - Writers take `&mut self`, readers `&self`: share behind `Arc` once built
//! - Convergence only ever touches path positions

pub mod convergence;
pub mod endpoint;
pub mod insert;
pub mod lookup;
pub mod node;
pub mod segment;
pub mod traversal;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use endpoint::{EndpointMatch, EndpointTree, Method};
pub use lookup::LookupResult;
pub use node::{Node, ParametricChild};
pub use segment::{split_url, try_extract_path_parameter, validate_url, Segment, WILDCARD};
pub use traversal::TraversalResult;

/// Prefix of parameter names generated by convergence.
pub const SYNTHETIC_PARAM_PREFIX: &str = "_param_";

/// Structural errors raised while inserting into the tree.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UrlTreeError {
    #[error("URL '{url}' contains an empty segment")]
    EmptySegment { url: String },

    #[error("wildcard is only allowed as the last segment of '{url}'")]
    MisplacedWildcard { url: String },

    #[error("URL '{url}' declares a path parameter without a name")]
    EmptyParameterName { url: String },

    #[error("path parameter name '{given}' does not match existing name '{existing}'")]
    ParameterNameConflict { given: String, existing: String },

    #[error("path parameter '{name}' is declared in both host and path position")]
    ParameterNamespaceConflict { name: String },
}

/// Tree construction parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct UrlTreeConfig {
    /// Infer path parameters from crowded literal positions.
    pub assumed_path_params_enabled: bool,

    /// Distinct literals a path position may hold before it converges.
    pub max_split_threshold: usize,
}

impl Default for UrlTreeConfig {
    fn default() -> Self {
        Self {
            assumed_path_params_enabled: false,
            max_split_threshold: 50,
        }
    }
}

/// A URL trie with exact, parametric and wildcard edges.
#[derive(Debug, Clone)]
pub struct UrlTree<V> {
    pub(crate) root: Node<V>,
    pub(crate) config: UrlTreeConfig,
}

impl<V> UrlTree<V> {
    /// A tree that never infers parameters.
    pub fn new() -> Self {
        Self::from_config(UrlTreeConfig::default())
    }

    /// A tree that converges any path position holding more than
    /// `max_split_threshold` distinct literals.
    pub fn with_convergence(max_split_threshold: usize) -> Self {
        Self::from_config(UrlTreeConfig {
            assumed_path_params_enabled: true,
            max_split_threshold,
        })
    }

    pub fn from_config(config: UrlTreeConfig) -> Self {
        Self {
            root: Node::new(false),
            config,
        }
    }

    pub fn config(&self) -> UrlTreeConfig {
        self.config
    }

    pub fn convergence_enabled(&self) -> bool {
        self.config.assumed_path_params_enabled
    }

    /// Root node, for consumers that inspect the structure.
    pub fn root(&self) -> &Node<V> {
        &self.root
    }
}

impl<V> Default for UrlTree<V> {
    fn default() -> Self {
        Self::new()
    }
}

/// Builds the delimiter-prefixed normalized pattern while descending.
///
/// Every part is pushed with its leading delimiter; `finish` trims the
/// delimiters left at either end.
#[derive(Debug, Default)]
pub(crate) struct NormalizedUrl {
    buf: String,
}

impl NormalizedUrl {
    pub(crate) fn push(&mut self, is_part_of_host: bool, part: &str) {
        self.buf.push(delimiter(is_part_of_host));
        self.buf.push_str(part);
    }

    pub(crate) fn push_param(&mut self, is_part_of_host: bool, name: &str) {
        self.buf.push(delimiter(is_part_of_host));
        self.buf.push('{');
        self.buf.push_str(name);
        self.buf.push('}');
    }

    pub(crate) fn len(&self) -> usize {
        self.buf.len()
    }

    pub(crate) fn truncate(&mut self, len: usize) {
        self.buf.truncate(len);
    }

    pub(crate) fn finish(self) -> String {
        self.buf.trim_matches(|c| c == '.' || c == '/').to_string()
    }
}

fn delimiter(is_part_of_host: bool) -> char {
    if is_part_of_host {
        '.'
    } else {
        '/'
    }
}
