//! Tree nodes.

use std::collections::BTreeMap;

use super::segment::Segment;
use super::SYNTHETIC_PARAM_PREFIX;

/// A trie node.
///
/// Constant children are partitioned by namespace: a host node may continue
/// with another host label or with the first path part, and the two must
/// never be confused even when they share a literal.
#[derive(Debug, Clone)]
pub struct Node<V> {
    pub(crate) host_children: BTreeMap<String, Node<V>>,
    pub(crate) path_children: BTreeMap<String, Node<V>>,
    pub(crate) parametric_child: Option<ParametricChild<V>>,
    pub(crate) wildcard_child: Option<Box<Node<V>>>,
    pub(crate) value: Option<V>,
    pub(crate) is_part_of_host: bool,
}

/// The single named parametric edge of a node.
#[derive(Debug, Clone)]
pub struct ParametricChild<V> {
    pub(crate) name: String,
    pub(crate) child: Box<Node<V>>,
    pub(crate) synthetic: bool,
}

impl<V> Node<V> {
    pub fn new(is_part_of_host: bool) -> Self {
        Self {
            host_children: BTreeMap::new(),
            path_children: BTreeMap::new(),
            parametric_child: None,
            wildcard_child: None,
            value: None,
            is_part_of_host,
        }
    }

    pub fn value(&self) -> Option<&V> {
        self.value.as_ref()
    }

    pub fn is_part_of_host(&self) -> bool {
        self.is_part_of_host
    }

    pub fn host_children(&self) -> &BTreeMap<String, Node<V>> {
        &self.host_children
    }

    pub fn path_children(&self) -> &BTreeMap<String, Node<V>> {
        &self.path_children
    }

    pub fn parametric_child(&self) -> Option<&ParametricChild<V>> {
        self.parametric_child.as_ref()
    }

    pub fn wildcard_child(&self) -> Option<&Node<V>> {
        self.wildcard_child.as_deref()
    }

    /// Constant child for `segment`, in the segment's namespace only.
    pub fn constant_child(&self, segment: &Segment<'_>) -> Option<&Node<V>> {
        self.constants(segment.is_part_of_host).get(segment.value)
    }

    /// Parametric child, if it lives in the requested namespace.
    pub fn matching_parametric_child(&self, is_part_of_host: bool) -> Option<&ParametricChild<V>> {
        self.parametric_child
            .as_ref()
            .filter(|param| param.child.is_part_of_host == is_part_of_host)
    }

    pub(crate) fn constants(&self, is_part_of_host: bool) -> &BTreeMap<String, Node<V>> {
        if is_part_of_host {
            &self.host_children
        } else {
            &self.path_children
        }
    }

    pub(crate) fn constants_mut(&mut self, is_part_of_host: bool) -> &mut BTreeMap<String, Node<V>> {
        if is_part_of_host {
            &mut self.host_children
        } else {
            &mut self.path_children
        }
    }

    /// Number of nodes in this subtree, including itself.
    pub fn node_count(&self) -> usize {
        1 + self
            .host_children
            .values()
            .chain(self.path_children.values())
            .map(Node::node_count)
            .sum::<usize>()
            + self
                .parametric_child
                .as_ref()
                .map_or(0, |param| param.child.node_count())
            + self.wildcard_child.as_ref().map_or(0, |w| w.node_count())
    }
}

impl<V> ParametricChild<V> {
    /// A declared `{name}` edge.
    pub(crate) fn new(name: impl Into<String>, is_part_of_host: bool) -> Self {
        Self {
            name: name.into(),
            child: Box::new(Node::new(is_part_of_host)),
            synthetic: false,
        }
    }

    /// An edge created by convergence, named `_param_<ordinal>`.
    pub(crate) fn synthetic(ordinal: usize, is_part_of_host: bool) -> Self {
        Self {
            name: format!("{SYNTHETIC_PARAM_PREFIX}{ordinal}"),
            child: Box::new(Node::new(is_part_of_host)),
            synthetic: true,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn child(&self) -> &Node<V> {
        &self.child
    }

    /// Whether the edge was created by convergence rather than declared.
    pub fn is_synthetic(&self) -> bool {
        self.synthetic
    }
}
