//! Insertion.
//!
//! # Responsibilities
//! - Validate the URL before touching the tree
//! - Declare constants, `{name}` parameters and a trailing `*`
//! - Apply the convergence rules to literal path parts when enabled
//!
//! # Design Decisions
//! - A failed insert never records its value; ancestors already created for
//!   a shared prefix are left in place, they carry no value
//! - Re-inserting a URL overwrites the previous value

use super::node::{Node, ParametricChild};
use super::segment::{split_url, validate_url, Segment};
use super::{UrlTree, UrlTreeError};

/// How literal segments are placed while walking.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum InsertMode {
    /// Literals always become constant children.
    Declared,
    /// Literals may converge crowded positions or fall into an existing
    /// parametric branch.
    Converging { max_split_threshold: usize },
}

impl<V> UrlTree<V> {
    /// Insert `value` at `url`, converging positions if the tree allows it.
    pub fn insert(&mut self, url: &str, value: V) -> Result<(), UrlTreeError> {
        self.insert_with_convergence_indication(url, value)
            .map(|_| ())
    }

    /// Insert with declaration semantics only, whatever the tree config.
    pub fn insert_declared_url(&mut self, url: &str, value: V) -> Result<(), UrlTreeError> {
        let (node, _) = self.materialize(url, InsertMode::Declared)?;
        node.value = Some(value);
        Ok(())
    }

    /// Insert `value` at `url` and report whether this insert converged any
    /// position of the tree.
    pub fn insert_with_convergence_indication(
        &mut self,
        url: &str,
        value: V,
    ) -> Result<bool, UrlTreeError> {
        let mode = self.insert_mode();
        let (node, converged) = self.materialize(url, mode)?;
        node.value = Some(value);
        Ok(converged)
    }

    /// Value stored at `url` (declaration semantics), created with `default`
    /// if the URL holds none yet.
    pub fn get_or_insert_with<F>(&mut self, url: &str, default: F) -> Result<&mut V, UrlTreeError>
    where
        F: FnOnce() -> V,
    {
        let (node, _) = self.materialize(url, InsertMode::Declared)?;
        Ok(node.value.get_or_insert_with(default))
    }

    pub(crate) fn insert_mode(&self) -> InsertMode {
        if self.config.assumed_path_params_enabled {
            InsertMode::Converging {
                max_split_threshold: self.config.max_split_threshold,
            }
        } else {
            InsertMode::Declared
        }
    }

    /// Walk `url` from the root, creating missing nodes, and return the
    /// terminal node together with the convergence indication.
    pub(crate) fn materialize(
        &mut self,
        url: &str,
        mode: InsertMode,
    ) -> Result<(&mut Node<V>, bool), UrlTreeError> {
        tracing::debug!(url = %url, ?mode, "Inserting into tree");
        validate_url(url)?;

        let mut converged = false;
        // Parametric edges walked so far; names the next synthetic parameter.
        let mut param_edges = 0;
        let mut current = &mut self.root;

        for segment in split_url(url) {
            current = if segment.is_wildcard() {
                &mut **current
                    .wildcard_child
                    .get_or_insert_with(|| Box::new(Node::new(segment.is_part_of_host)))
            } else if let Some(name) = segment.path_parameter() {
                param_edges += 1;
                descend_declared_param(current, name, segment.is_part_of_host)?
            } else {
                match mode {
                    InsertMode::Declared => descend_constant(current, &segment),
                    InsertMode::Converging {
                        max_split_threshold,
                    } => {
                        let step = descend_literal(current, &segment, param_edges, max_split_threshold);
                        converged |= step.converged;
                        if step.via_param {
                            param_edges += 1;
                        }
                        step.node
                    }
                }
            };
        }

        if converged {
            tracing::debug!(url = %url, "Tree converged while inserting");
        }
        Ok((current, converged))
    }
}

fn descend_constant<'a, V>(node: &'a mut Node<V>, segment: &Segment<'_>) -> &'a mut Node<V> {
    let is_part_of_host = segment.is_part_of_host;
    node.constants_mut(is_part_of_host)
        .entry(segment.value.to_string())
        .or_insert_with(|| Node::new(is_part_of_host))
}

fn descend_declared_param<'a, V>(
    node: &'a mut Node<V>,
    name: &str,
    is_part_of_host: bool,
) -> Result<&'a mut Node<V>, UrlTreeError> {
    if let Some(existing) = &node.parametric_child {
        if existing.name != name {
            return Err(UrlTreeError::ParameterNameConflict {
                given: name.to_string(),
                existing: existing.name.clone(),
            });
        }
        if existing.child.is_part_of_host != is_part_of_host {
            return Err(UrlTreeError::ParameterNamespaceConflict {
                name: name.to_string(),
            });
        }
    }

    let param = node
        .parametric_child
        .get_or_insert_with(|| ParametricChild::new(name, is_part_of_host));
    Ok(&mut *param.child)
}

struct LiteralStep<'a, V> {
    node: &'a mut Node<V>,
    converged: bool,
    via_param: bool,
}

/// Place a literal under convergence rules:
/// existing constant, then threshold convergence, then an existing
/// parametric branch, then a new constant. Host literals never converge,
/// and neither does a path position whose parametric slot holds a host
/// parameter.
fn descend_literal<'a, V>(
    node: &'a mut Node<V>,
    segment: &Segment<'_>,
    param_edges: usize,
    max_split_threshold: usize,
) -> LiteralStep<'a, V> {
    let is_part_of_host = segment.is_part_of_host;
    if node.constants(is_part_of_host).contains_key(segment.value) {
        return LiteralStep {
            node: descend_constant(node, segment),
            converged: false,
            via_param: false,
        };
    }

    let converged = !is_part_of_host
        && node.can_converge_path()
        && node.path_children.len() + 1 > max_split_threshold
        && node.converge_path_constants(param_edges + 1);

    if node.matching_parametric_child(is_part_of_host).is_some() {
        let param = node
            .parametric_child
            .get_or_insert_with(|| ParametricChild::synthetic(param_edges + 1, is_part_of_host));
        return LiteralStep {
            node: &mut *param.child,
            converged,
            via_param: true,
        };
    }

    LiteralStep {
        node: descend_constant(node, segment),
        converged,
        via_param: false,
    }
}
