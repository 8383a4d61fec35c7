//! Convergence of crowded literal positions into parametric children.
//!
//! # Responsibilities
//! - Promote a path position to a parametric child once it holds more than
//!   `max_split_threshold` distinct literals
//! - Re-home the literal subtrees beneath the parametric child
//! - Observe batches of URLs before their values are inserted
//!
//! # Design Decisions
//! - Host positions never converge
//! - An existing parametric child keeps its name; a fresh one is
//!   `_param_<k>` where `k` is one more than the parametric edges
//!   (declared or synthetic) walked to reach the position
//! - A path position whose parametric slot holds a host parameter never
//!   converges
//! - Nested parametric collisions keep the lexicographically smaller name
//! - The first value found wins: the parametric child's own, then the
//!   constants in key order
//! - Only the tree's own structure is migrated; callers re-key their data
//!   when a pass reports convergence

use std::collections::btree_map::Entry;
use std::collections::BTreeMap;

use super::node::{Node, ParametricChild};
use super::UrlTree;

impl<V> UrlTree<V> {
    /// Observe a batch of URLs: converge every path position the batch pushes
    /// over the threshold, materializing the batch's structure without values.
    ///
    /// Returns whether any position converged. Insert the values afterwards;
    /// they fall into the converged branches. URLs that fail validation are
    /// skipped. A tree without convergence enabled is left untouched.
    pub fn converge<I, S>(&mut self, urls: I) -> bool
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        if !self.convergence_enabled() {
            return false;
        }

        let mode = self.insert_mode();
        let mut converged = false;
        for url in urls {
            let url = url.as_ref();
            match self.materialize(url, mode) {
                Ok((_, did_converge)) => converged |= did_converge,
                Err(e) => tracing::warn!(url = %url, error = %e, "Skipping URL during convergence"),
            }
        }
        converged
    }
}

impl<V> Node<V> {
    /// Whether this node's path constants may fold into its parametric slot.
    ///
    /// A slot already holding a host parameter cannot take path literals, so
    /// such a position keeps its constants for good.
    pub(crate) fn can_converge_path(&self) -> bool {
        self.parametric_child
            .as_ref()
            .map_or(true, |existing| !existing.child.is_part_of_host)
    }

    /// Fold every path-constant child into the parametric child, creating
    /// `_param_<ordinal>` if the slot is empty.
    ///
    /// Callers check [`Node::can_converge_path`] first.
    pub(crate) fn converge_path_constants(&mut self, ordinal: usize) -> bool {
        debug_assert!(self.can_converge_path());

        let constants = std::mem::take(&mut self.path_children);
        let param = self
            .parametric_child
            .get_or_insert_with(|| ParametricChild::synthetic(ordinal, false));

        tracing::debug!(
            param = %param.name,
            ordinal,
            merged = constants.len(),
            "Converging path position"
        );
        for (_, child) in constants {
            param.child.merge(child);
        }
        true
    }

    /// Merge `other` into `self`, keeping every path either one matched.
    pub(crate) fn merge(&mut self, other: Node<V>) {
        let Node {
            host_children,
            path_children,
            parametric_child,
            wildcard_child,
            value,
            ..
        } = other;

        if self.value.is_none() {
            self.value = value;
        }
        merge_constants(&mut self.host_children, host_children);
        merge_constants(&mut self.path_children, path_children);

        self.parametric_child = match (self.parametric_child.take(), parametric_child) {
            (Some(mut mine), Some(theirs)) => {
                if theirs.name < mine.name {
                    mine.name = theirs.name;
                    mine.synthetic = theirs.synthetic;
                }
                mine.child.merge(*theirs.child);
                Some(mine)
            }
            (mine, theirs) => mine.or(theirs),
        };

        if let Some(theirs) = wildcard_child {
            match self.wildcard_child.as_mut() {
                Some(mine) => mine.merge(*theirs),
                None => self.wildcard_child = Some(theirs),
            }
        }
    }
}

fn merge_constants<V>(target: &mut BTreeMap<String, Node<V>>, source: BTreeMap<String, Node<V>>) {
    for (literal, child) in source {
        match target.entry(literal) {
            Entry::Occupied(mut entry) => entry.get_mut().merge(child),
            Entry::Vacant(entry) => {
                entry.insert(child);
            }
        }
    }
}
