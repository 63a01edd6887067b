//! Visibility resolution
//!
//! Depth-first, preorder walk from the roots. A node whose visibility
//! condition fails is dropped together with its whole subtree, whatever its
//! descendants' own conditions say. Children are visited in
//! `(sortOrder, id)` order so the result does not depend on how the edges
//! were declared. A node reachable along several paths is emitted once, at
//! the first position it is reached.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use super::types::{BranchEdge, OptionTree};
use crate::options::condition;
use crate::options::selections::{LineItemOptionSelections, Selected};

/// Output of a resolution pass
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Resolution {
    /// Visible nodes in display order
    pub visible_node_ids: Vec<String>,
    /// `effectTag`s of the edges that led to visible nodes, first-seen order
    pub path_tags: Vec<String>,
}

/// Ordered ids of the nodes visible under `selections`
pub fn resolve_visible_nodes(
    tree: &OptionTree,
    selections: &LineItemOptionSelections,
) -> Vec<String> {
    resolve(tree, selections).visible_node_ids
}

/// Resolve visible nodes and collect the path tags along the way
pub fn resolve(tree: &OptionTree, selections: &LineItemOptionSelections) -> Resolution {
    let mut walker = Walker {
        tree,
        selected: &selections.selected,
        visited: HashSet::new(),
        resolution: Resolution::default(),
    };

    for root in &tree.root_node_ids {
        if root.trim().is_empty() {
            log::debug!("Skipping blank root id");
            continue;
        }
        walker.visit(root, None);
    }

    walker.resolution
}

struct Walker<'a> {
    tree: &'a OptionTree,
    selected: &'a Selected,
    visited: HashSet<&'a str>,
    resolution: Resolution,
}

impl<'a> Walker<'a> {
    fn visit(&mut self, node_id: &'a str, via_tag: Option<&'a str>) {
        if !self.visited.insert(node_id) {
            return;
        }

        let Some(node) = self.tree.node(node_id) else {
            log::warn!("Skipping reference to missing node '{}'", node_id);
            return;
        };

        if let Some(cond) = node.visibility_condition() {
            if !condition::evaluate(cond, self.selected) {
                log::debug!("Pruned node '{}': visibility condition is false", node_id);
                return;
            }
        }

        self.resolution.visible_node_ids.push(node_id.to_string());
        if let Some(tag) = via_tag {
            if !self.resolution.path_tags.iter().any(|t| t == tag) {
                self.resolution.path_tags.push(tag.to_string());
            }
        }

        for edge in self.eligible_children(node.children()) {
            self.visit(&edge.to_node_id, edge.effect_tag.as_deref());
        }
    }

    /// Edges whose `when` holds (or is absent), in display order
    fn eligible_children(&self, edges: &'a [BranchEdge]) -> Vec<&'a BranchEdge> {
        let mut eligible: Vec<&BranchEdge> = edges
            .iter()
            .filter(|edge| match &edge.when {
                None => true,
                Some(cond) => condition::evaluate(cond, self.selected),
            })
            .collect();
        eligible.sort_by(|a, b| self.tree.child_order(&a.to_node_id, &b.to_node_id));
        eligible
    }
}
