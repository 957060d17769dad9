// SPDX-License-Identifier: MIT

//! Requirement tree loader
//!
//! Materializes the subtree below a root node in one traversal. Nodes are
//! fetched breadth-first with every level's lookups in flight at once, then
//! pushed into a [`RuleTree`] children-first.

use super::types::{NodeIndex, NodeKind, RuleTree};
use crate::store::{AdmissionError, GraphSession, NodeWithTargets, TreeError};
use futures::future::try_join_all;
use std::collections::{HashMap, HashSet};

/// Loads requirement trees with a hard depth guard
#[derive(Debug, Clone)]
pub struct TreeLoader {
    max_depth: usize,
}

impl TreeLoader {
    pub fn new(max_depth: usize) -> Self {
        Self { max_depth }
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Load the tree rooted at `root_id`.
    ///
    /// A missing root yields [`RuleTree::empty`]. Depth overruns, nodes reached
    /// twice and edges to unknown nodes are reported as `MalformedTree`.
    pub async fn load(
        &self,
        session: &dyn GraphSession,
        root_id: &str,
    ) -> Result<RuleTree, AdmissionError> {
        let Some(root) = session.fetch_node(root_id).await? else {
            log::warn!("Root node '{}' not found, returning empty tree", root_id);
            return Ok(RuleTree::empty());
        };

        let fetched = self.fetch_levels(session, root).await?;
        let mut tree = RuleTree::empty();
        let root_index = push_subtree(&mut tree, &fetched, root_id)?;
        tree.set_root(root_index)?;

        log::debug!(
            "Loaded requirement tree '{}' with {} nodes",
            root_id,
            tree.len()
        );
        Ok(tree)
    }

    async fn fetch_levels(
        &self,
        session: &dyn GraphSession,
        root: NodeWithTargets,
    ) -> Result<HashMap<String, NodeWithTargets>, AdmissionError> {
        let mut visited: HashSet<String> = HashSet::from([root.node.id.clone()]);
        let mut fetched: HashMap<String, NodeWithTargets> = HashMap::new();
        let mut frontier = vec![root];
        let mut depth = 1;

        while !frontier.is_empty() {
            let mut pending: Vec<(String, String)> = Vec::new();
            for entry in &frontier {
                for child in &entry.children {
                    if !visited.insert(child.clone()) {
                        return Err(TreeError::Cycle {
                            node: child.clone(),
                        }
                        .into());
                    }
                    pending.push((entry.node.id.clone(), child.clone()));
                }
            }

            for entry in frontier.drain(..) {
                fetched.insert(entry.node.id.clone(), entry);
            }

            if pending.is_empty() {
                break;
            }

            depth += 1;
            if depth > self.max_depth {
                return Err(TreeError::DepthExceeded {
                    node: pending[0].0.clone(),
                    limit: self.max_depth,
                }
                .into());
            }

            let results =
                try_join_all(pending.iter().map(|(_, child)| session.fetch_node(child))).await?;

            for ((parent, child), result) in pending.into_iter().zip(results) {
                match result {
                    Some(entry) => frontier.push(entry),
                    None => {
                        return Err(TreeError::DanglingReference {
                            from: parent,
                            to: child,
                        }
                        .into())
                    }
                }
            }
        }

        Ok(fetched)
    }
}

/// Push `id` and everything below it; leaves first, then child subtrees
fn push_subtree(
    tree: &mut RuleTree,
    fetched: &HashMap<String, NodeWithTargets>,
    id: &str,
) -> Result<NodeIndex, TreeError> {
    let entry = fetched.get(id).ok_or_else(|| TreeError::DanglingReference {
        from: id.to_string(),
        to: id.to_string(),
    })?;

    let mut children = Vec::with_capacity(entry.requirements.len() + entry.children.len());
    for requirement in &entry.requirements {
        children.push(tree.push_leaf(requirement.clone()));
    }
    for child in &entry.children {
        children.push(push_subtree(tree, fetched, child)?);
    }

    let index = tree.push_logical(&entry.node, children)?;
    if let Some(NodeKind::Unrecognized { combinator, .. }) = tree.node(index).map(|n| &n.kind) {
        log::warn!(
            "Node '{}' has unrecognized combinator '{}'",
            entry.node.id,
            combinator
        );
    }
    Ok(index)
}
