// SPDX-License-Identifier: MIT

//! Index-addressed requirement tree
//!
//! A [`RuleTree`] is a snapshot of one pathway's rule. Children are always
//! pushed before their parent, so every child index is lower than the index
//! of the node that refers to it and the arena cannot contain a cycle.

use crate::store::{Kravelement, LogicalNodeRecord, TreeError};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Position of a node in its [`RuleTree`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NodeIndex(usize);

impl NodeIndex {
    pub fn get(self) -> usize {
        self.0
    }
}

/// Recognized logical combinators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Combinator {
    And,
    Or,
    Not,
}

impl Combinator {
    /// Parse a stored combinator value; `None` when it is not AND/OR/NOT
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_uppercase().as_str() {
            "AND" => Some(Combinator::And),
            "OR" => Some(Combinator::Or),
            "NOT" => Some(Combinator::Not),
            _ => None,
        }
    }
}

impl fmt::Display for Combinator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Combinator::And => write!(f, "AND"),
            Combinator::Or => write!(f, "OR"),
            Combinator::Not => write!(f, "NOT"),
        }
    }
}

/// What a node in the arena is
#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    Leaf(Kravelement),
    And(Vec<NodeIndex>),
    Or(Vec<NodeIndex>),
    Not(Vec<NodeIndex>),
    /// A stored combinator value outside AND/OR/NOT
    Unrecognized {
        combinator: String,
        children: Vec<NodeIndex>,
    },
}

impl NodeKind {
    pub fn children(&self) -> &[NodeIndex] {
        match self {
            NodeKind::Leaf(_) => &[],
            NodeKind::And(children) | NodeKind::Or(children) | NodeKind::Not(children) => {
                children.as_slice()
            }
            NodeKind::Unrecognized { children, .. } => children.as_slice(),
        }
    }

    /// Combinator label as it should appear in audits
    pub fn combinator_label(&self) -> Option<String> {
        match self {
            NodeKind::Leaf(_) => None,
            NodeKind::And(_) => Some(Combinator::And.to_string()),
            NodeKind::Or(_) => Some(Combinator::Or.to_string()),
            NodeKind::Not(_) => Some(Combinator::Not.to_string()),
            NodeKind::Unrecognized { combinator, .. } => Some(combinator.clone()),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TreeNode {
    pub id: String,
    pub name: String,
    pub kind: NodeKind,
}

/// Nested view of a tree: a node, its leaf requirements and child subtrees
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StructuredNode {
    pub id: String,
    pub name: String,
    pub combinator: String,
    pub requirements: Vec<Kravelement>,
    pub children: Vec<StructuredNode>,
}

impl StructuredNode {
    /// Leaf requirement names at every nesting level, depth-first
    pub fn leaf_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.requirements.iter().map(|r| r.name.as_str()).collect();
        for child in &self.children {
            names.extend(child.leaf_names());
        }
        names
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct RuleTree {
    nodes: Vec<TreeNode>,
    root: Option<NodeIndex>,
}

impl RuleTree {
    /// The sentinel returned when a root node does not exist
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    pub fn root(&self) -> Option<NodeIndex> {
        self.root
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn node(&self, index: NodeIndex) -> Option<&TreeNode> {
        self.nodes.get(index.0)
    }

    pub fn push_leaf(&mut self, requirement: Kravelement) -> NodeIndex {
        let index = NodeIndex(self.nodes.len());
        self.nodes.push(TreeNode {
            id: requirement.id.clone(),
            name: requirement.name.clone(),
            kind: NodeKind::Leaf(requirement),
        });
        index
    }

    /// Push a logical node whose children are already in the arena
    pub fn push_logical(
        &mut self,
        record: &LogicalNodeRecord,
        children: Vec<NodeIndex>,
    ) -> Result<NodeIndex, TreeError> {
        let index = NodeIndex(self.nodes.len());
        if let Some(bad) = children.iter().find(|child| child.0 >= index.0) {
            return Err(TreeError::InvalidChild {
                node: record.id.clone(),
                index: bad.0,
            });
        }

        let kind = match Combinator::parse(&record.combinator) {
            Some(Combinator::And) => NodeKind::And(children),
            Some(Combinator::Or) => NodeKind::Or(children),
            Some(Combinator::Not) => NodeKind::Not(children),
            None => NodeKind::Unrecognized {
                combinator: record.combinator.clone(),
                children,
            },
        };

        self.nodes.push(TreeNode {
            id: record.id.clone(),
            name: record.name.clone(),
            kind,
        });
        Ok(index)
    }

    pub fn set_root(&mut self, index: NodeIndex) -> Result<(), TreeError> {
        if index.0 >= self.nodes.len() {
            return Err(TreeError::InvalidChild {
                node: "<root>".to_string(),
                index: index.0,
            });
        }
        self.root = Some(index);
        Ok(())
    }

    /// Names of every leaf reachable from the root, depth-first
    pub fn leaf_names(&self) -> Vec<&str> {
        let mut names = Vec::new();
        if let Some(root) = self.root {
            self.collect_leaf_names(root, &mut names);
        }
        names
    }

    fn collect_leaf_names<'a>(&'a self, index: NodeIndex, names: &mut Vec<&'a str>) {
        let node = &self.nodes[index.0];
        match &node.kind {
            NodeKind::Leaf(requirement) => names.push(requirement.name.as_str()),
            kind => {
                for child in kind.children() {
                    self.collect_leaf_names(*child, names);
                }
            }
        }
    }

    /// Nested view for rule-authoring tools; `None` for the empty sentinel
    pub fn structured(&self) -> Option<StructuredNode> {
        let root = self.root?;
        match &self.nodes[root.0].kind {
            // A bare leaf root carries its requirement with no combinator
            NodeKind::Leaf(requirement) => Some(StructuredNode {
                id: requirement.id.clone(),
                name: requirement.name.clone(),
                combinator: String::new(),
                requirements: vec![requirement.clone()],
                children: Vec::new(),
            }),
            _ => Some(self.structure_node(root)),
        }
    }

    fn structure_node(&self, index: NodeIndex) -> StructuredNode {
        let node = &self.nodes[index.0];
        let mut requirements = Vec::new();
        let mut children = Vec::new();

        for child in node.kind.children() {
            match &self.nodes[child.0].kind {
                NodeKind::Leaf(requirement) => requirements.push(requirement.clone()),
                _ => children.push(self.structure_node(*child)),
            }
        }

        StructuredNode {
            id: node.id.clone(),
            name: node.name.clone(),
            combinator: node.kind.combinator_label().unwrap_or_default(),
            requirements,
            children,
        }
    }
}
