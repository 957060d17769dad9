// SPDX-License-Identifier: MIT

//! Expression builder - renders a requirement tree as a boolean expression
//!
//! Works on the loaded [`RuleTree`] only; it never goes back to the store.
//! Example output: `Generell studiekompetanse AND (Matematikk R1 OR Matematikk R2)`

use super::tree::{NodeIndex, NodeKind, RuleTree};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Language used for operator words
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    English,
    Norwegian,
}

impl FromStr for Language {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "en" | "english" => Ok(Language::English),
            "nb" | "no" | "norsk" | "norwegian" => Ok(Language::Norwegian),
            other => Err(format!("Unknown language: {}", other)),
        }
    }
}

/// Words joining the parts of an expression
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperatorWords {
    pub and: String,
    pub or: String,
    pub not: String,
}

impl OperatorWords {
    pub fn english() -> Self {
        Self {
            and: "AND".to_string(),
            or: "OR".to_string(),
            not: "NOT".to_string(),
        }
    }

    pub fn norwegian() -> Self {
        Self {
            and: "OG".to_string(),
            or: "ELLER".to_string(),
            not: "IKKE".to_string(),
        }
    }

    pub fn for_language(language: Language) -> Self {
        match language {
            Language::English => Self::english(),
            Language::Norwegian => Self::norwegian(),
        }
    }
}

impl Default for OperatorWords {
    fn default() -> Self {
        Self::english()
    }
}

#[derive(Debug, Clone, Default)]
pub struct ExpressionBuilder {
    words: OperatorWords,
}

impl ExpressionBuilder {
    pub fn new(words: OperatorWords) -> Self {
        Self { words }
    }

    /// Render the whole tree; the empty sentinel renders as an empty string
    pub fn build(&self, tree: &RuleTree) -> String {
        tree.root()
            .map(|root| self.render(tree, root))
            .unwrap_or_default()
    }

    fn render(&self, tree: &RuleTree, index: NodeIndex) -> String {
        let Some(node) = tree.node(index) else {
            return String::new();
        };

        match &node.kind {
            NodeKind::Leaf(requirement) => requirement.name.clone(),
            NodeKind::And(children) => self.join(tree, children, &self.words.and),
            NodeKind::Or(children) => self.join(tree, children, &self.words.or),
            NodeKind::Not(children) => {
                let inner = self.join(tree, children, &self.words.and);
                if inner.is_empty() {
                    inner
                } else {
                    format!("{} ({})", self.words.not, inner)
                }
            }
            NodeKind::Unrecognized {
                combinator,
                children,
            } => self.join(tree, children, combinator.trim()),
        }
    }

    fn join(&self, tree: &RuleTree, children: &[NodeIndex], word: &str) -> String {
        children
            .iter()
            .map(|child| self.part(tree, *child))
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(&format!(" {} ", word))
    }

    /// Leaves stay bare; child subtrees are parenthesized
    fn part(&self, tree: &RuleTree, index: NodeIndex) -> String {
        let rendered = self.render(tree, index);
        match tree.node(index).map(|n| &n.kind) {
            Some(NodeKind::Leaf(_)) => rendered,
            _ if rendered.is_empty() => rendered,
            _ => format!("({})", rendered),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{Kravelement, LogicalNodeRecord};

    fn leaf(tree: &mut RuleTree, name: &str) -> NodeIndex {
        tree.push_leaf(Kravelement {
            id: name.to_string(),
            name: name.to_string(),
            category: String::new(),
            description: String::new(),
            active: true,
            criteria: None,
        })
    }

    fn logical(tree: &mut RuleTree, combinator: &str, children: Vec<NodeIndex>) -> NodeIndex {
        let record = LogicalNodeRecord {
            id: format!("{}-{}", combinator, tree.len()),
            name: combinator.to_string(),
            combinator: combinator.to_string(),
        };
        tree.push_logical(&record, children).unwrap()
    }

    fn admission_tree() -> RuleTree {
        let mut tree = RuleTree::empty();
        let gsk = leaf(&mut tree, "Generell studiekompetanse");
        let r1 = leaf(&mut tree, "Matematikk R1");
        let r2 = leaf(&mut tree, "Matematikk R2");
        let or = logical(&mut tree, "OR", vec![r1, r2]);
        let root = logical(&mut tree, "AND", vec![gsk, or]);
        tree.set_root(root).unwrap();
        tree
    }

    #[test]
    fn test_and_with_nested_or() {
        let expr = ExpressionBuilder::default().build(&admission_tree());
        assert_eq!(
            expr,
            "Generell studiekompetanse AND (Matematikk R1 OR Matematikk R2)"
        );
    }

    #[test]
    fn test_norwegian_words() {
        let builder = ExpressionBuilder::new(OperatorWords::norwegian());
        assert_eq!(
            builder.build(&admission_tree()),
            "Generell studiekompetanse OG (Matematikk R1 ELLER Matematikk R2)"
        );
    }

    #[test]
    fn test_not_joins_children_with_and() {
        let mut tree = RuleTree::empty();
        let a = leaf(&mut tree, "Utenlandsk statsborgerskap");
        let b = leaf(&mut tree, "Dispensasjon");
        let not = logical(&mut tree, "NOT", vec![a, b]);
        tree.set_root(not).unwrap();

        assert_eq!(
            ExpressionBuilder::default().build(&tree),
            "NOT (Utenlandsk statsborgerskap AND Dispensasjon)"
        );
    }

    #[test]
    fn test_nested_not_is_parenthesized() {
        let mut tree = RuleTree::empty();
        let a = leaf(&mut tree, "A");
        let b = leaf(&mut tree, "B");
        let not = logical(&mut tree, "NOT", vec![b]);
        let root = logical(&mut tree, "AND", vec![a, not]);
        tree.set_root(root).unwrap();

        assert_eq!(ExpressionBuilder::default().build(&tree), "A AND (NOT (B))");
    }

    #[test]
    fn test_empty_node_renders_empty() {
        let mut tree = RuleTree::empty();
        let root = logical(&mut tree, "AND", vec![]);
        tree.set_root(root).unwrap();
        assert_eq!(ExpressionBuilder::default().build(&tree), "");

        assert_eq!(ExpressionBuilder::default().build(&RuleTree::empty()), "");
    }

    #[test]
    fn test_empty_child_is_skipped() {
        let mut tree = RuleTree::empty();
        let a = leaf(&mut tree, "A");
        let empty = logical(&mut tree, "OR", vec![]);
        let root = logical(&mut tree, "AND", vec![a, empty]);
        tree.set_root(root).unwrap();

        assert_eq!(ExpressionBuilder::default().build(&tree), "A");
    }

    #[test]
    fn test_unrecognized_uses_raw_word() {
        let mut tree = RuleTree::empty();
        let a = leaf(&mut tree, "A");
        let b = leaf(&mut tree, "B");
        let root = logical(&mut tree, "XOR", vec![a, b]);
        tree.set_root(root).unwrap();

        assert_eq!(ExpressionBuilder::default().build(&tree), "A XOR B");
    }

    #[test]
    fn test_language_from_str() {
        assert_eq!("en".parse::<Language>(), Ok(Language::English));
        assert_eq!("NB".parse::<Language>(), Ok(Language::Norwegian));
        assert!("klingon".parse::<Language>().is_err());
    }
}
