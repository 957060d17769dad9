// SPDX-License-Identifier: MIT

//! Rule evaluator
//!
//! Walks a loaded [`RuleTree`] against a [`QualificationProfile`]. The walk is
//! a pure function of its inputs; it never touches the store.

use super::predicate::{PredicateOutcome, RequirementPredicate};
use super::tree::{Combinator, NodeIndex, NodeKind, RuleTree};
use crate::opptak::qualification::QualificationProfile;
use crate::store::Kravelement;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Verdict for a node or a whole tree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Satisfied,
    Unsatisfied,
    /// A requirement could not be decided from its metadata
    Undetermined,
    /// The subtree holds an unrecognized combinator; never satisfied
    Malformed,
}

impl Outcome {
    pub fn is_satisfied(self) -> bool {
        self == Outcome::Satisfied
    }

    /// Conjunction: malformed dominates, then unsatisfied, then undetermined
    pub fn all(outcomes: &[Outcome]) -> Outcome {
        if outcomes.contains(&Outcome::Malformed) {
            Outcome::Malformed
        } else if outcomes.contains(&Outcome::Unsatisfied) {
            Outcome::Unsatisfied
        } else if outcomes.contains(&Outcome::Undetermined) {
            Outcome::Undetermined
        } else {
            Outcome::Satisfied
        }
    }

    /// Disjunction: malformed dominates, then satisfied, then undetermined
    pub fn any(outcomes: &[Outcome]) -> Outcome {
        if outcomes.contains(&Outcome::Malformed) {
            Outcome::Malformed
        } else if outcomes.contains(&Outcome::Satisfied) {
            Outcome::Satisfied
        } else if outcomes.contains(&Outcome::Undetermined) {
            Outcome::Undetermined
        } else {
            Outcome::Unsatisfied
        }
    }

    pub fn negate(self) -> Outcome {
        match self {
            Outcome::Satisfied => Outcome::Unsatisfied,
            Outcome::Unsatisfied => Outcome::Satisfied,
            other => other,
        }
    }

    fn marker(self) -> &'static str {
        match self {
            Outcome::Satisfied => "[x]",
            Outcome::Unsatisfied => "[ ]",
            Outcome::Undetermined => "[?]",
            Outcome::Malformed => "[!]",
        }
    }
}

/// Audit trail for one node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Explanation {
    pub node_id: String,
    pub name: String,
    /// `None` for requirement leaves
    #[serde(skip_serializing_if = "Option::is_none")]
    pub combinator: Option<String>,
    pub outcome: Outcome,
    pub detail: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Explanation>,
}

impl Explanation {
    /// Indented, one line per node
    pub fn render(&self) -> String {
        let mut out = String::new();
        self.render_into(&mut out, 0);
        out
    }

    fn render_into(&self, out: &mut String, depth: usize) {
        let label = match &self.combinator {
            Some(combinator) => format!("{} {}", combinator, self.name),
            None => self.name.clone(),
        };
        out.push_str(&format!(
            "{}{} {}: {}\n",
            "  ".repeat(depth),
            self.outcome.marker(),
            label,
            self.detail
        ));
        for child in &self.children {
            child.render_into(out, depth + 1);
        }
    }

    /// Names of the requirement leaves that block a satisfied outcome,
    /// depth-first: missing requirements, plus excluded requirements the
    /// applicant holds. Empty when the tree is satisfied.
    pub fn unmet_requirements(&self) -> Vec<&str> {
        let mut names = Vec::new();
        self.collect_unmet(false, &mut names);
        names
    }

    /// `negated` is true below an odd number of NOT nodes, where the wanted
    /// outcome of a subtree is `Unsatisfied`
    fn collect_unmet<'a>(&'a self, negated: bool, names: &mut Vec<&'a str>) {
        let (wanted, blocking) = if negated {
            (Outcome::Unsatisfied, Outcome::Satisfied)
        } else {
            (Outcome::Satisfied, Outcome::Unsatisfied)
        };
        if self.outcome == wanted {
            return;
        }

        if self.combinator.is_none() {
            if self.outcome == blocking {
                names.push(self.name.as_str());
            }
            return;
        }

        let below = if self.is_negation() { !negated } else { negated };
        for child in &self.children {
            child.collect_unmet(below, names);
        }
    }

    fn is_negation(&self) -> bool {
        self.combinator
            .as_deref()
            .is_some_and(|c| Combinator::parse(c) == Some(Combinator::Not))
    }
}

/// Verdict plus explanation for a whole tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Evaluation {
    pub outcome: Outcome,
    pub explanation: Explanation,
}

impl Evaluation {
    pub fn satisfied(&self) -> bool {
        self.outcome.is_satisfied()
    }
}

#[derive(Clone)]
pub struct RuleEvaluator {
    predicate: Arc<dyn RequirementPredicate>,
}

impl RuleEvaluator {
    pub fn new(predicate: Arc<dyn RequirementPredicate>) -> Self {
        Self { predicate }
    }

    pub fn evaluate(&self, tree: &RuleTree, profile: &QualificationProfile) -> Evaluation {
        let explanation = match tree.root() {
            Some(root) => self.evaluate_node(tree, root, profile),
            None => Explanation {
                node_id: String::new(),
                name: String::new(),
                combinator: None,
                outcome: Outcome::Undetermined,
                detail: "no requirement tree".to_string(),
                children: Vec::new(),
            },
        };

        Evaluation {
            outcome: explanation.outcome,
            explanation,
        }
    }

    fn evaluate_node(
        &self,
        tree: &RuleTree,
        index: NodeIndex,
        profile: &QualificationProfile,
    ) -> Explanation {
        let Some(node) = tree.node(index) else {
            return Explanation {
                node_id: String::new(),
                name: String::new(),
                combinator: None,
                outcome: Outcome::Malformed,
                detail: format!("missing arena entry {}", index.get()),
                children: Vec::new(),
            };
        };

        // Every child is evaluated so the explanation lists all unmet requirements
        let evaluate_all = |indices: &[NodeIndex]| -> Vec<Explanation> {
            indices
                .iter()
                .map(|child| self.evaluate_node(tree, *child, profile))
                .collect()
        };
        let outcomes_of = |children: &[Explanation]| -> Vec<Outcome> {
            children.iter().map(|c| c.outcome).collect()
        };

        let (outcome, detail, children) = match &node.kind {
            NodeKind::Leaf(requirement) => {
                let (outcome, detail) = self.evaluate_leaf(requirement, profile);
                (outcome, detail, Vec::new())
            }
            NodeKind::And(indices) => {
                let children = evaluate_all(indices);
                let outcome = Outcome::all(&outcomes_of(&children));
                (outcome, conjunction_detail(&children), children)
            }
            NodeKind::Or(indices) => {
                let children = evaluate_all(indices);
                let outcome = Outcome::any(&outcomes_of(&children));
                if outcome == Outcome::Satisfied {
                    let satisfying: Vec<Explanation> = children
                        .into_iter()
                        .filter(|c| c.outcome == Outcome::Satisfied)
                        .collect();
                    let detail = format!("satisfied by {}", names(&satisfying));
                    (outcome, detail, satisfying)
                } else {
                    let detail = if children.is_empty() {
                        "no alternatives".to_string()
                    } else {
                        format!("none of {} satisfied", names(&children))
                    };
                    (outcome, detail, children)
                }
            }
            NodeKind::Not(indices) => {
                let children = evaluate_all(indices);
                let inner = Outcome::all(&outcomes_of(&children));
                let detail = match inner {
                    Outcome::Satisfied => format!("excluded: {} all hold", names(&children)),
                    Outcome::Unsatisfied => {
                        format!("not all of {} hold", names(&children))
                    }
                    Outcome::Undetermined => "negated requirements undetermined".to_string(),
                    Outcome::Malformed => "negated requirements malformed".to_string(),
                };
                (inner.negate(), detail, children)
            }
            NodeKind::Unrecognized {
                combinator,
                children: indices,
            } => {
                log::warn!(
                    "Failing closed on node '{}' with combinator '{}'",
                    node.id,
                    combinator
                );
                (
                    Outcome::Malformed,
                    format!("malformed tree: unrecognized combinator '{}'", combinator),
                    evaluate_all(indices),
                )
            }
        };

        Explanation {
            node_id: node.id.clone(),
            name: node.name.clone(),
            combinator: node.kind.combinator_label(),
            outcome,
            detail,
            children,
        }
    }

    fn evaluate_leaf(
        &self,
        requirement: &Kravelement,
        profile: &QualificationProfile,
    ) -> (Outcome, String) {
        match self.predicate.check(requirement, profile) {
            PredicateOutcome::Matched { facts } => (
                Outcome::Satisfied,
                format!(
                    "matched {}",
                    facts
                        .iter()
                        .map(|f| f.describe())
                        .collect::<Vec<_>>()
                        .join(", ")
                ),
            ),
            PredicateOutcome::Unmet { criterion } => (Outcome::Unsatisfied, criterion),
            PredicateOutcome::Undetermined { reason } => (Outcome::Undetermined, reason),
        }
    }
}

fn names(children: &[Explanation]) -> String {
    children
        .iter()
        .map(|c| c.name.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

fn conjunction_detail(children: &[Explanation]) -> String {
    let failing: Vec<&Explanation> = children
        .iter()
        .filter(|c| c.outcome != Outcome::Satisfied)
        .collect();
    if failing.is_empty() {
        format!("all {} requirements met", children.len())
    } else {
        format!(
            "unmet: {}",
            failing
                .iter()
                .map(|c| c.name.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        )
    }
}
