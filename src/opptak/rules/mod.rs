// SPDX-License-Identifier: MIT

//! Rules module - requirement trees and how they are read
//!
//! - [`tree`] - arena snapshot of a pathway's rule and its loader
//! - [`expression`] - boolean-expression rendering
//! - [`predicate`] - matching of single requirement elements
//! - [`evaluator`] - tree evaluation with explanations

pub mod evaluator;
pub mod expression;
pub mod predicate;
pub mod tree;

pub use evaluator::{Evaluation, Explanation, Outcome, RuleEvaluator};
pub use expression::{ExpressionBuilder, Language, OperatorWords};
pub use predicate::{CriteriaPredicate, PredicateOutcome, RequirementPredicate};
pub use tree::{RuleTree, StructuredNode, TreeLoader};
