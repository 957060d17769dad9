// SPDX-License-Identifier: MIT

//! Requirement predicates
//!
//! How a requirement element matches an applicant's facts is domain logic
//! the evaluator consumes through [`RequirementPredicate`]:
//! - [`CriteriaPredicate`] - interprets the element's criteria metadata
//! - [`grading`] - per-system grade comparators used for minimum grades

mod criteria;
pub mod grading;

pub use criteria::CriteriaPredicate;
pub use grading::{ComparatorRegistry, GradeComparator, NumericScale, PassFail};

use crate::opptak::qualification::{QualificationFact, QualificationProfile};
use crate::store::Kravelement;

/// Result of matching one requirement element
#[derive(Debug, Clone, PartialEq)]
pub enum PredicateOutcome {
    /// The facts that satisfied the requirement
    Matched { facts: Vec<QualificationFact> },
    /// The criterion the profile did not meet
    Unmet { criterion: String },
    /// Not enough metadata to decide either way
    Undetermined { reason: String },
}

/// Trait for deciding a single requirement element against a profile.
///
/// Implementations must be pure: the same element and profile always give
/// the same outcome.
pub trait RequirementPredicate: Send + Sync {
    fn check(&self, requirement: &Kravelement, profile: &QualificationProfile) -> PredicateOutcome;
}
