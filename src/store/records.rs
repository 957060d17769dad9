// SPDX-License-Identifier: MIT

//! Read-only records returned by the graph store
//!
//! These mirror the persisted entities: logical nodes with their "evaluates"
//! edges, requirement elements (Kravelement), admission pathways (OpptaksVei)
//! and applicant documentation.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A logical combinator node as persisted
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogicalNodeRecord {
    pub id: String,
    pub name: String,
    /// Combinator value exactly as stored ("AND", "OR", "NOT", or garbage)
    #[serde(rename = "type")]
    pub combinator: String,
}

/// A logical node together with the direct targets of its "evaluates" edges
#[derive(Debug, Clone, PartialEq)]
pub struct NodeWithTargets {
    pub node: LogicalNodeRecord,
    /// Requirement element leaves, in store order
    pub requirements: Vec<Kravelement>,
    /// Ids of child logical nodes, in store order
    pub children: Vec<String>,
}

/// Atomic admission requirement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Kravelement {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub description: String,
    #[serde(default = "default_active")]
    pub active: bool,
    /// Matching metadata consumed by the predicate layer
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub criteria: Option<RequirementCriteria>,
}

fn default_active() -> bool {
    true
}

/// How a requirement element matches qualification facts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RequirementCriteria {
    /// Any fact carrying this subject code
    SubjectCode { code: String },
    /// A fact with this code whose grade meets the minimum
    MinimumGrade {
        code: String,
        minimum: String,
        #[serde(default)]
        grading_system: Option<String>,
    },
    /// At least `minimum` of the codes present (all when absent)
    Combination {
        codes: Vec<String>,
        #[serde(default)]
        minimum: Option<usize>,
    },
}

/// Admission pathway within a rule set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpptaksVei {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Root logical node ("has rule" relation)
    #[serde(default)]
    pub root: Option<String>,
    /// Qualification-basis category (Grunnlag)
    #[serde(default)]
    pub basis: Option<String>,
    #[serde(default)]
    pub quota_type: Option<String>,
    #[serde(default)]
    pub ranking_formula: Option<String>,
}

/// An applicant with the documentation records on file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApplicantRecord {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub documents: Vec<DocumentRecord>,
}

/// One documentation record (diploma, transcript, certificate)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentRecord {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub subjects: Vec<SubjectEntry>,
}

/// Subject-code entry inside a document; any field may be missing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct SubjectEntry {
    pub code: String,
    #[serde(default)]
    pub grade: Option<String>,
    #[serde(default)]
    pub grading_system: Option<String>,
    #[serde(default)]
    pub date: Option<NaiveDate>,
    #[serde(default)]
    pub comment: Option<String>,
}
