// SPDX-License-Identifier: MIT

//! YAML schema for store seed files
//!
//! ```yaml
//! requirements:
//!   - id: gsk
//!     name: Generell studiekompetanse
//!     criteria: { kind: subject_code, code: GSK }
//! nodes:
//!   - id: root
//!     name: Sivilingeniør
//!     type: AND
//!     evaluates: [gsk, math]
//! pathways:
//!   - id: ordinaer
//!     name: Ordinær vei
//!     root: root
//! applicants: []
//! ```

use crate::store::{ApplicantRecord, Kravelement, OpptaksVei};
use serde::{Deserialize, Serialize};

/// Top-level seed document
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct FixtureDocument {
    #[serde(default)]
    pub requirements: Vec<Kravelement>,
    #[serde(default)]
    pub nodes: Vec<NodeDefinition>,
    #[serde(default)]
    pub pathways: Vec<OpptaksVei>,
    #[serde(default)]
    pub applicants: Vec<ApplicantRecord>,
}

/// A logical node and its "evaluates" targets
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct NodeDefinition {
    pub id: String,
    #[serde(default)]
    pub name: String,
    /// Combinator kept verbatim so bad values reach the evaluator
    #[serde(rename = "type")]
    pub combinator: String,
    /// Ids of requirement elements or other nodes, in order
    #[serde(default)]
    pub evaluates: Vec<String>,
}
