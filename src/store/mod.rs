// SPDX-License-Identifier: MIT

//! Store module - read-only access to the requirement graph
//!
//! This module provides the traits the evaluation core consumes and the
//! records they return:
//! - [`GraphStore`] - opens a session scoped to one evaluation call
//! - [`GraphSession`] - the three read-only lookups
//! - [`memory`] - an in-memory implementation backed by a seed file

pub mod error;
pub mod memory;
pub mod records;

pub use error::{AdmissionError, EntityKind, TreeError};
pub use memory::InMemoryGraphStore;
pub use records::{
    ApplicantRecord, DocumentRecord, Kravelement, LogicalNodeRecord, NodeWithTargets, OpptaksVei,
    RequirementCriteria, SubjectEntry,
};

use async_trait::async_trait;

/// A source of store sessions.
///
/// Implementations must be cheap to share between concurrent evaluations;
/// nothing here mutates the store.
#[async_trait]
pub trait GraphStore: Send + Sync {
    /// Open a session. The session is released when dropped, so every exit
    /// path of the caller gives it back.
    async fn connect(&self) -> Result<Box<dyn GraphSession>, AdmissionError>;
}

/// Read-only lookups available within one session
#[async_trait]
pub trait GraphSession: Send + Sync {
    /// Fetch a logical node and the direct targets of its "evaluates" edges
    async fn fetch_node(&self, id: &str) -> Result<Option<NodeWithTargets>, AdmissionError>;

    /// Fetch a pathway including its root node reference
    async fn fetch_pathway(&self, id: &str) -> Result<Option<OpptaksVei>, AdmissionError>;

    /// Fetch an applicant's documentation and contained subject entries
    async fn fetch_applicant(&self, id: &str) -> Result<Option<ApplicantRecord>, AdmissionError>;
}
