// SPDX-License-Identifier: MIT

//! Typed error handling for opptak-rs
//!
//! Every fallible operation in the crate returns [`AdmissionError`]. Structural
//! defects in a requirement tree are grouped under [`TreeError`] so callers can
//! report them with diagnostic detail.

use std::fmt;
use thiserror::Error;

/// Top-level error type for opptak-rs
#[derive(Debug, Error)]
pub enum AdmissionError {
    /// A pathway, root node or applicant is absent from the store
    #[error("{entity} '{id}' not found")]
    NotFound { entity: EntityKind, id: String },

    /// The requirement tree cannot be traversed safely
    #[error("Malformed requirement tree: {0}")]
    MalformedTree(#[from] TreeError),

    /// Transient connectivity failure to the graph store
    #[error("Graph store unavailable: {0}")]
    StoreUnavailable(String),

    /// A requirement element lacks the metadata its matching logic needs
    #[error("Requirement '{requirement}' cannot be decided: {reason}")]
    UnknownRequirementPredicate { requirement: String, reason: String },

    /// Configuration errors (invalid env vars, missing store file)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Seed file content that cannot be turned into a store
    #[error("Fixture error: {0}")]
    Fixture(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),
}

/// Structural defects detected while materializing a requirement tree
#[derive(Debug, Error, Clone, PartialEq)]
pub enum TreeError {
    /// The tree is deeper than the configured guard allows
    #[error("depth limit of {limit} levels exceeded below node '{node}'")]
    DepthExceeded { node: String, limit: usize },

    /// A node was reached twice during traversal
    #[error("node '{node}' is reachable more than once (cycle or shared child)")]
    Cycle { node: String },

    /// An "evaluates" edge points at a node the store does not know
    #[error("node '{from}' evaluates unknown node '{to}'")]
    DanglingReference { from: String, to: String },

    /// A child index that does not refer to an earlier arena entry
    #[error("node '{node}' refers to invalid child index {index}")]
    InvalidChild { node: String, index: usize },
}

/// Kind of entity named in a [`AdmissionError::NotFound`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Pathway,
    RootNode,
    Applicant,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityKind::Pathway => write!(f, "Pathway"),
            EntityKind::RootNode => write!(f, "Root node"),
            EntityKind::Applicant => write!(f, "Applicant"),
        }
    }
}

impl AdmissionError {
    /// Create a not found error
    pub fn not_found(entity: EntityKind, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity,
            id: id.into(),
        }
    }

    /// Create a store unavailable error
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::StoreUnavailable(message.into())
    }

    /// Create an undecidable requirement error
    pub fn unknown_predicate(requirement: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::UnknownRequirementPredicate {
            requirement: requirement.into(),
            reason: reason.into(),
        }
    }

    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a fixture error
    pub fn fixture(message: impl Into<String>) -> Self {
        Self::Fixture(message.into())
    }

    /// Whether the caller may retry the whole evaluation
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::StoreUnavailable(_))
    }
}
