// SPDX-License-Identifier: MIT

//! Requirement trees
//!
//! This module provides the in-memory snapshot of a pathway's rule and the
//! loader that builds it from the graph store.

mod loader;
mod types;

pub use loader::TreeLoader;
pub use types::{Combinator, NodeIndex, NodeKind, RuleTree, StructuredNode, TreeNode};
