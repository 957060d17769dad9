// SPDX-License-Identifier: MIT

//! Fixture module - seeds the in-memory store from YAML

pub mod loader;
pub mod types;

pub use loader::FixtureLoader;
pub use types::{FixtureDocument, NodeDefinition};
