// SPDX-License-Identifier: MIT

//! Engine configuration read from the environment

use crate::opptak::rules::Language;
use crate::store::AdmissionError;
use std::path::PathBuf;

pub const DEFAULT_MAX_TREE_DEPTH: usize = 64;

const MAX_TREE_DEPTH_VAR: &str = "ADMISSION_MAX_TREE_DEPTH";
const LANGUAGE_VAR: &str = "ADMISSION_LANGUAGE";
const STORE_FILE_VAR: &str = "ADMISSION_STORE_FILE";

#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    /// Deepest nesting of logical nodes the loader accepts
    pub max_tree_depth: usize,
    /// Operator words used in rendered expressions
    pub language: Language,
    /// Seed file for the in-memory store
    pub store_file: Option<PathBuf>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_tree_depth: DEFAULT_MAX_TREE_DEPTH,
            language: Language::default(),
            store_file: None,
        }
    }
}

impl EngineConfig {
    /// Read `ADMISSION_*` variables from the process environment
    pub fn from_env() -> Result<Self, AdmissionError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; unset or blank values fall back to defaults
    pub fn from_lookup<F>(lookup: F) -> Result<Self, AdmissionError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        let mut config = Self::default();

        if let Some(raw) = get(MAX_TREE_DEPTH_VAR) {
            let depth: usize = raw.trim().parse().map_err(|_| {
                AdmissionError::config(format!(
                    "{} must be a positive integer, got '{}'",
                    MAX_TREE_DEPTH_VAR, raw
                ))
            })?;
            if depth == 0 {
                return Err(AdmissionError::config(format!(
                    "{} must be at least 1",
                    MAX_TREE_DEPTH_VAR
                )));
            }
            config.max_tree_depth = depth;
        }

        if let Some(raw) = get(LANGUAGE_VAR) {
            config.language = raw
                .parse()
                .map_err(|e: String| AdmissionError::config(format!("{}: {}", LANGUAGE_VAR, e)))?;
        }

        if let Some(raw) = get(STORE_FILE_VAR) {
            config.store_file = Some(PathBuf::from(raw.trim()));
        }

        Ok(config)
    }

    pub fn with_store_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.store_file = Some(path.into());
        self
    }
}
