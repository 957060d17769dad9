// SPDX-License-Identifier: MIT

//! Grade comparison per grading system
//!
//! Each grading system gets a [`GradeComparator`]; the registry looks them up
//! by system name, case-insensitively.

use once_cell::sync::Lazy;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// Decides whether a grade meets a minimum within one grading system
pub trait GradeComparator: Send + Sync {
    /// Returns the canonical name of the grading system
    fn system(&self) -> &str;

    /// `None` when either grade is not valid in this system
    fn meets(&self, grade: &str, minimum: &str) -> Option<bool>;
}

/// Integer scale where higher is better, e.g. the 1–6 scale
pub struct NumericScale {
    name: String,
    lowest: u8,
    highest: u8,
}

impl NumericScale {
    pub fn new(name: impl Into<String>, lowest: u8, highest: u8) -> Self {
        Self {
            name: name.into(),
            lowest,
            highest,
        }
    }

    fn parse(&self, grade: &str) -> Option<u8> {
        let value: u8 = grade.trim().parse().ok()?;
        (self.lowest..=self.highest).contains(&value).then_some(value)
    }
}

impl GradeComparator for NumericScale {
    fn system(&self) -> &str {
        &self.name
    }

    fn meets(&self, grade: &str, minimum: &str) -> Option<bool> {
        Some(self.parse(grade)? >= self.parse(minimum)?)
    }
}

static PASSED: Lazy<HashSet<&'static str>> =
    Lazy::new(|| HashSet::from(["bestått", "bestatt", "b", "pass", "passed", "godkjent"]));

static FAILED: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    HashSet::from([
        "ikke bestått",
        "ikke bestatt",
        "ib",
        "fail",
        "failed",
        "ikke godkjent",
    ])
});

/// Pass/fail grading; a pass meets any minimum, a fail only meets a fail
pub struct PassFail;

impl PassFail {
    fn parse(grade: &str) -> Option<bool> {
        let grade = grade.trim().to_lowercase();
        if PASSED.contains(grade.as_str()) {
            Some(true)
        } else if FAILED.contains(grade.as_str()) {
            Some(false)
        } else {
            None
        }
    }
}

impl GradeComparator for PassFail {
    fn system(&self) -> &str {
        "pass/fail"
    }

    fn meets(&self, grade: &str, minimum: &str) -> Option<bool> {
        let passed = Self::parse(grade)?;
        let required = Self::parse(minimum)?;
        Some(passed || !required)
    }
}

#[derive(Clone)]
pub struct ComparatorRegistry {
    comparators: HashMap<String, Arc<dyn GradeComparator>>,
}

impl ComparatorRegistry {
    /// An empty registry with no grading systems
    pub fn new() -> Self {
        Self {
            comparators: HashMap::new(),
        }
    }

    /// Register a comparator under its own system name and any aliases
    pub fn register(&mut self, comparator: Arc<dyn GradeComparator>, aliases: &[&str]) {
        self.comparators
            .insert(key(comparator.system()), comparator.clone());
        for alias in aliases {
            self.comparators.insert(key(alias), comparator.clone());
        }
    }

    pub fn get(&self, system: &str) -> Option<Arc<dyn GradeComparator>> {
        self.comparators.get(&key(system)).cloned()
    }
}

impl Default for ComparatorRegistry {
    /// The 1–6 scale and pass/fail under their common Norwegian names
    fn default() -> Self {
        let mut registry = Self::new();
        registry.register(
            Arc::new(NumericScale::new("1-6", 1, 6)),
            &["numeric", "karakter", "tallkarakter"],
        );
        registry.register(
            Arc::new(PassFail),
            &[
                "bestått",
                "bestatt",
                "bestått/ikke bestått",
                "godkjent/ikke godkjent",
            ],
        );
        registry
    }
}

fn key(system: &str) -> String {
    system.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric_scale() {
        let scale = NumericScale::new("1-6", 1, 6);
        assert_eq!(scale.meets("5", "4"), Some(true));
        assert_eq!(scale.meets("4", "4"), Some(true));
        assert_eq!(scale.meets("3", "4"), Some(false));
        assert_eq!(scale.meets("7", "4"), None);
        assert_eq!(scale.meets("A", "4"), None);
        assert_eq!(scale.meets("5", "0"), None);
    }

    #[test]
    fn test_pass_fail() {
        assert_eq!(PassFail.meets("Bestått", "Bestått"), Some(true));
        assert_eq!(PassFail.meets("IB", "Bestått"), Some(false));
        assert_eq!(PassFail.meets("ikke bestått", "ikke bestått"), Some(true));
        assert_eq!(PassFail.meets("maybe", "Bestått"), None);
    }

    #[test]
    fn test_registry_lookup_is_case_insensitive() {
        let registry = ComparatorRegistry::default();
        assert!(registry.get("1-6").is_some());
        assert!(registry.get("Karakter").is_some());
        assert!(registry.get("Bestått/Ikke bestått").is_some());
        assert_eq!(registry.get("PASS/FAIL").unwrap().system(), "pass/fail");
        assert!(registry.get("A-F").is_none());
    }

    #[test]
    fn test_register_custom_scale() {
        let mut registry = ComparatorRegistry::new();
        assert!(registry.get("0-10").is_none());

        registry.register(Arc::new(NumericScale::new("0-10", 0, 10)), &[]);
        let comparator = registry.get("0-10").unwrap();
        assert_eq!(comparator.meets("10", "6"), Some(true));
    }
}
