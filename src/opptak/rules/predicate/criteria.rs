// SPDX-License-Identifier: MIT

use super::grading::ComparatorRegistry;
use super::{PredicateOutcome, RequirementPredicate};
use crate::opptak::qualification::{normalize_code, QualificationFact, QualificationProfile};
use crate::store::{AdmissionError, Kravelement, RequirementCriteria};

/// Default predicate driven by [`RequirementCriteria`] metadata
#[derive(Clone, Default)]
pub struct CriteriaPredicate {
    comparators: ComparatorRegistry,
}

impl CriteriaPredicate {
    pub fn new(comparators: ComparatorRegistry) -> Self {
        Self { comparators }
    }

    fn decide(
        &self,
        requirement: &Kravelement,
        profile: &QualificationProfile,
    ) -> Result<PredicateOutcome, AdmissionError> {
        let criteria = requirement.criteria.as_ref().ok_or_else(|| {
            AdmissionError::unknown_predicate(&requirement.name, "no matching criteria recorded")
        })?;

        match criteria {
            RequirementCriteria::SubjectCode { code } => Ok(subject_code(code, profile)),
            RequirementCriteria::MinimumGrade {
                code,
                minimum,
                grading_system,
            } => self.minimum_grade(requirement, code, minimum, grading_system.as_deref(), profile),
            RequirementCriteria::Combination { codes, minimum } => {
                combination(requirement, codes, *minimum, profile)
            }
        }
    }

    fn minimum_grade(
        &self,
        requirement: &Kravelement,
        code: &str,
        minimum: &str,
        grading_system: Option<&str>,
        profile: &QualificationProfile,
    ) -> Result<PredicateOutcome, AdmissionError> {
        let mut undecided = Vec::new();
        let mut seen = false;

        for fact in profile.facts_for(code) {
            if let Some(system) = grading_system {
                if !fact.grading_system.trim().eq_ignore_ascii_case(system.trim()) {
                    continue;
                }
            }
            seen = true;

            let Some(comparator) = self.comparators.get(&fact.grading_system) else {
                undecided.push(format!("no comparator for '{}'", fact.grading_system));
                continue;
            };
            match comparator.meets(&fact.grade, minimum) {
                Some(true) => {
                    return Ok(PredicateOutcome::Matched {
                        facts: vec![fact.clone()],
                    })
                }
                Some(false) => {}
                None => undecided.push(format!(
                    "grade '{}' or minimum '{}' invalid in '{}'",
                    fact.grade, minimum, fact.grading_system
                )),
            }
        }

        if !undecided.is_empty() {
            return Err(AdmissionError::unknown_predicate(
                &requirement.name,
                undecided.join("; "),
            ));
        }

        let criterion = if seen {
            format!("requires grade {} or better in {}", minimum, normalize_code(code))
        } else {
            format!("requires {} with grade {} or better", normalize_code(code), minimum)
        };
        Ok(PredicateOutcome::Unmet { criterion })
    }
}

impl RequirementPredicate for CriteriaPredicate {
    fn check(&self, requirement: &Kravelement, profile: &QualificationProfile) -> PredicateOutcome {
        match self.decide(requirement, profile) {
            Ok(outcome) => outcome,
            Err(err) => {
                log::debug!("Requirement '{}' undetermined: {}", requirement.id, err);
                PredicateOutcome::Undetermined {
                    reason: err.to_string(),
                }
            }
        }
    }
}

fn subject_code(code: &str, profile: &QualificationProfile) -> PredicateOutcome {
    match profile.facts_for(code).next() {
        Some(fact) => PredicateOutcome::Matched {
            facts: vec![fact.clone()],
        },
        None => PredicateOutcome::Unmet {
            criterion: format!("requires subject code {}", normalize_code(code)),
        },
    }
}

fn combination(
    requirement: &Kravelement,
    codes: &[String],
    minimum: Option<usize>,
    profile: &QualificationProfile,
) -> Result<PredicateOutcome, AdmissionError> {
    if codes.is_empty() {
        return Err(AdmissionError::unknown_predicate(
            &requirement.name,
            "combination lists no subject codes",
        ));
    }

    let required = minimum.unwrap_or(codes.len()).min(codes.len());
    let mut matched: Vec<QualificationFact> = Vec::new();
    let mut missing: Vec<String> = Vec::new();
    for code in codes {
        match profile.facts_for(code).next() {
            Some(fact) => matched.push(fact.clone()),
            None => missing.push(normalize_code(code)),
        }
    }

    if matched.len() >= required {
        Ok(PredicateOutcome::Matched { facts: matched })
    } else {
        Ok(PredicateOutcome::Unmet {
            criterion: format!(
                "requires {} of {} subject codes, missing {}",
                required,
                codes.len(),
                missing.join(", ")
            ),
        })
    }
}
