// SPDX-License-Identifier: MIT

//! Applicant qualification resolver
//!
//! Flattens an applicant's documentation into qualification facts. Entries
//! that cannot form a complete fact are dropped one by one; they never fail
//! the whole resolution. Grades are kept as written, comparison happens in
//! the predicate layer.

use crate::store::{AdmissionError, ApplicantRecord, EntityKind, GraphSession, SubjectEntry};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One normalized subject result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualificationFact {
    pub subject_code: String,
    pub grade: String,
    pub grading_system: String,
    pub date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    /// Document the fact was taken from
    pub document_id: String,
}

impl QualificationFact {
    pub fn describe(&self) -> String {
        format!(
            "{} {} ({}, {})",
            self.subject_code, self.grade, self.grading_system, self.date
        )
    }
}

/// Snapshot of an applicant's facts for one evaluation
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct QualificationProfile {
    pub applicant_id: String,
    pub facts: Vec<QualificationFact>,
}

impl QualificationProfile {
    pub fn new(applicant_id: impl Into<String>, facts: Vec<QualificationFact>) -> Self {
        Self {
            applicant_id: applicant_id.into(),
            facts,
        }
    }

    /// Facts carrying `code`, compared after normalization
    pub fn facts_for<'a>(&'a self, code: &str) -> impl Iterator<Item = &'a QualificationFact> {
        let code = normalize_code(code);
        self.facts
            .iter()
            .filter(move |fact| fact.subject_code == code)
    }

    pub fn has_code(&self, code: &str) -> bool {
        self.facts_for(code).next().is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.facts.is_empty()
    }
}

/// Subject codes are compared trimmed and upper-cased
pub fn normalize_code(code: &str) -> String {
    code.trim().to_uppercase()
}

#[derive(Debug, Clone, Default)]
pub struct QualificationResolver;

impl QualificationResolver {
    pub fn new() -> Self {
        Self
    }

    /// Load the applicant and build their profile
    pub async fn resolve(
        &self,
        session: &dyn GraphSession,
        applicant_id: &str,
    ) -> Result<QualificationProfile, AdmissionError> {
        let applicant = session
            .fetch_applicant(applicant_id)
            .await?
            .ok_or_else(|| AdmissionError::not_found(EntityKind::Applicant, applicant_id))?;

        let profile = Self::normalize(&applicant);
        log::debug!(
            "Resolved {} qualification facts for applicant '{}'",
            profile.facts.len(),
            applicant_id
        );
        Ok(profile)
    }

    /// Build a profile from an already loaded applicant record
    pub fn normalize(applicant: &ApplicantRecord) -> QualificationProfile {
        let facts = applicant
            .documents
            .iter()
            .flat_map(|document| {
                document
                    .subjects
                    .iter()
                    .filter_map(move |entry| to_fact(&document.id, entry))
            })
            .collect();

        QualificationProfile::new(applicant.id.clone(), facts)
    }
}

fn to_fact(document_id: &str, entry: &SubjectEntry) -> Option<QualificationFact> {
    let subject_code = normalize_code(&entry.code);
    if subject_code.is_empty() {
        log::debug!("Skipping entry without subject code in '{}'", document_id);
        return None;
    }

    let grade = non_blank(entry.grade.as_deref());
    let grading_system = non_blank(entry.grading_system.as_deref());
    let (Some(grade), Some(grading_system), Some(date)) = (grade, grading_system, entry.date)
    else {
        log::debug!(
            "Skipping incomplete entry {} in '{}'",
            subject_code,
            document_id
        );
        return None;
    };

    Some(QualificationFact {
        subject_code,
        grade,
        grading_system,
        date,
        comment: non_blank(entry.comment.as_deref()),
        document_id: document_id.to_string(),
    })
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}
