// SPDX-License-Identifier: MIT

//! Fixture loader - YAML seed file loading and validation
//!
//! Turns a [`FixtureDocument`] into an [`InMemoryGraphStore`]. Ids must be
//! unique per kind and every "evaluates" target must name exactly one
//! requirement element or node.

use super::types::FixtureDocument;
use crate::store::memory::{EvaluatesTarget, StoreData, StoredNode};
use crate::store::{AdmissionError, InMemoryGraphStore, LogicalNodeRecord};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// Loads store contents from YAML seed files
pub struct FixtureLoader;

impl FixtureLoader {
    pub fn new() -> Self {
        Self
    }

    /// Load a seed file straight into a store
    pub fn load_store<P: AsRef<Path>>(
        &self,
        path: P,
    ) -> Result<InMemoryGraphStore, AdmissionError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            AdmissionError::fixture(format!("cannot read {}: {}", path.display(), e))
        })?;
        let document = Self::parse_yaml(&content)?;
        let store = Self::build_store(document)?;
        log::info!("Loaded store fixture from {}", path.display());
        Ok(store)
    }

    /// Parse a seed document from a YAML string
    pub fn parse_yaml(content: &str) -> Result<FixtureDocument, AdmissionError> {
        let document: FixtureDocument = serde_yaml::from_str(content)?;
        Ok(document)
    }

    /// Validate a seed document and build the store
    pub fn build_store(document: FixtureDocument) -> Result<InMemoryGraphStore, AdmissionError> {
        let data = Self::build_data(document)?;
        Ok(InMemoryGraphStore::from_data(data))
    }

    fn build_data(document: FixtureDocument) -> Result<StoreData, AdmissionError> {
        let mut data = StoreData::default();

        for requirement in document.requirements {
            let id = requirement.id.clone();
            if data.requirements.insert(id.clone(), requirement).is_some() {
                return Err(duplicate("requirement", &id));
            }
        }

        let mut definitions = HashMap::new();
        for node in document.nodes {
            let id = node.id.clone();
            if definitions.insert(id.clone(), node).is_some() {
                return Err(duplicate("node", &id));
            }
        }

        for (id, definition) in &definitions {
            let evaluates = definition
                .evaluates
                .iter()
                .map(|target| resolve_target(id, target, &data.requirements, &definitions))
                .collect::<Result<Vec<_>, _>>()?;

            data.nodes.insert(
                id.clone(),
                StoredNode {
                    record: LogicalNodeRecord {
                        id: id.clone(),
                        name: definition.name.clone(),
                        combinator: definition.combinator.clone(),
                    },
                    evaluates,
                },
            );
        }

        for pathway in document.pathways {
            match &pathway.root {
                Some(root) if !data.nodes.contains_key(root) => log::warn!(
                    "Pathway '{}' refers to unknown root node '{}'",
                    pathway.id,
                    root
                ),
                None => log::warn!("Pathway '{}' has no root node", pathway.id),
                _ => {}
            }
            let id = pathway.id.clone();
            if data.pathways.insert(id.clone(), pathway).is_some() {
                return Err(duplicate("pathway", &id));
            }
        }

        for applicant in document.applicants {
            let id = applicant.id.clone();
            if data.applicants.insert(id.clone(), applicant).is_some() {
                return Err(duplicate("applicant", &id));
            }
        }

        log::debug!(
            "Fixture holds {} requirements, {} nodes, {} pathways, {} applicants",
            data.requirements.len(),
            data.nodes.len(),
            data.pathways.len(),
            data.applicants.len()
        );
        Ok(data)
    }
}

impl Default for FixtureLoader {
    fn default() -> Self {
        Self::new()
    }
}

fn resolve_target<R, N>(
    from: &str,
    target: &str,
    requirements: &HashMap<String, R>,
    nodes: &HashMap<String, N>,
) -> Result<EvaluatesTarget, AdmissionError> {
    match (requirements.contains_key(target), nodes.contains_key(target)) {
        (true, false) => Ok(EvaluatesTarget::Requirement(target.to_string())),
        (false, true) => Ok(EvaluatesTarget::Node(target.to_string())),
        (true, true) => Err(AdmissionError::fixture(format!(
            "node '{}' evaluates '{}', which is both a requirement and a node",
            from, target
        ))),
        (false, false) => Err(AdmissionError::fixture(format!(
            "node '{}' evaluates unknown target '{}'",
            from, target
        ))),
    }
}

fn duplicate(kind: &str, id: &str) -> AdmissionError {
    AdmissionError::fixture(format!("duplicate {} id '{}'", kind, id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{GraphStore, RequirementCriteria};

    const SEED: &str = r#"
requirements:
  - id: gsk
    name: Generell studiekompetanse
    criteria:
      kind: subject_code
      code: GSK
  - id: r1
    name: Matematikk R1
    criteria:
      kind: minimum_grade
      code: REA3022
      minimum: "4"
nodes:
  - id: root
    name: Sivilingeniør
    type: AND
    evaluates: [gsk, math]
  - id: math
    name: Matematikk
    type: OR
    evaluates: [r1]
pathways:
  - id: ordinaer
    name: Ordinær vei
    root: root
applicants:
  - id: kari
    name: Kari Nordmann
    documents:
      - id: vitnemaal
        subjects:
          - code: REA3022
            grade: "5"
            grading_system: "1-6"
            date: 2023-06-20
"#;

    #[test]
    fn test_parse_seed_document() {
        let document = FixtureLoader::parse_yaml(SEED).unwrap();
        assert_eq!(document.requirements.len(), 2);
        assert_eq!(document.nodes.len(), 2);
        assert_eq!(document.nodes[0].combinator, "AND");
        assert_eq!(document.nodes[0].evaluates, vec!["gsk", "math"]);
        assert_eq!(document.pathways[0].root.as_deref(), Some("root"));
        assert!(matches!(
            document.requirements[1].criteria,
            Some(RequirementCriteria::MinimumGrade { .. })
        ));

        let entry = &document.applicants[0].documents[0].subjects[0];
        assert_eq!(entry.date, Some("2023-06-20".parse().unwrap()));
    }

    #[tokio::test]
    async fn test_build_store_resolves_targets() {
        let store = FixtureLoader::build_store(FixtureLoader::parse_yaml(SEED).unwrap()).unwrap();
        let session = store.connect().await.unwrap();

        let root = session.fetch_node("root").await.unwrap().unwrap();
        assert_eq!(root.requirements.len(), 1);
        assert_eq!(root.requirements[0].id, "gsk");
        assert_eq!(root.children, vec!["math"]);

        assert!(session.fetch_pathway("ordinaer").await.unwrap().is_some());
        assert!(session.fetch_applicant("kari").await.unwrap().is_some());
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let yaml = r#"
requirements:
  - { id: a, name: A }
  - { id: a, name: A again }
"#;
        let err = FixtureLoader::build_store(FixtureLoader::parse_yaml(yaml).unwrap()).unwrap_err();
        assert_eq!(err.to_string(), "Fixture error: duplicate requirement id 'a'");
    }

    #[test]
    fn test_unknown_target_rejected() {
        let yaml = r#"
nodes:
  - { id: root, name: Root, type: AND, evaluates: [ghost] }
"#;
        let err = FixtureLoader::build_store(FixtureLoader::parse_yaml(yaml).unwrap()).unwrap_err();
        assert!(err.to_string().contains("unknown target 'ghost'"));
    }

    #[test]
    fn test_ambiguous_target_rejected() {
        let yaml = r#"
requirements:
  - { id: x, name: X }
nodes:
  - { id: x, name: X node, type: OR }
  - { id: root, name: Root, type: AND, evaluates: [x] }
"#;
        let err = FixtureLoader::build_store(FixtureLoader::parse_yaml(yaml).unwrap()).unwrap_err();
        assert!(err.to_string().contains("both a requirement and a node"));
    }

    #[test]
    fn test_invalid_yaml() {
        let err = FixtureLoader::parse_yaml("requirements: [").unwrap_err();
        assert!(matches!(err, AdmissionError::Yaml(_)));
    }

    #[test]
    fn test_missing_file() {
        let err = FixtureLoader::new()
            .load_store("/nonexistent/opptak.yaml")
            .unwrap_err();
        assert!(matches!(err, AdmissionError::Fixture(_)));
    }
}
