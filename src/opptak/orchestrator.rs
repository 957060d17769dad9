// SPDX-License-Identifier: MIT

//! Pathway evaluation orchestrator
//!
//! Ties the store, the tree loader, the qualification resolver, the rule
//! evaluator and the expression builder together for one pathway. Each call
//! opens its own store session and keeps nothing afterwards.

use crate::opptak::config::EngineConfig;
use crate::opptak::qualification::QualificationResolver;
use crate::opptak::rules::{
    CriteriaPredicate, ExpressionBuilder, Explanation, OperatorWords, Outcome,
    RequirementPredicate, RuleEvaluator, RuleTree, StructuredNode, TreeLoader,
};
use crate::store::{AdmissionError, EntityKind, GraphSession, GraphStore, OpptaksVei};
use serde::Serialize;
use std::sync::Arc;

/// Verdict for one applicant on one pathway
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PathwayDecision {
    pub pathway: OpptaksVei,
    pub applicant_id: String,
    pub satisfied: bool,
    pub outcome: Outcome,
    pub explanation: Explanation,
    /// The pathway's rule as a boolean expression
    pub expression: String,
}

/// Rule preview for one pathway, without an applicant
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PathwayExplanation {
    pub pathway: OpptaksVei,
    pub expression: String,
    pub tree: Option<StructuredNode>,
}

pub struct PathwayEvaluator {
    store: Arc<dyn GraphStore>,
    loader: TreeLoader,
    resolver: QualificationResolver,
    evaluator: RuleEvaluator,
    expressions: ExpressionBuilder,
}

impl PathwayEvaluator {
    /// Evaluator using the criteria-driven predicate
    pub fn new(store: Arc<dyn GraphStore>, config: &EngineConfig) -> Self {
        Self::with_predicate(store, config, Arc::new(CriteriaPredicate::default()))
    }

    pub fn with_predicate(
        store: Arc<dyn GraphStore>,
        config: &EngineConfig,
        predicate: Arc<dyn RequirementPredicate>,
    ) -> Self {
        Self {
            store,
            loader: TreeLoader::new(config.max_tree_depth),
            resolver: QualificationResolver::new(),
            evaluator: RuleEvaluator::new(predicate),
            expressions: ExpressionBuilder::new(OperatorWords::for_language(config.language)),
        }
    }

    /// Decide whether an applicant satisfies a pathway's rule
    pub async fn evaluate_pathway(
        &self,
        applicant_id: &str,
        pathway_id: &str,
    ) -> Result<PathwayDecision, AdmissionError> {
        let session = self.store.connect().await?;
        let pathway = fetch_pathway(session.as_ref(), pathway_id).await?;
        let root_id = pathway
            .root
            .clone()
            .ok_or_else(|| AdmissionError::not_found(EntityKind::RootNode, pathway_id))?;

        let (tree, profile) = tokio::try_join!(
            self.load_tree(session.as_ref(), &root_id),
            self.resolver.resolve(session.as_ref(), applicant_id),
        )?;
        drop(session);

        if tree.is_empty() {
            return Err(AdmissionError::not_found(EntityKind::RootNode, root_id));
        }
        // A rule that names no requirement would pass every applicant
        if tree.leaf_names().is_empty() {
            log::warn!(
                "Pathway '{}' has rule '{}' with no requirements",
                pathway_id,
                root_id
            );
            return Err(AdmissionError::not_found(EntityKind::RootNode, root_id));
        }

        let evaluation = self.evaluator.evaluate(&tree, &profile);
        let expression = self.expressions.build(&tree);

        if evaluation.outcome == Outcome::Malformed {
            log::warn!(
                "Pathway '{}' has a malformed rule: {}",
                pathway_id,
                evaluation.explanation.detail
            );
        }
        log::info!(
            "Applicant '{}' on pathway '{}': {:?}",
            applicant_id,
            pathway_id,
            evaluation.outcome
        );

        Ok(PathwayDecision {
            pathway,
            applicant_id: applicant_id.to_string(),
            satisfied: evaluation.satisfied(),
            outcome: evaluation.outcome,
            explanation: evaluation.explanation,
            expression,
        })
    }

    /// Render a pathway's rule for authors, without evaluating it
    pub async fn explain_pathway(
        &self,
        pathway_id: &str,
    ) -> Result<PathwayExplanation, AdmissionError> {
        let session = self.store.connect().await?;
        let pathway = fetch_pathway(session.as_ref(), pathway_id).await?;

        let tree = match &pathway.root {
            Some(root_id) => self.load_tree(session.as_ref(), root_id).await?,
            None => {
                log::debug!("Pathway '{}' has no rule", pathway_id);
                RuleTree::empty()
            }
        };

        Ok(PathwayExplanation {
            expression: self.expressions.build(&tree),
            tree: tree.structured(),
            pathway,
        })
    }

    async fn load_tree(
        &self,
        session: &dyn GraphSession,
        root_id: &str,
    ) -> Result<RuleTree, AdmissionError> {
        self.loader.load(session, root_id).await.inspect_err(|e| {
            if matches!(e, AdmissionError::MalformedTree(_)) {
                log::error!("Cannot load rule '{}': {}", root_id, e);
            }
        })
    }
}

async fn fetch_pathway(
    session: &dyn GraphSession,
    pathway_id: &str,
) -> Result<OpptaksVei, AdmissionError> {
    session
        .fetch_pathway(pathway_id)
        .await?
        .ok_or_else(|| AdmissionError::not_found(EntityKind::Pathway, pathway_id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::opptak::rules::Language;
    use crate::store::memory::EvaluatesTarget;
    use crate::store::{
        ApplicantRecord, DocumentRecord, InMemoryGraphStore, Kravelement, LogicalNodeRecord,
        RequirementCriteria, SubjectEntry,
    };

    fn requirement(id: &str, name: &str, code: &str) -> Kravelement {
        Kravelement {
            id: id.to_string(),
            name: name.to_string(),
            category: "fag".to_string(),
            description: String::new(),
            active: true,
            criteria: Some(RequirementCriteria::SubjectCode {
                code: code.to_string(),
            }),
        }
    }

    fn pathway(id: &str, root: Option<&str>) -> OpptaksVei {
        OpptaksVei {
            id: id.to_string(),
            name: format!("Vei {}", id),
            description: String::new(),
            root: root.map(str::to_string),
            basis: None,
            quota_type: None,
            ranking_formula: None,
        }
    }

    async fn seeded() -> InMemoryGraphStore {
        let store = InMemoryGraphStore::new();
        store
            .insert_requirement(requirement("gsk", "Generell studiekompetanse", "GSK"))
            .await;
        store
            .insert_requirement(requirement("r1", "Matematikk R1", "REA3022"))
            .await;
        store
            .insert_node(
                LogicalNodeRecord {
                    id: "root".to_string(),
                    name: "Opptak".to_string(),
                    combinator: "AND".to_string(),
                },
                vec![
                    EvaluatesTarget::Requirement("gsk".to_string()),
                    EvaluatesTarget::Requirement("r1".to_string()),
                ],
            )
            .await;
        store.insert_pathway(pathway("ordinaer", Some("root"))).await;
        store.insert_pathway(pathway("tom", None)).await;
        store.insert_pathway(pathway("brutt", Some("ghost"))).await;
        store
            .insert_node(
                LogicalNodeRecord {
                    id: "hul".to_string(),
                    name: "Uten krav".to_string(),
                    combinator: "AND".to_string(),
                },
                Vec::new(),
            )
            .await;
        store.insert_pathway(pathway("hul", Some("hul"))).await;
        store
            .insert_applicant(ApplicantRecord {
                id: "kari".to_string(),
                name: "Kari".to_string(),
                documents: vec![DocumentRecord {
                    id: "vitnemaal".to_string(),
                    title: String::new(),
                    subjects: vec![SubjectEntry {
                        code: "GSK".to_string(),
                        grade: Some("Bestått".to_string()),
                        grading_system: Some("pass/fail".to_string()),
                        date: Some("2023-06-20".parse().unwrap()),
                        comment: None,
                    }],
                }],
            })
            .await;
        store
    }

    fn evaluator(store: &InMemoryGraphStore) -> PathwayEvaluator {
        PathwayEvaluator::new(Arc::new(store.clone()), &EngineConfig::default())
    }

    #[tokio::test]
    async fn test_evaluate_lists_unmet_requirement() {
        let store = seeded().await;
        let decision = evaluator(&store)
            .evaluate_pathway("kari", "ordinaer")
            .await
            .unwrap();

        assert!(!decision.satisfied);
        assert_eq!(decision.outcome, Outcome::Unsatisfied);
        assert_eq!(decision.explanation.unmet_requirements(), vec!["Matematikk R1"]);
        assert_eq!(
            decision.expression,
            "Generell studiekompetanse AND Matematikk R1"
        );
        assert_eq!(store.open_sessions(), 0);
    }

    #[tokio::test]
    async fn test_pathway_without_rule() {
        let store = seeded().await;
        let evaluator = evaluator(&store);

        let err = evaluator.evaluate_pathway("kari", "tom").await.unwrap_err();
        assert!(matches!(
            err,
            AdmissionError::NotFound {
                entity: EntityKind::RootNode,
                ..
            }
        ));

        let preview = evaluator.explain_pathway("tom").await.unwrap();
        assert_eq!(preview.expression, "");
        assert!(preview.tree.is_none());
    }

    #[tokio::test]
    async fn test_missing_root_node() {
        let store = seeded().await;
        let err = evaluator(&store)
            .evaluate_pathway("kari", "brutt")
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Root node 'ghost' not found");
        assert_eq!(store.open_sessions(), 0);
    }

    #[tokio::test]
    async fn test_rule_without_requirements() {
        let store = seeded().await;
        let evaluator = evaluator(&store);

        let err = evaluator.evaluate_pathway("kari", "hul").await.unwrap_err();
        assert!(matches!(
            err,
            AdmissionError::NotFound {
                entity: EntityKind::RootNode,
                ..
            }
        ));
        assert_eq!(err.to_string(), "Root node 'hul' not found");
        assert_eq!(store.open_sessions(), 0);

        let preview = evaluator.explain_pathway("hul").await.unwrap();
        assert!(preview.tree.unwrap().leaf_names().is_empty());
    }

    #[tokio::test]
    async fn test_missing_pathway_and_applicant() {
        let store = seeded().await;
        let evaluator = evaluator(&store);

        let err = evaluator.evaluate_pathway("kari", "nope").await.unwrap_err();
        assert_eq!(err.to_string(), "Pathway 'nope' not found");

        let err = evaluator
            .evaluate_pathway("ola", "ordinaer")
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Applicant 'ola' not found");

        assert!(evaluator.explain_pathway("nope").await.is_err());
        assert_eq!(store.open_sessions(), 0);
    }

    #[tokio::test]
    async fn test_explain_uses_configured_language() {
        let store = seeded().await;
        let config = EngineConfig {
            language: Language::Norwegian,
            ..EngineConfig::default()
        };
        let evaluator = PathwayEvaluator::new(Arc::new(store.clone()), &config);

        let preview = evaluator.explain_pathway("ordinaer").await.unwrap();
        assert_eq!(preview.expression, "Generell studiekompetanse OG Matematikk R1");
        let tree = preview.tree.unwrap();
        assert_eq!(tree.combinator, "AND");
        assert_eq!(tree.requirements.len(), 2);
    }

    #[tokio::test]
    async fn test_store_outage() {
        let store = seeded().await;
        store.set_available(false);

        let err = evaluator(&store)
            .evaluate_pathway("kari", "ordinaer")
            .await
            .unwrap_err();
        assert!(err.is_recoverable());
    }
}
