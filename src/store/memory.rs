// SPDX-License-Identifier: MIT

//! In-memory graph store
//!
//! Backs the CLI, the HTTP server and the test suites. Data lives behind a
//! shared `RwLock`; sessions are counted so callers can check that every
//! evaluation released its session.

use super::error::{AdmissionError, TreeError};
use super::records::{ApplicantRecord, Kravelement, LogicalNodeRecord, NodeWithTargets, OpptaksVei};
use super::{GraphSession, GraphStore};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

/// Target of an "evaluates" edge
#[derive(Debug, Clone, PartialEq)]
pub enum EvaluatesTarget {
    Requirement(String),
    Node(String),
}

/// A logical node with its outgoing edges as persisted
#[derive(Debug, Clone, PartialEq)]
pub struct StoredNode {
    pub record: LogicalNodeRecord,
    pub evaluates: Vec<EvaluatesTarget>,
}

/// Raw contents of the store
#[derive(Debug, Clone, Default)]
pub struct StoreData {
    pub nodes: HashMap<String, StoredNode>,
    pub requirements: HashMap<String, Kravelement>,
    pub pathways: HashMap<String, OpptaksVei>,
    pub applicants: HashMap<String, ApplicantRecord>,
}

#[derive(Debug, Clone)]
pub struct InMemoryGraphStore {
    data: Arc<RwLock<StoreData>>,
    available: Arc<AtomicBool>,
    open_sessions: Arc<AtomicUsize>,
}

impl InMemoryGraphStore {
    pub fn new() -> Self {
        Self::from_data(StoreData::default())
    }

    pub fn from_data(data: StoreData) -> Self {
        Self {
            data: Arc::new(RwLock::new(data)),
            available: Arc::new(AtomicBool::new(true)),
            open_sessions: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub async fn insert_requirement(&self, requirement: Kravelement) {
        let mut data = self.data.write().await;
        data.requirements.insert(requirement.id.clone(), requirement);
    }

    pub async fn insert_node(&self, record: LogicalNodeRecord, evaluates: Vec<EvaluatesTarget>) {
        let mut data = self.data.write().await;
        data.nodes
            .insert(record.id.clone(), StoredNode { record, evaluates });
    }

    pub async fn insert_pathway(&self, pathway: OpptaksVei) {
        let mut data = self.data.write().await;
        data.pathways.insert(pathway.id.clone(), pathway);
    }

    pub async fn insert_applicant(&self, applicant: ApplicantRecord) {
        let mut data = self.data.write().await;
        data.applicants.insert(applicant.id.clone(), applicant);
    }

    /// Simulate an outage; new sessions and lookups fail while unavailable
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    /// Number of sessions currently held by callers
    pub fn open_sessions(&self) -> usize {
        self.open_sessions.load(Ordering::SeqCst)
    }
}

impl Default for InMemoryGraphStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl GraphStore for InMemoryGraphStore {
    async fn connect(&self) -> Result<Box<dyn GraphSession>, AdmissionError> {
        if !self.available.load(Ordering::SeqCst) {
            return Err(AdmissionError::unavailable("in-memory store is offline"));
        }

        self.open_sessions.fetch_add(1, Ordering::SeqCst);
        log::debug!(
            "Opened store session ({} open)",
            self.open_sessions.load(Ordering::SeqCst)
        );

        Ok(Box::new(MemorySession {
            data: self.data.clone(),
            available: self.available.clone(),
            _lease: SessionLease {
                open_sessions: self.open_sessions.clone(),
            },
        }))
    }
}

/// Decrements the open-session counter when the session goes away
struct SessionLease {
    open_sessions: Arc<AtomicUsize>,
}

impl Drop for SessionLease {
    fn drop(&mut self) {
        self.open_sessions.fetch_sub(1, Ordering::SeqCst);
    }
}

struct MemorySession {
    data: Arc<RwLock<StoreData>>,
    available: Arc<AtomicBool>,
    _lease: SessionLease,
}

impl MemorySession {
    fn ensure_available(&self) -> Result<(), AdmissionError> {
        if self.available.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(AdmissionError::unavailable("in-memory store went offline"))
        }
    }
}

#[async_trait]
impl GraphSession for MemorySession {
    async fn fetch_node(&self, id: &str) -> Result<Option<NodeWithTargets>, AdmissionError> {
        self.ensure_available()?;
        let data = self.data.read().await;

        let Some(stored) = data.nodes.get(id) else {
            return Ok(None);
        };

        let mut requirements = Vec::new();
        let mut children = Vec::new();
        for target in &stored.evaluates {
            match target {
                EvaluatesTarget::Requirement(req_id) => {
                    let requirement = data.requirements.get(req_id).ok_or_else(|| {
                        TreeError::DanglingReference {
                            from: id.to_string(),
                            to: req_id.clone(),
                        }
                    })?;
                    requirements.push(requirement.clone());
                }
                EvaluatesTarget::Node(node_id) => children.push(node_id.clone()),
            }
        }

        Ok(Some(NodeWithTargets {
            node: stored.record.clone(),
            requirements,
            children,
        }))
    }

    async fn fetch_pathway(&self, id: &str) -> Result<Option<OpptaksVei>, AdmissionError> {
        self.ensure_available()?;
        let data = self.data.read().await;
        Ok(data.pathways.get(id).cloned())
    }

    async fn fetch_applicant(&self, id: &str) -> Result<Option<ApplicantRecord>, AdmissionError> {
        self.ensure_available()?;
        let data = self.data.read().await;
        Ok(data.applicants.get(id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(id: &str, combinator: &str) -> LogicalNodeRecord {
        LogicalNodeRecord {
            id: id.to_string(),
            name: id.to_string(),
            combinator: combinator.to_string(),
        }
    }

    fn requirement(id: &str) -> Kravelement {
        Kravelement {
            id: id.to_string(),
            name: id.to_string(),
            category: String::new(),
            description: String::new(),
            active: true,
            criteria: None,
        }
    }

    #[tokio::test]
    async fn test_fetch_node_splits_targets() {
        let store = InMemoryGraphStore::new();
        store.insert_requirement(requirement("krav-a")).await;
        store
            .insert_node(
                node("root", "AND"),
                vec![
                    EvaluatesTarget::Node("child".to_string()),
                    EvaluatesTarget::Requirement("krav-a".to_string()),
                ],
            )
            .await;

        let session = store.connect().await.unwrap();
        let fetched = session.fetch_node("root").await.unwrap().unwrap();

        assert_eq!(fetched.node.combinator, "AND");
        assert_eq!(fetched.requirements.len(), 1);
        assert_eq!(fetched.requirements[0].id, "krav-a");
        assert_eq!(fetched.children, vec!["child".to_string()]);
    }

    #[tokio::test]
    async fn test_fetch_missing_node_is_none() {
        let store = InMemoryGraphStore::new();
        let session = store.connect().await.unwrap();
        assert!(session.fetch_node("nope").await.unwrap().is_none());
        assert!(session.fetch_pathway("nope").await.unwrap().is_none());
        assert!(session.fetch_applicant("nope").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_dangling_requirement_edge_is_malformed() {
        let store = InMemoryGraphStore::new();
        store
            .insert_node(
                node("root", "AND"),
                vec![EvaluatesTarget::Requirement("ghost".to_string())],
            )
            .await;

        let session = store.connect().await.unwrap();
        let err = session.fetch_node("root").await.unwrap_err();
        assert!(matches!(
            err,
            AdmissionError::MalformedTree(TreeError::DanglingReference { .. })
        ));
    }

    #[tokio::test]
    async fn test_session_counter_released_on_drop() {
        let store = InMemoryGraphStore::new();
        assert_eq!(store.open_sessions(), 0);

        let first = store.connect().await.unwrap();
        let second = store.connect().await.unwrap();
        assert_eq!(store.open_sessions(), 2);

        drop(first);
        assert_eq!(store.open_sessions(), 1);
        drop(second);
        assert_eq!(store.open_sessions(), 0);
    }

    #[tokio::test]
    async fn test_unavailable_store_refuses_sessions() {
        let store = InMemoryGraphStore::new();
        store.set_available(false);

        let result = store.connect().await;
        assert!(matches!(result, Err(AdmissionError::StoreUnavailable(_))));
        assert_eq!(store.open_sessions(), 0);
    }

    #[tokio::test]
    async fn test_outage_mid_session_fails_lookups() {
        let store = InMemoryGraphStore::new();
        let session = store.connect().await.unwrap();
        store.set_available(false);

        let result = session.fetch_pathway("any").await;
        assert!(matches!(result, Err(AdmissionError::StoreUnavailable(_))));
    }

    #[tokio::test]
    async fn test_store_is_clone() {
        let store = InMemoryGraphStore::new();
        let cloned = store.clone();

        cloned.insert_requirement(requirement("shared")).await;
        cloned
            .insert_node(
                node("n", "OR"),
                vec![EvaluatesTarget::Requirement("shared".to_string())],
            )
            .await;

        let session = store.connect().await.unwrap();
        assert!(session.fetch_node("n").await.unwrap().is_some());
        assert_eq!(cloned.open_sessions(), 1);
    }
}
