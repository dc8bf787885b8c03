//! Run persistence.
//!
//! The pipeline only needs create/fetch/update of a run record; child rows
//! (page scores, competitors, recommendations, probes, call logs) are
//! carried on the run itself and written through `update_run`. `MemoryStore`
//! is the always-available backend, used directly in tests and small
//! deployments.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::RwLock;
use uuid::Uuid;

use crate::error::{AnalyzerError, Result};
use crate::types::AnalysisRun;

#[async_trait]
pub trait RunStore: Send + Sync {
    async fn create_run(&self, run: &AnalysisRun) -> Result<()>;

    async fn get_run(&self, id: Uuid) -> Result<Option<AnalysisRun>>;

    /// Persist the run's current state. Fails when the run was never
    /// created.
    async fn update_run(&self, run: &AnalysisRun) -> Result<()>;

    async fn list_runs(&self) -> Result<Vec<AnalysisRun>>;
}

/// In-memory run storage. Data is lost on restart.
pub struct MemoryStore {
    runs: RwLock<HashMap<Uuid, AnalysisRun>>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            runs: RwLock::new(HashMap::new()),
        }
    }

    pub fn run_count(&self) -> usize {
        self.runs.read().unwrap().len()
    }

    pub fn clear(&self) {
        self.runs.write().unwrap().clear();
    }
}

#[async_trait]
impl RunStore for MemoryStore {
    async fn create_run(&self, run: &AnalysisRun) -> Result<()> {
        self.runs.write().unwrap().insert(run.id, run.clone());
        Ok(())
    }

    async fn get_run(&self, id: Uuid) -> Result<Option<AnalysisRun>> {
        Ok(self.runs.read().unwrap().get(&id).cloned())
    }

    async fn update_run(&self, run: &AnalysisRun) -> Result<()> {
        let mut runs = self.runs.write().unwrap();
        if !runs.contains_key(&run.id) {
            return Err(AnalyzerError::Store(format!("unknown run {}", run.id)));
        }
        runs.insert(run.id, run.clone());
        Ok(())
    }

    async fn list_runs(&self) -> Result<Vec<AnalysisRun>> {
        let mut runs: Vec<AnalysisRun> = self.runs.read().unwrap().values().cloned().collect();
        runs.sort_by_key(|r| r.created_at);
        Ok(runs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{AnalysisRequest, RunStatus};

    #[tokio::test]
    async fn test_create_and_fetch() {
        let store = MemoryStore::new();
        let run = AnalysisRun::new(&AnalysisRequest::new("https://example.com"));
        store.create_run(&run).await.unwrap();

        let fetched = store.get_run(run.id).await.unwrap().unwrap();
        assert_eq!(fetched.url, "https://example.com");
        assert_eq!(fetched.status, RunStatus::Pending);
    }

    #[tokio::test]
    async fn test_update_requires_existing_run() {
        let store = MemoryStore::new();
        let run = AnalysisRun::new(&AnalysisRequest::new("https://example.com"));
        assert!(store.update_run(&run).await.is_err());

        store.create_run(&run).await.unwrap();
        let mut updated = run.clone();
        updated.progress = 45;
        store.update_run(&updated).await.unwrap();
        assert_eq!(store.get_run(run.id).await.unwrap().unwrap().progress, 45);
    }

    #[tokio::test]
    async fn test_list_sorted_by_creation() {
        let store = MemoryStore::new();
        for url in ["https://a.com", "https://b.com"] {
            store
                .create_run(&AnalysisRun::new(&AnalysisRequest::new(url)))
                .await
                .unwrap();
        }
        assert_eq!(store.run_count(), 2);
        assert_eq!(store.list_runs().await.unwrap().len(), 2);
    }
}
