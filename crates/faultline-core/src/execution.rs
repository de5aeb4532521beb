//! Execution journal: one record per pipeline run, kept in the artifact
//! store so the read API can serve run history without talking to any
//! external workflow service.

use crate::error::Result;
use crate::paths;
use crate::store::ArtifactStore;
use crate::types::ServiceTag;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionStatus {
    Succeeded,
    Failed,
}

impl fmt::Display for ExecutionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ExecutionStatus::Succeeded => "succeeded",
            ExecutionStatus::Failed => "failed",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionRecord {
    pub id: String,
    /// Storage slug of the scenario this run processed.
    pub scenario: String,
    pub scenario_name: String,
    pub status: ExecutionStatus,
    pub services: Vec<ServiceTag>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl ExecutionRecord {
    pub fn save(&self, store: &dyn ArtifactStore) -> Result<()> {
        let data = serde_json::to_vec_pretty(self)?;
        store.put(&paths::execution_key(&self.id), &data)
    }

    /// All records, newest first.
    pub fn list(store: &dyn ArtifactStore) -> Result<Vec<ExecutionRecord>> {
        let mut records = Vec::new();
        for key in store.list("executions/")? {
            let record: ExecutionRecord = serde_json::from_slice(&store.get(&key)?)?;
            records.push(record);
        }
        records.sort_by(|a, b| b.started_at.cmp(&a.started_at));
        Ok(records)
    }

    /// Records for one scenario slug, newest first.
    pub fn list_for_scenario(
        store: &dyn ArtifactStore,
        slug: &str,
    ) -> Result<Vec<ExecutionRecord>> {
        let mut records = Self::list(store)?;
        records.retain(|r| r.scenario == slug);
        Ok(records)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
