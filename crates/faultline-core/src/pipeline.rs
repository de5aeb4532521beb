//! Orchestration of one scenario-generation run: infer the service set,
//! generate both artifacts, persist everything, journal the execution.
//!
//! The generators themselves cannot fail on well-typed input; every error
//! here is a storage error, and a storage failure after a successful
//! generation fails the whole run. There is no partial success.

use crate::error::Result;
use crate::execution::{ExecutionRecord, ExecutionStatus};
use crate::extract::infer_services;
use crate::scenario::Scenario;
use crate::store::ArtifactStore;
use crate::types::ServiceTag;
use crate::{experiment, iac, paths};
use chrono::Utc;
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct GenerationOutcome {
    pub scenario_name: String,
    pub slug: String,
    pub services: Vec<ServiceTag>,
    pub scenario_key: String,
    pub cdk_key: String,
    pub fis_key: String,
    pub execution_id: String,
}

/// Run the full generation pipeline for one scenario.
pub fn run_generation(
    store: &dyn ArtifactStore,
    scenario: &Scenario,
) -> Result<GenerationOutcome> {
    let started_at = Utc::now();
    let slug = scenario.slug();

    let services = infer_services(scenario);
    tracing::info!(
        scenario = %scenario.name,
        services = ?services.iter().map(|t| t.as_str()).collect::<Vec<_>>(),
        "inferred service set"
    );

    let cdk_source = iac::generate(&services, scenario);
    let template = experiment::generate(&services, scenario);
    template.validate()?;

    let scenario_key = paths::scenario_key(&slug);
    let cdk_key = paths::cdk_key(&slug);
    let fis_key = paths::fis_key(&slug);

    store.put(&scenario_key, &serde_json::to_vec_pretty(scenario)?)?;
    store.put(&cdk_key, cdk_source.as_bytes())?;
    store.put(&fis_key, &serde_json::to_vec_pretty(&template)?)?;

    let execution_id = uuid::Uuid::new_v4().to_string();
    let record = ExecutionRecord {
        id: execution_id.clone(),
        scenario: slug.clone(),
        scenario_name: scenario.name.clone(),
        status: ExecutionStatus::Succeeded,
        services: services.iter().copied().collect(),
        error: None,
        started_at,
        finished_at: Utc::now(),
    };
    record.save(store)?;

    Ok(GenerationOutcome {
        scenario_name: scenario.name.clone(),
        slug,
        services: services.into_iter().collect(),
        scenario_key,
        cdk_key,
        fis_key,
        execution_id,
    })
}

/// Best-effort failure journaling for the orchestration boundary. Storage
/// problems while recording a failure are swallowed; the underlying error is
/// what the caller reports.
pub fn record_failure(store: &dyn ArtifactStore, scenario: &Scenario, error: &str) {
    let now = Utc::now();
    let record = ExecutionRecord {
        id: uuid::Uuid::new_v4().to_string(),
        scenario: scenario.slug(),
        scenario_name: scenario.name.clone(),
        status: ExecutionStatus::Failed,
        services: Vec::new(),
        error: Some(error.to_string()),
        started_at: now,
        finished_at: now,
    };
    if let Err(e) = record.save(store) {
        tracing::warn!(error = %e, "failed to journal pipeline failure");
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::FsStore;
    use tempfile::TempDir;

    fn lambda_scenario() -> Scenario {
        Scenario::from_json(
            r#"{"scenario_name": "Order Service Failure", "purpose": "Validate retries",
                "target_services": ["Lambda"]}"#,
        )
        .unwrap()
    }

    #[test]
    fn generation_persists_all_three_artifacts() {
        let dir = TempDir::new().unwrap();
        let store = FsStore::init(dir.path()).unwrap();
        let outcome = run_generation(&store, &lambda_scenario()).unwrap();

        assert_eq!(outcome.slug, "order-service-failure");
        assert!(store.exists(&outcome.scenario_key));
        assert!(store.exists(&outcome.cdk_key));
        assert!(store.exists(&outcome.fis_key));
        assert!(outcome.services.contains(&ServiceTag::FunctionCompute));

        let cdk = String::from_utf8(store.get(&outcome.cdk_key).unwrap()).unwrap();
        assert!(cdk.contains("OrderServiceFailureStack"));

        let template: experiment::ExperimentTemplate =
            serde_json::from_slice(&store.get(&outcome.fis_key).unwrap()).unwrap();
        template.validate().unwrap();
        assert!(template.targets.contains_key("lambda-functions"));
    }

    #[test]
    fn generation_journals_success() {
        let dir = TempDir::new().unwrap();
        let store = FsStore::init(dir.path()).unwrap();
        let outcome = run_generation(&store, &lambda_scenario()).unwrap();

        let records = ExecutionRecord::list(&store).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id, outcome.execution_id);
        assert_eq!(records[0].status, ExecutionStatus::Succeeded);
        assert_eq!(records[0].scenario, "order-service-failure");
    }

    #[test]
    fn empty_scenario_still_generates() {
        let dir = TempDir::new().unwrap();
        let store = FsStore::init(dir.path()).unwrap();
        let scenario = Scenario::from_json(r#"{"scenario_name": "Bare"}"#).unwrap();
        let outcome = run_generation(&store, &scenario).unwrap();

        assert!(outcome.services.is_empty());
        let cdk = String::from_utf8(store.get(&outcome.cdk_key).unwrap()).unwrap();
        assert!(cdk.contains("export class BareStack"));

        let template: experiment::ExperimentTemplate =
            serde_json::from_slice(&store.get(&outcome.fis_key).unwrap()).unwrap();
        assert!(template.actions.is_empty());
        assert_eq!(template.stop_conditions.len(), 2);
    }

    #[test]
    fn rerun_overwrites_deterministically() {
        let dir = TempDir::new().unwrap();
        let store = FsStore::init(dir.path()).unwrap();
        let scenario = lambda_scenario();
        let first = run_generation(&store, &scenario).unwrap();
        let cdk_first = store.get(&first.cdk_key).unwrap();
        let second = run_generation(&store, &scenario).unwrap();
        let cdk_second = store.get(&second.cdk_key).unwrap();
        assert_eq!(cdk_first, cdk_second);
        // two runs, two journal entries
        assert_eq!(ExecutionRecord::list(&store).unwrap().len(), 2);
    }

    #[test]
    fn record_failure_is_listed() {
        let dir = TempDir::new().unwrap();
        let store = FsStore::init(dir.path()).unwrap();
        record_failure(&store, &lambda_scenario(), "storage write refused");
        let records = ExecutionRecord::list(&store).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].status, ExecutionStatus::Failed);
        assert_eq!(records[0].error.as_deref(), Some("storage write refused"));
    }
}
