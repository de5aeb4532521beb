use axum::extract::{Path, State};
use axum::Json;

use crate::error::AppError;
use crate::state::AppState;
use faultline_core::execution::ExecutionRecord;
use faultline_core::experiment::ExperimentTemplate;
use faultline_core::store::{ArtifactStore, FsStore};

/// GET /api/experiments — list stored experiment templates.
pub async fn list_experiments(
    State(app): State<AppState>,
) -> Result<Json<serde_json::Value>, AppError> {
    let root = app.root.clone();
    let result = tokio::task::spawn_blocking(move || {
        let store = FsStore::open(&root)?;
        let mut experiments: Vec<serde_json::Value> = Vec::new();
        for key in store.list("generated/fis/")? {
            let template: ExperimentTemplate = serde_json::from_slice(&store.get(&key)?)?;
            let id = key
                .trim_start_matches("generated/fis/")
                .trim_end_matches(".json");
            experiments.push(serde_json::json!({
                "id": id,
                "description": template.description,
                "actions": template.actions.len(),
                "targets": template.targets.len(),
                "tags": template.tags,
            }));
        }
        Ok::<_, faultline_core::FaultlineError>(serde_json::json!({
            "experiments": experiments,
            "total": experiments.len(),
        }))
    })
    .await
    .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;

    Ok(Json(result))
}

/// GET /api/experiments/:id — full template plus the execution journal
/// entries for its scenario.
pub async fn get_experiment(
    State(app): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    let root = app.root.clone();
    let result = tokio::task::spawn_blocking(move || {
        let store = FsStore::open(&root)?;
        let key = faultline_core::paths::fis_key(&id);
        let data = store
            .get(&key)
            .map_err(|_| faultline_core::FaultlineError::ScenarioNotFound(id.clone()))?;
        let template: serde_json::Value = serde_json::from_slice(&data)?;
        let logs = ExecutionRecord::list_for_scenario(&store, &id)?;

        Ok::<_, faultline_core::FaultlineError>(serde_json::json!({
            "id": id,
            "experiment": template,
            "logs": logs,
        }))
    })
    .await
    .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;

    Ok(Json(result))
}
