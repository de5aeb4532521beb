use axum::extract::{Path, State};
use axum::Json;

use crate::error::AppError;
use crate::state::AppState;
use faultline_core::scenario::Scenario;
use faultline_core::store::{ArtifactStore, FsStore};

/// GET /api/scenarios — list all stored scenarios.
pub async fn list_scenarios(
    State(app): State<AppState>,
) -> Result<Json<serde_json::Value>, AppError> {
    let root = app.root.clone();
    let result = tokio::task::spawn_blocking(move || {
        let store = FsStore::open(&root)?;
        let mut scenarios: Vec<serde_json::Value> = Vec::new();
        for key in store.list("scenarios/")? {
            let data = store.get(&key)?;
            let scenario: Scenario = serde_json::from_slice(&data)?;
            let id = key
                .trim_start_matches("scenarios/")
                .trim_end_matches(".json");
            scenarios.push(serde_json::json!({
                "id": id,
                "name": scenario.name,
                "purpose": scenario.purpose,
                "target_services": scenario.target_services,
                "size": data.len(),
            }));
        }
        Ok::<_, faultline_core::FaultlineError>(serde_json::json!({
            "scenarios": scenarios,
            "total": scenarios.len(),
        }))
    })
    .await
    .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;

    Ok(Json(result))
}

/// GET /api/scenarios/:id — scenario document plus the generated CDK source
/// when one exists.
pub async fn get_scenario(
    State(app): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    let root = app.root.clone();
    let result = tokio::task::spawn_blocking(move || {
        let store = FsStore::open(&root)?;
        let key = faultline_core::paths::scenario_key(&id);
        let data = store
            .get(&key)
            .map_err(|_| faultline_core::FaultlineError::ScenarioNotFound(id.clone()))?;
        let scenario: serde_json::Value = serde_json::from_slice(&data)?;

        let cdk_key = faultline_core::paths::cdk_key(&id);
        let cdk_code = if store.exists(&cdk_key) {
            Some(String::from_utf8_lossy(&store.get(&cdk_key)?).into_owned())
        } else {
            None
        };

        Ok::<_, faultline_core::FaultlineError>(serde_json::json!({
            "id": id,
            "scenario": scenario,
            "cdk_code": cdk_code,
        }))
    })
    .await
    .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;

    Ok(Json(result))
}
