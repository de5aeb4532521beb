use axum::extract::State;
use axum::Json;

use crate::error::AppError;
use crate::state::AppState;
use faultline_core::execution::ExecutionRecord;
use faultline_core::store::FsStore;

/// GET /api/executions — pipeline run history, newest first.
pub async fn list_executions(
    State(app): State<AppState>,
) -> Result<Json<serde_json::Value>, AppError> {
    let root = app.root.clone();
    let result = tokio::task::spawn_blocking(move || {
        let store = FsStore::open(&root)?;
        let executions = ExecutionRecord::list(&store)?;
        Ok::<_, faultline_core::FaultlineError>(serde_json::json!({
            "executions": executions,
            "total": executions.len(),
        }))
    })
    .await
    .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;

    Ok(Json(result))
}
