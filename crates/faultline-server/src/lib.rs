pub mod error;
pub mod routes;
pub mod state;

use axum::routing::get;
use axum::Router;
use std::path::PathBuf;
use tower_http::cors::{Any, CorsLayer};

/// Build the axum Router with all API routes and middleware.
/// Used by `serve()` and available for integration testing.
pub fn build_router(root: PathBuf) -> Router {
    let app_state = state::AppState::new(root);

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Health
        .route("/api/health", get(routes::health::get_health))
        // Scenarios
        .route("/api/scenarios", get(routes::scenarios::list_scenarios))
        .route(
            "/api/scenarios/{id}",
            get(routes::scenarios::get_scenario),
        )
        // Experiment templates
        .route(
            "/api/experiments",
            get(routes::experiments::list_experiments),
        )
        .route(
            "/api/experiments/{id}",
            get(routes::experiments::get_experiment),
        )
        // Execution history
        .route("/api/executions", get(routes::executions::list_executions))
        .layer(cors)
        .with_state(app_state)
}

/// Start the read API server.
pub async fn serve(root: PathBuf, port: u16) -> anyhow::Result<()> {
    let app = build_router(root);

    let addr = format!("0.0.0.0:{port}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    let actual_port = listener.local_addr()?.port();

    tracing::info!("faultline read API listening on http://localhost:{actual_port}");

    axum::serve(listener, app).await?;
    Ok(())
}
