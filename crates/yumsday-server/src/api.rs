use std::sync::{Arc, Mutex};

use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;
use tower_http::trace::TraceLayer;
use tracing::info;
use yumsday_migrate::{Database, MigrationReport};

use crate::error::ServerError;

#[derive(Clone)]
pub struct AppState {
    pub db: Arc<Mutex<Database>>,
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(health_check))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
    schema_version: i64,
    /// What the startup migration run did.
    migration: MigrationReport,
}

async fn health_check(State(state): State<AppState>) -> Result<Json<HealthResponse>, ServerError> {
    let (schema_version, migration) = {
        let db = state
            .db
            .lock()
            .map_err(|_| ServerError::Internal("database lock poisoned".to_string()))?;
        (db.schema_version()?, db.migration_report().clone())
    };

    Ok(Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        schema_version,
        migration,
    }))
}

pub async fn serve(state: AppState, addr: std::net::SocketAddr) -> anyhow::Result<()> {
    let app = build_router(state);

    info!(addr = %addr, "Starting HTTP API server");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    fn state() -> AppState {
        let db = Database::open_in_memory(&crate::migrations::embedded()).unwrap();
        AppState {
            db: Arc::new(Mutex::new(db)),
        }
    }

    #[tokio::test]
    async fn test_health_reports_schema_version() {
        let app = build_router(state());

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/health")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);

        let bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["status"], "ok");
        assert_eq!(body["schema_version"], 1);
        assert_eq!(body["migration"]["from_version"], -1);
        assert_eq!(body["migration"]["to_version"], 1);
        assert_eq!(body["migration"]["applied"].as_array().unwrap().len(), 2);
        assert_eq!(
            body["migration"]["applied"][0]["name"],
            "create-user-table"
        );
    }

    #[tokio::test]
    async fn test_unknown_route_is_404() {
        let app = build_router(state());

        let response = app
            .oneshot(Request::builder().uri("/nope").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
