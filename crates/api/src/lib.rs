use std::env;
use std::sync::Arc;

use anyhow::Result;
use axum::extract::{Json, Path as AxumPath, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::Router;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tower_http::cors::CorsLayer;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;
use yatra_agents::{ChatError, YatraAgent};
use yatra_core::NewDestination;
use yatra_observability::AppMetrics;
use yatra_storage::{DestinationRepository, Store};

/// Matches the documented request contract: 1..=2000 characters.
const MAX_MESSAGE_CHARS: usize = 2_000;

const STORE_ERROR_DETAIL: &str = "Database error while processing chat request.";
const INTERNAL_ERROR_DETAIL: &str = "Unexpected error while processing chat request.";

#[derive(Clone)]
pub struct ApiState {
    pub agent: Arc<YatraAgent<Store>>,
    pub metrics: Arc<AppMetrics>,
    pub storage_backend: &'static str,
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    timestamp_utc: String,
    storage_backend: &'static str,
    metrics: yatra_observability::MetricsSnapshot,
}

#[derive(Debug, Deserialize)]
struct ChatRequest {
    message: String,
}

/// Wire the store from the environment and assemble the router.
/// `YATRA_DATABASE_URL` selects SQLite; without it the in-memory store is
/// used (tests, local development).
pub async fn build_app() -> Result<Router> {
    let metrics = AppMetrics::shared();

    let store = if let Ok(database_url) = env::var("YATRA_DATABASE_URL") {
        Store::sqlite(&database_url).await?
    } else {
        Store::memory()
    };
    let storage_backend = store.backend_name();

    let agent = Arc::new(YatraAgent::new(Arc::new(store), metrics.clone()));

    Ok(build_router(ApiState {
        agent,
        metrics,
        storage_backend,
    }))
}

pub fn build_router(state: ApiState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/v1/chat", post(chat))
        .route("/v1/destinations", get(destinations_list).post(destination_create))
        .route("/v1/destinations/:id", get(destination_get))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(RequestBodyLimitLayer::new(64 * 1024))
        .with_state(state)
}

async fn health(State(state): State<ApiState>) -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok",
        timestamp_utc: chrono::Utc::now().to_rfc3339(),
        storage_backend: state.storage_backend,
        metrics: state.metrics.snapshot(),
    })
}

/// One devotional chat turn. Length validation happens here so the agent
/// only ever sees accepted input.
async fn chat(State(state): State<ApiState>, Json(request): Json<ChatRequest>) -> Response {
    let message_chars = request.message.chars().count();
    if message_chars == 0 || message_chars > MAX_MESSAGE_CHARS {
        return (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({
                "detail": format!(
                    "message must be between 1 and {} characters",
                    MAX_MESSAGE_CHARS
                )
            })),
        )
            .into_response();
    }

    match state.agent.process_message(&request.message).await {
        Ok(reply) => (StatusCode::OK, Json(reply)).into_response(),
        Err(error @ ChatError::Store(_)) => {
            tracing::error!(error = %error, "store failure during chat turn");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "detail": STORE_ERROR_DETAIL })),
            )
                .into_response()
        }
        Err(error @ ChatError::Internal(_)) => {
            tracing::error!(error = %error, "unexpected failure during chat turn");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "detail": INTERNAL_ERROR_DETAIL })),
            )
                .into_response()
        }
    }
}

async fn destinations_list(State(state): State<ApiState>) -> Response {
    match state.agent.store().list_destinations().await {
        Ok(destinations) => (StatusCode::OK, Json(destinations)).into_response(),
        Err(error) => store_failure("listing destinations", error),
    }
}

async fn destination_create(
    State(state): State<ApiState>,
    Json(payload): Json<NewDestination>,
) -> Response {
    let required = [
        ("name", &payload.name),
        ("city", &payload.city),
        ("state", &payload.state),
        ("deity", &payload.deity),
    ];
    if let Some((field, _)) = required.iter().find(|(_, value)| value.trim().is_empty()) {
        return (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({ "detail": format!("{field} must not be empty") })),
        )
            .into_response();
    }

    match state.agent.store().insert_destination(payload).await {
        Ok(destination) => (StatusCode::CREATED, Json(destination)).into_response(),
        Err(error) => store_failure("creating destination", error),
    }
}

async fn destination_get(State(state): State<ApiState>, AxumPath(id): AxumPath<i64>) -> Response {
    match state.agent.store().get_destination(id).await {
        Ok(Some(destination)) => (StatusCode::OK, Json(destination)).into_response(),
        Ok(None) => (
            StatusCode::NOT_FOUND,
            Json(json!({ "detail": "Destination not found" })),
        )
            .into_response(),
        Err(error) => store_failure("fetching destination", error),
    }
}

fn store_failure(operation: &str, error: anyhow::Error) -> Response {
    tracing::error!(error = %error, operation, "destination store failure");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "detail": STORE_ERROR_DETAIL })),
    )
        .into_response()
}
