use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use onni_core::WorldState;
use serde::Serialize;
use time::OffsetDateTime;

use crate::server::AppState;
use crate::worldstate::RunnerState;

#[derive(Serialize)]
pub struct HealthResponse<'a> {
    status: &'a str,
}

#[derive(Serialize)]
pub struct ReadinessResponse<'a> {
    status: &'a str,
    runner: Option<RunnerState>,
    fast_cache: &'a str,
}

#[derive(Serialize)]
pub struct WorldstateResponse<'a> {
    worldstate: &'a WorldState,
    #[serde(with = "time::serde::rfc3339")]
    fetched_at: OffsetDateTime,
    etag: Option<&'a str>,
}

#[derive(Serialize)]
pub struct ErrorResponse<'a> {
    error: &'a str,
    message: &'a str,
}

pub async fn healthz() -> impl IntoResponse {
    (StatusCode::OK, Json(HealthResponse { status: "ok" }))
}

/// Ready while the runner is alive. Reports the fetch role and whether the
/// fast tier is serving.
pub async fn readyz(State(state): State<AppState>) -> impl IntoResponse {
    let runner = state.runner_state.as_ref().map(|rx| *rx.borrow());
    let fast_cache = if state.coordinator.fast_cache_available() {
        state.coordinator.fast_cache_backend()
    } else {
        "unavailable"
    };
    let (code, status) = match runner {
        Some(RunnerState::Stopped) => (StatusCode::SERVICE_UNAVAILABLE, "stopping"),
        _ => (StatusCode::OK, "ready"),
    };
    (
        code,
        Json(ReadinessResponse {
            status,
            runner,
            fast_cache,
        }),
    )
}

/// `GET /api/worldstate`: the parsed view of the latest snapshot.
pub async fn worldstate(State(state): State<AppState>) -> Response {
    match state.coordinator.get().await {
        Some(snapshot) => (
            StatusCode::OK,
            Json(WorldstateResponse {
                worldstate: &snapshot.parsed_view,
                fetched_at: snapshot.fetched_at,
                etag: snapshot.etag.as_deref(),
            }),
        )
            .into_response(),
        None => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(ErrorResponse {
                error: "worldstate_unavailable",
                message: "world state has not been fetched yet",
            }),
        )
            .into_response(),
    }
}
