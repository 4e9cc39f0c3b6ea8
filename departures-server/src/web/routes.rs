//! HTTP route handlers.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use tracing::error;

use super::dto::{ErrorResponse, StopsResponse};
use super::state::AppState;

/// Create the application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/stops", get(list_stops))
        .route("/stop", get(stop_without_id))
        .route("/stop/", get(stop_without_id))
        .route("/stop/:id", get(get_stop))
        .route("/cron", get(run_cron))
        .with_state(state)
}

/// Health check endpoint.
async fn health() -> &'static str {
    "ok"
}

/// List every stop id with currently known data.
async fn list_stops(State(state): State<AppState>) -> Json<StopsResponse> {
    let stops = state.read_path.list_stops().await;
    Json(StopsResponse { stops })
}

/// Serve the freshest known departures for one stop.
///
/// Absence (never ingested, or expired everywhere) is a 503 with a
/// `no-data` tag, distinct from a present-but-empty list.
async fn get_stop(
    State(state): State<AppState>,
    Path(stop_id): Path<String>,
) -> Result<Response, AppError> {
    let stop_id = stop_id.trim();
    if stop_id.is_empty() {
        return Err(AppError::BadRequest {
            message: "missing stop id".into(),
        });
    }

    match state.read_path.read_stop(stop_id).await {
        Some(payload) => Ok(Json(payload).into_response()),
        None => Ok((
            StatusCode::SERVICE_UNAVAILABLE,
            Json(ErrorResponse::tag("no-data")),
        )
            .into_response()),
    }
}

/// `/stop` with no id segment at all.
async fn stop_without_id() -> AppError {
    AppError::BadRequest {
        message: "missing stop id".into(),
    }
}

/// Run one ingestion cycle.
async fn run_cron(State(state): State<AppState>) -> Response {
    match state.ingestor.run_cycle().await {
        Ok(_) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => {
            error!(error = %e, "ingestion cycle failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::with_message("cron-failed", e.to_string())),
            )
                .into_response()
        }
    }
}

/// Application error type.
///
/// Store-tier failures never reach here: absence is a normal outcome on
/// the read path, and ingestion failures are reported by `/cron` directly.
#[derive(Debug)]
pub enum AppError {
    BadRequest { message: String },
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, tag, message) = match self {
            AppError::BadRequest { message } => {
                (StatusCode::BAD_REQUEST, "bad-request", message)
            }
        };

        (status, Json(ErrorResponse::with_message(tag, message))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Arc;

    use axum::body::to_bytes;
    use chrono::Utc;

    use crate::domain::{DelayStatus, Departure};
    use crate::feed::{FeedFetcher, FetchConfig};
    use crate::ingest::Ingestor;
    use crate::store::{FreshStore, InMemoryStore, ReadPath};

    use super::*;

    fn departure(stop_id: &str) -> Departure {
        let now = Utc::now();
        Departure {
            route_id: "RED".into(),
            trip_id: "trip_1".into(),
            stop_id: stop_id.into(),
            scheduled_time: now,
            predicted_time: now + chrono::Duration::minutes(5),
            delay_seconds: 0,
            vehicle_id: None,
            status: DelayStatus::OnTime,
        }
    }

    /// State wired to an unreachable feed endpoint, so only `/cron` can
    /// observe the network.
    fn state() -> AppState {
        let fresh = Arc::new(FreshStore::default());
        let durable: Arc<InMemoryStore> = Arc::new(InMemoryStore::new());
        let fetcher =
            FeedFetcher::new(FetchConfig::new("http://127.0.0.1:9", "TripUpdate").with_timeout(2))
                .unwrap();

        let read_path = ReadPath::new(fresh.clone(), Some(durable.clone()));
        let ingestor = Ingestor::new(fetcher, fresh, Some(durable));
        AppState::new(read_path, ingestor)
    }

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn end_to_end_ingested_stop_is_served() {
        let state = state();

        let mut by_stop = HashMap::new();
        by_stop.insert("72".to_string(), vec![departure("72")]);
        state
            .ingestor
            .store_results(by_stop, std::time::Instant::now())
            .await;

        // /stops includes the ingested stop.
        let Json(stops) = list_stops(State(state.clone())).await;
        assert_eq!(stops.stops, vec!["72".to_string()]);

        // /stop/72 serves the departure.
        let response = get_stop(State(state.clone()), Path("72".to_string()))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["departures"][0]["routeId"], "RED");
        assert!(json["updatedAt"].is_string());

        // /stop/000 has no data.
        let response = get_stop(State(state), Path("000".to_string()))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        let json = body_json(response).await;
        assert_eq!(json["error"], "no-data");
    }

    #[tokio::test]
    async fn blank_stop_id_is_bad_request() {
        let response = get_stop(State(state()), Path("  ".to_string()))
            .await
            .unwrap_err()
            .into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = stop_without_id().await.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn cron_failure_reports_500_and_keeps_cache() {
        let state = state();

        let mut by_stop = HashMap::new();
        by_stop.insert("72".to_string(), vec![departure("72")]);
        state
            .ingestor
            .store_results(by_stop, std::time::Instant::now())
            .await;

        // The feed endpoint is unreachable, so the cycle fails.
        let response = run_cron(State(state.clone())).await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let json = body_json(response).await;
        assert_eq!(json["error"], "cron-failed");
        assert!(json["message"].is_string());

        // Prior contents survive the failed cycle.
        let response = get_stop(State(state), Path("72".to_string()))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn health_is_ok() {
        assert_eq!(health().await, "ok");
    }
}
