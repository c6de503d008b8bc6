//! HTTP handlers for the REST API.
//!
//! Each handler corresponds to an API endpoint and delegates to the
//! service layer for business logic. All scheduling endpoints are
//! synchronous request/response; an infeasible placement is a structured
//! `success: false` body, not an error status.

use axum::{extract::State, Json};

use super::dto::{
    BatchScheduleRequest, CheckConstraintsRequest, CheckConstraintsResponse, HealthResponse,
    ScheduleEventRequest, TimeslotListResponse,
};
use super::error::AppError;
use super::state::AppState;
use crate::api::{BatchOutcome, EventRequest, ScheduleOutcome};
use crate::db::repository::{FullRepository, TimeslotRepository};
use crate::services;

/// Result type for handlers.
pub type HandlerResult<T> = Result<Json<T>, AppError>;

// =============================================================================
// Health Check
// =============================================================================

/// GET /health
///
/// Health check endpoint to verify the service is running and the
/// repository is accessible.
pub async fn health_check(State(state): State<AppState>) -> HandlerResult<HealthResponse> {
    let repo_status = match state.repository.health_check().await {
        Ok(true) => "connected".to_string(),
        Ok(false) => "disconnected".to_string(),
        Err(e) => format!("error: {}", e),
    };

    Ok(Json(HealthResponse {
        status: "ok".to_string(),
        version: "v1".to_string(),
        repository: repo_status,
    }))
}

// =============================================================================
// Constraint Checking
// =============================================================================

/// POST /v1/constraints/check
///
/// Validate a candidate placement and return the full violation and
/// warning lists.
pub async fn check_constraints(
    State(state): State<AppState>,
    Json(request): Json<CheckConstraintsRequest>,
) -> HandlerResult<CheckConstraintsResponse> {
    let candidate = request.resolve().map_err(AppError::BadRequest)?;
    let report =
        services::check_constraints(state.repository.as_ref(), &state.config, &candidate).await?;
    Ok(Json(CheckConstraintsResponse::from(report)))
}

// =============================================================================
// Scheduling
// =============================================================================

/// POST /v1/scheduler/event
///
/// Schedule one event. Returns the created event on success, or a
/// structured failure message when no feasible assignment exists.
pub async fn schedule_event(
    State(state): State<AppState>,
    Json(request): Json<ScheduleEventRequest>,
) -> HandlerResult<ScheduleOutcome> {
    let (event_request, strategy, max_attempts) =
        request.resolve(None).map_err(AppError::BadRequest)?;
    let outcome = services::schedule_event(
        state.repository.as_ref(),
        &state.config,
        &event_request,
        strategy,
        max_attempts,
    )
    .await?;
    Ok(Json(outcome))
}

/// POST /v1/scheduler/batch
///
/// Schedule a batch of events in priority order with one retry pass.
pub async fn schedule_batch(
    State(state): State<AppState>,
    Json(request): Json<BatchScheduleRequest>,
) -> HandlerResult<BatchOutcome> {
    let preferences = request.preferences;
    let mut requests: Vec<EventRequest> = Vec::with_capacity(request.events.len());
    for (index, entry) in request.events.into_iter().enumerate() {
        let (event_request, _, _) = entry
            .resolve(preferences.as_ref())
            .map_err(|e| AppError::BadRequest(format!("events[{}]: {}", index, e)))?;
        requests.push(event_request);
    }

    let outcome =
        services::schedule_batch(state.repository.as_ref(), &state.config, requests).await?;
    Ok(Json(outcome))
}

// =============================================================================
// Timeslot Catalog
// =============================================================================

/// GET /v1/timeslots
///
/// List the timeslot catalog (the grid of placeable windows).
pub async fn list_timeslots(State(state): State<AppState>) -> HandlerResult<TimeslotListResponse> {
    let timeslots = state.repository.list_timeslots().await?;
    let total = timeslots.len();
    Ok(Json(TimeslotListResponse { timeslots, total }))
}
