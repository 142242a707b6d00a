//! Registration endpoints

use axum::{
    Extension, Json,
    extract::{Path, Query, State, rejection::QueryRejection},
    http::StatusCode,
    response::IntoResponse,
};
use serde_json::json;

use super::parse_id;
use crate::{
    error::ApiResult, middleware::AuthUser, models::PageQuery, repositories::Storage,
    state::AppState,
};

/// Register the caller for an event
pub async fn register<S: Storage>(
    State(state): State<AppState<S>>,
    Extension(user): Extension<AuthUser>,
    Path(event_id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let event_id = parse_id(&event_id, "event")?;
    let attendee = state.attendees.register_for_event(event_id, user.id).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Registered for event successfully",
            "attendee": attendee,
        })),
    ))
}

/// Remove the caller's registration, succeeding even if there was none
pub async fn unregister<S: Storage>(
    State(state): State<AppState<S>>,
    Extension(user): Extension<AuthUser>,
    Path(event_id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let event_id = parse_id(&event_id, "event")?;
    state
        .attendees
        .unregister_from_event(event_id, user.id)
        .await?;

    Ok(Json(json!({
        "message": "Unregistered from event successfully"
    })))
}

pub async fn my_registrations<S: Storage>(
    State(state): State<AppState<S>>,
    Extension(user): Extension<AuthUser>,
    query: Result<Query<PageQuery>, QueryRejection>,
) -> ApiResult<impl IntoResponse> {
    let Query(query) = query?;
    let registrations = state.attendees.my_registrations(user.id, query).await?;

    Ok(Json(registrations))
}

pub async fn event_attendees<S: Storage>(
    State(state): State<AppState<S>>,
    Path(event_id): Path<String>,
    query: Result<Query<PageQuery>, QueryRejection>,
) -> ApiResult<impl IntoResponse> {
    let event_id = parse_id(&event_id, "event")?;
    let Query(query) = query?;
    let attendees = state.attendees.event_attendees(event_id, query).await?;

    Ok(Json(attendees))
}
