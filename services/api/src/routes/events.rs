//! Event endpoints

use axum::{
    Extension, Json,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    http::StatusCode,
    response::IntoResponse,
};

use super::parse_id;
use crate::{
    error::ApiResult,
    middleware::AuthUser,
    models::{EventRequest, PageQuery},
    repositories::Storage,
    state::AppState,
};

/// Create an event owned by the caller
pub async fn create_event<S: Storage>(
    State(state): State<AppState<S>>,
    Extension(user): Extension<AuthUser>,
    payload: Result<Json<EventRequest>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let Json(request) = payload?;
    let event = state.events.create_event(user.id, request).await?;

    Ok((StatusCode::CREATED, Json(event)))
}

pub async fn list_events<S: Storage>(
    State(state): State<AppState<S>>,
    query: Result<Query<PageQuery>, QueryRejection>,
) -> ApiResult<impl IntoResponse> {
    let Query(query) = query?;
    let events = state.events.list_events(query).await?;

    Ok(Json(events))
}

/// Events created by the caller
pub async fn my_events<S: Storage>(
    State(state): State<AppState<S>>,
    Extension(user): Extension<AuthUser>,
    query: Result<Query<PageQuery>, QueryRejection>,
) -> ApiResult<impl IntoResponse> {
    let Query(query) = query?;
    let events = state.events.list_user_events(user.id, query).await?;

    Ok(Json(events))
}

pub async fn get_event<S: Storage>(
    State(state): State<AppState<S>>,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let id = parse_id(&id, "event")?;
    let event = state.events.get_event(id).await?;

    Ok(Json(event))
}

pub async fn update_event<S: Storage>(
    State(state): State<AppState<S>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
    payload: Result<Json<EventRequest>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let id = parse_id(&id, "event")?;
    let Json(request) = payload?;
    let event = state.events.update_event(user.id, id, request).await?;

    Ok(Json(event))
}

pub async fn delete_event<S: Storage>(
    State(state): State<AppState<S>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let id = parse_id(&id, "event")?;
    state.events.delete_event(user.id, id).await?;

    Ok(StatusCode::NO_CONTENT)
}
