//! Registration and login endpoints

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
};
use serde_json::json;

use crate::{
    error::ApiResult,
    models::{LoginRequest, RegisterRequest},
    repositories::Storage,
    state::AppState,
};

/// Create a user account
pub async fn register<S: Storage>(
    State(state): State<AppState<S>>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let Json(request) = payload?;
    let user = state.auth.register(request).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "User registered successfully",
            "user": user,
        })),
    ))
}

/// Exchange credentials for a bearer token
pub async fn login<S: Storage>(
    State(state): State<AppState<S>>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let Json(request) = payload?;
    let response = state.auth.login(request).await?;

    Ok(Json(json!({
        "message": "Login successful",
        "token": response.token,
        "token_type": response.token_type,
        "expires_in": response.expires_in,
        "user": response.user,
    })))
}
