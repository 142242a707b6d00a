//! API service routes

use std::{any::Any as PanicPayload, time::Duration};

use axum::{
    BoxError, Router,
    error_handling::HandleErrorLayer,
    http::{Method, StatusCode, header},
    middleware,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use tower::{ServiceBuilder, timeout::TimeoutLayer, timeout::error::Elapsed};
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::error;
use uuid::Uuid;

use crate::{error::ApiError, middleware::auth_middleware, repositories::Storage, state::AppState};

pub mod attendees;
pub mod auth;
pub mod events;
pub mod health;

/// Create the router for the API service
pub fn create_router<S: Storage>(state: AppState<S>, request_timeout: Duration) -> Router {
    let protected_routes = Router::new()
        .route(
            "/events",
            post(events::create_event::<S>).get(events::list_events::<S>),
        )
        .route("/events/my", get(events::my_events::<S>))
        .route(
            "/events/:id",
            get(events::get_event::<S>)
                .put(events::update_event::<S>)
                .delete(events::delete_event::<S>),
        )
        .route(
            "/attendees/event/:event_id/register",
            post(attendees::register::<S>),
        )
        .route(
            "/attendees/event/:event_id/unregister",
            post(attendees::unregister::<S>),
        )
        .route(
            "/attendees/event/:event_id/attendees",
            get(attendees::event_attendees::<S>),
        )
        .route("/attendees/my", get(attendees::my_registrations::<S>))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware::<S>,
        ));

    let api_routes = Router::new()
        .route("/health", get(health::health_check))
        .route("/auth/register", post(auth::register::<S>))
        .route("/auth/login", post(auth::login::<S>))
        .merge(protected_routes);

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

    Router::new()
        .nest("/api/v1", api_routes)
        .fallback(route_not_found)
        .layer(middleware::map_response(method_not_allowed))
        .layer(
            ServiceBuilder::new()
                .layer(HandleErrorLayer::new(handle_timeout))
                .layer(TimeoutLayer::new(request_timeout)),
        )
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn route_not_found() -> ApiError {
    ApiError::NotFound("Route not found".to_string())
}

/// Give axum's bare 405 a JSON body, keeping its `Allow` header
async fn method_not_allowed(response: Response) -> Response {
    if response.status() != StatusCode::METHOD_NOT_ALLOWED {
        return response;
    }

    let mut json = ApiError::MethodNotAllowed.into_response();
    if let Some(allow) = response.headers().get(header::ALLOW) {
        json.headers_mut().insert(header::ALLOW, allow.clone());
    }
    json
}

async fn handle_timeout(err: BoxError) -> ApiError {
    if err.is::<Elapsed>() {
        ApiError::Timeout
    } else {
        error!("Unhandled middleware error: {}", err);
        ApiError::InternalServerError
    }
}

fn panic_response(panic: Box<dyn PanicPayload + Send + 'static>) -> Response {
    let detail = panic
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| panic.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic");
    error!("Request handler panicked: {}", detail);

    ApiError::InternalServerError.into_response()
}

/// Parse a path identifier, naming the resource in the error
fn parse_id(raw: &str, resource: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|_| ApiError::BadRequest(format!("Invalid {resource} ID")))
}
