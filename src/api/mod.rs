//! HTTP JSON API
//!
//! [`router`] assembles the axum [`Router`]: `/health` is open, every other
//! route sits behind the bearer-token middleware in [`auth`]. Requests are
//! traced with a per-request id, bounded by the configured timeout, and
//! subject to the configured CORS origins. Unknown paths and errors raised by
//! the middleware itself still answer with the JSON envelope.

pub mod auth;
pub mod handlers;
pub mod requests;
pub mod response;
pub mod state;

pub use auth::{Principal, StaticTokenValidator, TokenValidator};
pub use state::AppState;

use crate::config::ServerConfig;
use crate::domain::{Result, WardlineError};
use axum::extract::Request;
use axum::http::{header, HeaderValue, Method};
use axum::routing::{get, post, put};
use axum::{middleware, Router};
use std::time::Duration;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

/// Build the application router
///
/// # Errors
///
/// Returns `Configuration` if a CORS origin is not a valid header value.
pub fn router(state: AppState, server: &ServerConfig) -> Result<Router> {
    let protected = Router::new()
        .route(
            "/patients",
            get(handlers::list_patients).post(handlers::register_patient),
        )
        .route("/patients/census", get(handlers::patient_census))
        .route(
            "/patients/:id",
            get(handlers::get_patient).put(handlers::update_patient),
        )
        .route("/patients/:id/admissions", get(handlers::patient_admissions))
        .route("/beds", get(handlers::list_beds).post(handlers::add_bed))
        .route("/beds/occupancy", get(handlers::bed_occupancy))
        .route("/beds/:id/status", put(handlers::set_bed_status))
        .route(
            "/admissions",
            get(handlers::list_admissions).post(handlers::admit),
        )
        .route("/admissions/:id", get(handlers::get_admission))
        .route("/admissions/:id/discharge", post(handlers::discharge))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::authenticate,
        ));

    let app = Router::new()
        .route("/health", get(handlers::health))
        .merge(protected)
        .fallback(response::route_not_found)
        .layer(cors_layer(&server.cors_allowed_origins)?)
        .layer(TimeoutLayer::new(Duration::from_secs(
            server.request_timeout_seconds,
        )))
        // Outside the timeout so its 408 is wrapped too
        .layer(middleware::map_response(response::envelope_bare_errors))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &Request| {
                let request_id = uuid::Uuid::new_v4();
                tracing::info_span!(
                    "http_request",
                    %request_id,
                    method = %request.method(),
                    path = %request.uri().path(),
                )
            }),
        )
        .with_state(state);

    Ok(app)
}

fn cors_layer(origins: &[String]) -> Result<CorsLayer> {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]);

    if origins.iter().any(|o| o == "*") {
        return Ok(layer.allow_origin(Any));
    }
    if origins.is_empty() {
        return Ok(layer);
    }

    let origins = origins
        .iter()
        .map(|o| {
            HeaderValue::from_str(o).map_err(|e| {
                WardlineError::Configuration(format!("invalid CORS origin '{o}': {e}"))
            })
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(layer.allow_origin(AllowOrigin::list(origins)))
}
