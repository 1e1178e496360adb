//! Response envelope and error mapping
//!
//! Every body is `{"success": bool, "message": string, ...payload}`.

use crate::domain::{Admission, Bed, BedOccupancy, Patient, PatientCensus, WardlineError};
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::{header, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

/// JSON envelope shared by every endpoint
#[derive(Debug, Serialize)]
pub struct Envelope<T: Serialize> {
    pub success: bool,
    pub message: String,
    #[serde(flatten)]
    pub payload: T,
}

/// Payload for responses that carry only a message
#[derive(Debug, Serialize)]
pub struct NoPayload {}

#[derive(Debug, Serialize)]
pub struct PatientPayload {
    pub patient: Patient,
}

#[derive(Debug, Serialize)]
pub struct PatientsPayload {
    pub patients: Vec<Patient>,
}

#[derive(Debug, Serialize)]
pub struct CensusPayload {
    pub census: PatientCensus,
}

#[derive(Debug, Serialize)]
pub struct BedPayload {
    pub bed: Bed,
}

#[derive(Debug, Serialize)]
pub struct BedsPayload {
    pub beds: Vec<Bed>,
}

#[derive(Debug, Serialize)]
pub struct OccupancyPayload {
    pub occupancy: BedOccupancy,
}

#[derive(Debug, Serialize)]
pub struct AdmissionPayload {
    pub admission: Admission,
}

#[derive(Debug, Serialize)]
pub struct AdmissionsPayload {
    pub admissions: Vec<Admission>,
}

#[derive(Debug, Serialize)]
pub struct HealthPayload {
    pub store: &'static str,
}

/// 200 with a payload
pub fn ok<T: Serialize>(message: impl Into<String>, payload: T) -> Response {
    respond(StatusCode::OK, true, message, payload)
}

/// 201 with a payload
pub fn created<T: Serialize>(message: impl Into<String>, payload: T) -> Response {
    respond(StatusCode::CREATED, true, message, payload)
}

pub fn respond<T: Serialize>(
    status: StatusCode,
    success: bool,
    message: impl Into<String>,
    payload: T,
) -> Response {
    let body = Envelope {
        success,
        message: message.into(),
        payload,
    };
    (status, Json(body)).into_response()
}

/// HTTP status for an error kind
pub fn status_for(error: &WardlineError) -> StatusCode {
    match error {
        WardlineError::Validation(_) | WardlineError::Serialization(_) => StatusCode::BAD_REQUEST,
        WardlineError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
        WardlineError::Forbidden(_) => StatusCode::FORBIDDEN,
        WardlineError::NotFound { .. } | WardlineError::NothingAvailable(_) => {
            StatusCode::NOT_FOUND
        }
        WardlineError::Conflict(_) => StatusCode::CONFLICT,
        WardlineError::Database(_) | WardlineError::Configuration(_) | WardlineError::Io(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

/// Error returned from handlers and middleware
#[derive(Debug)]
pub struct ApiError(pub WardlineError);

impl From<WardlineError> for ApiError {
    fn from(error: WardlineError) -> Self {
        Self(error)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self(WardlineError::Validation(rejection.body_text()))
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self(WardlineError::Validation(rejection.body_text()))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = status_for(&self.0);
        let message = if status == StatusCode::INTERNAL_SERVER_ERROR {
            crate::log_error_with_context!(self.0, "request failed");
            "Internal server error".to_string()
        } else {
            self.0.to_string()
        };

        let mut response = respond(status, false, message, NoPayload {});
        if status == StatusCode::UNAUTHORIZED {
            response.headers_mut().insert(
                header::WWW_AUTHENTICATE,
                header::HeaderValue::from_static("Bearer"),
            );
        }
        response
    }
}

/// Fallback for paths no route matches
pub async fn route_not_found(uri: Uri) -> Response {
    respond(
        StatusCode::NOT_FOUND,
        false,
        format!("No route for {}", uri.path()),
        NoPayload {},
    )
}

/// Wrap error responses produced outside the handlers in the envelope
///
/// Covers what the middleware stack emits on its own, such as the timeout
/// layer's 408 or a 405 for an unsupported method. Responses that already
/// carry JSON pass through untouched.
pub async fn envelope_bare_errors(response: Response) -> Response {
    let status = response.status();
    let is_json = response
        .headers()
        .get(header::CONTENT_TYPE)
        .is_some_and(|value| value.as_bytes().starts_with(b"application/json"));
    if is_json || !(status.is_client_error() || status.is_server_error()) {
        return response;
    }

    let (parts, _) = response.into_parts();
    let message = status.canonical_reason().unwrap_or("Request failed");
    let mut wrapped = respond(status, false, message, NoPayload {});
    for (name, value) in &parts.headers {
        if name != header::CONTENT_TYPE && name != header::CONTENT_LENGTH {
            wrapped.headers_mut().append(name.clone(), value.clone());
        }
    }
    wrapped
}
