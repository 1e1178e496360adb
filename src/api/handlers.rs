//! HTTP handlers
//!
//! Handlers validate their input, check the caller's role and hand off to
//! the core managers. They hold no logic of their own beyond that.

use super::auth::Principal;
use super::requests::{
    path_id, AddBedRequest, AdmissionQuery, AdmitRequest, BedQuery, PatientRequest,
    SetBedStatusRequest,
};
use super::response::{
    created, ok, respond, AdmissionPayload, AdmissionsPayload, ApiError, BedPayload,
    BedsPayload, CensusPayload, HealthPayload, NoPayload, OccupancyPayload, PatientPayload,
    PatientsPayload,
};
use super::state::AppState;
use crate::config::Role;
use crate::domain::{AdmissionId, BedId, BedStatus, PatientId};
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::Response;
use axum::{Extension, Json};

type HandlerResult = Result<Response, ApiError>;

const CLINICAL: &[Role] = &[Role::FrontDesk, Role::Doctor];
const BED_ADMIN: &[Role] = &[Role::FrontDesk, Role::Hr];

/// `GET /health`
pub async fn health(State(state): State<AppState>) -> Response {
    match state.store.test_connection().await {
        Ok(()) => ok(
            "ok",
            HealthPayload {
                store: state.store.backend_name(),
            },
        ),
        Err(e) => {
            tracing::error!(error = %e, "Health check failed");
            respond(
                StatusCode::SERVICE_UNAVAILABLE,
                false,
                "Store unavailable",
                NoPayload {},
            )
        }
    }
}

/// `POST /patients`
pub async fn register_patient(
    State(state): State<AppState>,
    Extension(caller): Extension<Principal>,
    body: Result<Json<PatientRequest>, JsonRejection>,
) -> HandlerResult {
    caller.require(CLINICAL)?;
    let Json(request) = body?;
    let patient = state.registry.register(request.validate()?).await?;
    Ok(created("Patient registered", PatientPayload { patient }))
}

/// `GET /patients`
pub async fn list_patients(State(state): State<AppState>) -> HandlerResult {
    let patients = state.registry.list().await?;
    Ok(ok("Patients", PatientsPayload { patients }))
}

/// `GET /patients/census`
pub async fn patient_census(State(state): State<AppState>) -> HandlerResult {
    let census = state.registry.census().await?;
    Ok(ok("Patient census", CensusPayload { census }))
}

/// `GET /patients/:id`
pub async fn get_patient(State(state): State<AppState>, Path(id): Path<String>) -> HandlerResult {
    let patient = state.registry.get(path_id::<PatientId>(&id)?).await?;
    Ok(ok("Patient", PatientPayload { patient }))
}

/// `PUT /patients/:id`
///
/// Replaces the demographics. A body that names a `status` is refused.
pub async fn update_patient(
    State(state): State<AppState>,
    Extension(caller): Extension<Principal>,
    Path(id): Path<String>,
    body: Result<Json<PatientRequest>, JsonRejection>,
) -> HandlerResult {
    caller.require(CLINICAL)?;
    let patient_id = path_id::<PatientId>(&id)?;
    let Json(request) = body?;
    let patient = state
        .registry
        .update(patient_id, request.validate_update()?)
        .await?;
    Ok(ok("Patient updated", PatientPayload { patient }))
}

/// `GET /patients/:id/admissions`
pub async fn patient_admissions(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> HandlerResult {
    let admissions = state
        .admissions
        .list_for_patient(path_id::<PatientId>(&id)?)
        .await?;
    Ok(ok("Patient admissions", AdmissionsPayload { admissions }))
}

/// `POST /beds`
pub async fn add_bed(
    State(state): State<AppState>,
    Extension(caller): Extension<Principal>,
    body: Result<Json<AddBedRequest>, JsonRejection>,
) -> HandlerResult {
    caller.require(BED_ADMIN)?;
    let Json(request) = body?;
    let bed = state.ward.add_bed(request.validate()?).await?;
    Ok(created("Bed added", BedPayload { bed }))
}

/// `GET /beds?status=&ward=`
///
/// Asking for Available beds goes through the availability check, which
/// answers 404 when none are free. Any other filter may return an empty list.
pub async fn list_beds(
    State(state): State<AppState>,
    query: Result<Query<BedQuery>, QueryRejection>,
) -> HandlerResult {
    let Query(query) = query?;
    let filter = query.validate()?;
    let beds = if filter.status == Some(BedStatus::Available) {
        state.ward.available_beds(filter.ward.as_deref()).await?
    } else {
        state.ward.list_beds(&filter).await?
    };
    Ok(ok("Beds", BedsPayload { beds }))
}

/// `GET /beds/occupancy`
pub async fn bed_occupancy(State(state): State<AppState>) -> HandlerResult {
    let occupancy = state.ward.occupancy().await?;
    Ok(ok("Bed occupancy", OccupancyPayload { occupancy }))
}

/// `PUT /beds/:id/status`
pub async fn set_bed_status(
    State(state): State<AppState>,
    Extension(caller): Extension<Principal>,
    Path(id): Path<String>,
    body: Result<Json<SetBedStatusRequest>, JsonRejection>,
) -> HandlerResult {
    caller.require(BED_ADMIN)?;
    let bed_id = path_id::<BedId>(&id)?;
    let Json(request) = body?;
    let bed = state.ward.set_bed_status(bed_id, request.validate()?).await?;
    Ok(ok("Bed status updated", BedPayload { bed }))
}

/// `GET /admissions?status=`
pub async fn list_admissions(
    State(state): State<AppState>,
    query: Result<Query<AdmissionQuery>, QueryRejection>,
) -> HandlerResult {
    let Query(query) = query?;
    let admissions = state.admissions.list(query.validate()?).await?;
    Ok(ok("Admissions", AdmissionsPayload { admissions }))
}

/// `GET /admissions/:id`
pub async fn get_admission(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> HandlerResult {
    let admission = state.admissions.get(path_id::<AdmissionId>(&id)?).await?;
    Ok(ok("Admission", AdmissionPayload { admission }))
}

/// `POST /admissions`
pub async fn admit(
    State(state): State<AppState>,
    Extension(caller): Extension<Principal>,
    body: Result<Json<AdmitRequest>, JsonRejection>,
) -> HandlerResult {
    caller.require(CLINICAL)?;
    let Json(request) = body?;
    let command = request.validate()?;
    let admission = state.admissions.admit(command).await?;
    tracing::debug!(caller = %caller.name, admission_id = %admission.id, "Admit request served");
    Ok(created("Patient admitted successfully", AdmissionPayload { admission }))
}

/// `POST /admissions/:id/discharge`
pub async fn discharge(
    State(state): State<AppState>,
    Extension(caller): Extension<Principal>,
    Path(id): Path<String>,
) -> HandlerResult {
    caller.require(CLINICAL)?;
    let admission = state
        .admissions
        .discharge(path_id::<AdmissionId>(&id)?)
        .await?;
    tracing::debug!(
        caller = %caller.name,
        admission_id = %admission.id,
        "Discharge request served"
    );
    Ok(ok("Patient discharged successfully", AdmissionPayload { admission }))
}
