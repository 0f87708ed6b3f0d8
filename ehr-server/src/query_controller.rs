use crate::AppState;
use crate::api_error::ApiError;
use crate::constants::QUERY_TAG;
use crate::ehr_models::ErrorResponse;
use actix_web::{HttpResponse, get, web, web::Path};
use slog::info;

async fn list(app_state: &AppState, function: &str) -> Result<HttpResponse, ApiError> {
    info!(app_state.log, "Evaluate Transaction: {}", function);
    let assets = app_state.relay.list_assets(function).await?;
    Ok(HttpResponse::Ok().json(assets))
}

async fn read(app_state: &AppState, function: &str, asset_id: &str) -> Result<HttpResponse, ApiError> {
    info!(app_state.log, "Evaluate Transaction: {}", function; "asset" => asset_id);
    let asset = app_state.relay.read_asset(function, asset_id).await?;
    Ok(HttpResponse::Ok().json(asset))
}

#[utoipa::path(
    get,
    context_path = "/api",
    responses(
        (status = 200, description = "All patients on the ledger", body = [common::entities::Patient]),
        (status = 500, description = "Ledger unavailable", body = ErrorResponse)
    ),
    tag = QUERY_TAG
)]
#[get("/patients")]
pub async fn get_patients(app_state: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    list(&app_state, "GetAllPatients").await
}

#[utoipa::path(
    get,
    context_path = "/api",
    responses(
        (status = 200, description = "All doctors on the ledger", body = [common::entities::Doctor]),
        (status = 500, description = "Ledger unavailable", body = ErrorResponse)
    ),
    tag = QUERY_TAG
)]
#[get("/doctors")]
pub async fn get_doctors(app_state: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    list(&app_state, "GetAllDoctors").await
}

#[utoipa::path(
    get,
    context_path = "/api",
    responses(
        (status = 200, description = "All hospitals on the ledger", body = [common::entities::Hospital]),
        (status = 500, description = "Ledger unavailable", body = ErrorResponse)
    ),
    tag = QUERY_TAG
)]
#[get("/hospitals")]
pub async fn get_hospitals(app_state: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    list(&app_state, "GetAllHospitals").await
}

#[utoipa::path(
    get,
    context_path = "/api",
    responses(
        (status = 200, description = "All medical records on the ledger", body = [common::entities::MedicalRecord]),
        (status = 500, description = "Ledger unavailable", body = ErrorResponse)
    ),
    tag = QUERY_TAG
)]
#[get("/records")]
pub async fn get_records(app_state: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    list(&app_state, "GetAllMedicalRecords").await
}

#[utoipa::path(
    get,
    context_path = "/api",
    responses(
        (status = 200, description = "Audit log entries", body = [common::entities::LogChange]),
        (status = 500, description = "Ledger unavailable", body = ErrorResponse)
    ),
    tag = QUERY_TAG
)]
#[get("/logChanges")]
pub async fn get_log_changes(app_state: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    list(&app_state, "GetAllLogChanges").await
}

#[utoipa::path(
    get,
    context_path = "/api",
    params(("id" = String, Path, description = "Patient ID")),
    responses(
        (status = 200, description = "Patient", body = common::entities::Patient),
        (status = 404, description = "Patient does not exist", body = ErrorResponse),
        (status = 500, description = "Failed to read asset", body = ErrorResponse)
    ),
    tag = QUERY_TAG
)]
#[get("/read-patient/{id}")]
pub async fn read_patient(
    app_state: web::Data<AppState>,
    id: Path<String>,
) -> Result<HttpResponse, ApiError> {
    read(&app_state, "ReadPatient", &id).await
}

#[utoipa::path(
    get,
    context_path = "/api",
    params(("id" = String, Path, description = "Doctor ID")),
    responses(
        (status = 200, description = "Doctor", body = common::entities::Doctor),
        (status = 404, description = "Doctor does not exist", body = ErrorResponse),
        (status = 500, description = "Failed to read asset", body = ErrorResponse)
    ),
    tag = QUERY_TAG
)]
#[get("/read-doctor/{id}")]
pub async fn read_doctor(
    app_state: web::Data<AppState>,
    id: Path<String>,
) -> Result<HttpResponse, ApiError> {
    read(&app_state, "ReadDoctor", &id).await
}

#[utoipa::path(
    get,
    context_path = "/api",
    params(("id" = String, Path, description = "Hospital ID")),
    responses(
        (status = 200, description = "Hospital", body = common::entities::Hospital),
        (status = 404, description = "Hospital does not exist", body = ErrorResponse),
        (status = 500, description = "Failed to read asset", body = ErrorResponse)
    ),
    tag = QUERY_TAG
)]
#[get("/read-hospital/{id}")]
pub async fn read_hospital(
    app_state: web::Data<AppState>,
    id: Path<String>,
) -> Result<HttpResponse, ApiError> {
    read(&app_state, "ReadHospital", &id).await
}

#[utoipa::path(
    get,
    context_path = "/api",
    params(("id" = String, Path, description = "Medical record ID")),
    responses(
        (status = 200, description = "Medical record", body = common::entities::MedicalRecord),
        (status = 404, description = "Medical record does not exist", body = ErrorResponse),
        (status = 500, description = "Failed to read asset", body = ErrorResponse)
    ),
    tag = QUERY_TAG
)]
#[get("/read-record/{id}")]
pub async fn read_record(
    app_state: web::Data<AppState>,
    id: Path<String>,
) -> Result<HttpResponse, ApiError> {
    read(&app_state, "ReadMedicalRecord", &id).await
}

/// 按患者 ID 查询其全部病历
#[utoipa::path(
    get,
    context_path = "/api",
    params(("id" = String, Path, description = "Patient ID")),
    responses(
        (status = 200, description = "Medical records of the patient", body = [common::entities::MedicalRecord]),
        (status = 404, description = "Patient does not exist", body = ErrorResponse),
        (status = 500, description = "Failed to read asset", body = ErrorResponse)
    ),
    tag = QUERY_TAG
)]
#[get("/read-records/{id}")]
pub async fn read_records(
    app_state: web::Data<AppState>,
    id: Path<String>,
) -> Result<HttpResponse, ApiError> {
    read(&app_state, "GetMedicalRecordsByPatientID", &id).await
}
