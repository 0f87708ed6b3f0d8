use crate::AppState;
use crate::api_error::ApiError;
use crate::constants::PATIENT_TAG;
use crate::ehr_models::{CreatePatientRequest, ErrorResponse, MessageResponse, UpdatePatientRequest};
use actix_web::{HttpResponse, delete, post, put, web, web::Path};
use slog::info;

#[utoipa::path(
    post,
    context_path = "/api",
    request_body = CreatePatientRequest,
    responses(
        (status = 200, description = "Patient created", body = MessageResponse),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 500, description = "Failed to create patient", body = ErrorResponse)
    ),
    tag = PATIENT_TAG
)]
#[post("/create-patient")]
pub async fn create_patient(
    app_state: web::Data<AppState>,
    request: web::Json<CreatePatientRequest>,
) -> Result<HttpResponse, ApiError> {
    info!(app_state.log, "Submit Transaction: CreatePatient"; "patient" => &request.patient_id);
    let message = app_state
        .relay
        .create_asset(
            "CreatePatient",
            &request.into_inner(),
            "Patient created successfully",
            "Failed to create patient",
        )
        .await?;
    Ok(HttpResponse::Ok().json(message))
}

#[utoipa::path(
    put,
    context_path = "/api",
    request_body = UpdatePatientRequest,
    responses(
        (status = 200, description = "Patient updated", body = MessageResponse),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 404, description = "Patient does not exist", body = ErrorResponse),
        (status = 500, description = "Failed to update patient", body = ErrorResponse)
    ),
    tag = PATIENT_TAG
)]
#[put("/update-patient")]
pub async fn update_patient(
    app_state: web::Data<AppState>,
    request: web::Json<UpdatePatientRequest>,
) -> Result<HttpResponse, ApiError> {
    info!(app_state.log, "Submit Transaction: UpdatePatient"; "patient" => &request.patient_id);
    let message = app_state
        .relay
        .update_asset(
            "PatientExists",
            "UpdatePatient",
            &request.into_inner(),
            "Patient updated successfully",
            "Failed to update patient",
        )
        .await?;
    Ok(HttpResponse::Ok().json(message))
}

#[utoipa::path(
    delete,
    context_path = "/api",
    params(("id" = String, Path, description = "Patient ID")),
    responses(
        (status = 200, description = "Patient deleted", body = MessageResponse),
        (status = 500, description = "Failed to delete patient", body = ErrorResponse)
    ),
    tag = PATIENT_TAG
)]
#[delete("/delete-patient/{id}")]
pub async fn delete_patient(
    app_state: web::Data<AppState>,
    id: Path<String>,
) -> Result<HttpResponse, ApiError> {
    info!(app_state.log, "Submit Transaction: DeletePatient"; "patient" => id.as_str());
    let message = app_state
        .relay
        .delete_asset("DeletePatient", "Patient", &id)
        .await?;
    Ok(HttpResponse::Ok().json(message))
}
