use crate::AppState;
use crate::api_error::ApiError;
use crate::constants::DOCTOR_TAG;
use crate::ehr_models::{CreateDoctorRequest, ErrorResponse, MessageResponse, UpdateDoctorRequest};
use actix_web::{HttpResponse, delete, post, put, web, web::Path};
use slog::info;

#[utoipa::path(
    post,
    context_path = "/api",
    request_body = CreateDoctorRequest,
    responses(
        (status = 200, description = "Doctor created", body = MessageResponse),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 500, description = "Failed to create doctor", body = ErrorResponse)
    ),
    tag = DOCTOR_TAG
)]
#[post("/create-doctor")]
pub async fn create_doctor(
    app_state: web::Data<AppState>,
    request: web::Json<CreateDoctorRequest>,
) -> Result<HttpResponse, ApiError> {
    info!(app_state.log, "Submit Transaction: CreateDoctor"; "doctor" => &request.doctor_id);
    let message = app_state
        .relay
        .create_asset(
            "CreateDoctor",
            &request.into_inner(),
            "Doctor created successfully",
            "Failed to create doctor",
        )
        .await?;
    Ok(HttpResponse::Ok().json(message))
}

#[utoipa::path(
    put,
    context_path = "/api",
    request_body = UpdateDoctorRequest,
    responses(
        (status = 200, description = "Doctor updated", body = MessageResponse),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 404, description = "Doctor does not exist", body = ErrorResponse),
        (status = 500, description = "Failed to update doctor", body = ErrorResponse)
    ),
    tag = DOCTOR_TAG
)]
#[put("/update-doctor")]
pub async fn update_doctor(
    app_state: web::Data<AppState>,
    request: web::Json<UpdateDoctorRequest>,
) -> Result<HttpResponse, ApiError> {
    info!(app_state.log, "Submit Transaction: UpdateDoctor"; "doctor" => &request.doctor_id);
    let message = app_state
        .relay
        .update_asset(
            "DoctorExists",
            "UpdateDoctor",
            &request.into_inner(),
            "Doctor updated successfully",
            "Failed to update doctor",
        )
        .await?;
    Ok(HttpResponse::Ok().json(message))
}

#[utoipa::path(
    delete,
    context_path = "/api",
    params(("id" = String, Path, description = "Doctor ID")),
    responses(
        (status = 200, description = "Doctor deleted", body = MessageResponse),
        (status = 500, description = "Failed to delete doctor", body = ErrorResponse)
    ),
    tag = DOCTOR_TAG
)]
#[delete("/delete-doctor/{id}")]
pub async fn delete_doctor(
    app_state: web::Data<AppState>,
    id: Path<String>,
) -> Result<HttpResponse, ApiError> {
    info!(app_state.log, "Submit Transaction: DeleteDoctor"; "doctor" => id.as_str());
    let message = app_state
        .relay
        .delete_asset("DeleteDoctor", "Doctor", &id)
        .await?;
    Ok(HttpResponse::Ok().json(message))
}
