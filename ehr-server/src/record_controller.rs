use crate::AppState;
use crate::api_error::ApiError;
use crate::constants::RECORD_TAG;
use crate::ehr_models::{CreateRecordRequest, ErrorResponse, MessageResponse, UpdateRecordRequest};
use actix_web::{HttpResponse, post, put, web};
use slog::info;

#[utoipa::path(
    post,
    context_path = "/api",
    request_body = CreateRecordRequest,
    responses(
        (status = 200, description = "Medical record created", body = MessageResponse),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 500, description = "Failed to create medical record", body = ErrorResponse)
    ),
    tag = RECORD_TAG
)]
#[post("/create-record")]
pub async fn create_record(
    app_state: web::Data<AppState>,
    request: web::Json<CreateRecordRequest>,
) -> Result<HttpResponse, ApiError> {
    info!(app_state.log, "Submit Transaction: CreateMedicalRecord"; "record" => &request.record_id);
    let message = app_state
        .relay
        .create_asset(
            "CreateMedicalRecord",
            &request.into_inner(),
            "Medical Record created successfully",
            "Failed to create Medical Record",
        )
        .await?;
    Ok(HttpResponse::Ok().json(message))
}

#[utoipa::path(
    put,
    context_path = "/api",
    request_body = UpdateRecordRequest,
    responses(
        (status = 200, description = "Medical record updated", body = MessageResponse),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 404, description = "Medical record does not exist", body = ErrorResponse),
        (status = 500, description = "Failed to update medical record", body = ErrorResponse)
    ),
    tag = RECORD_TAG
)]
#[put("/update-record")]
pub async fn update_record(
    app_state: web::Data<AppState>,
    request: web::Json<UpdateRecordRequest>,
) -> Result<HttpResponse, ApiError> {
    info!(app_state.log, "Submit Transaction: UpdateMedicalRecord"; "record" => &request.record.record_id);
    let message = app_state
        .relay
        .update_asset(
            "MedicalRecordExists",
            "UpdateMedicalRecord",
            &request.into_inner(),
            "Medical Record updated successfully",
            "Failed to update Medical Record",
        )
        .await?;
    Ok(HttpResponse::Ok().json(message))
}
