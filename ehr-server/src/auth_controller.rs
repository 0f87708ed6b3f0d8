use crate::AppState;
use crate::api_error::ApiError;
use crate::constants::AUTH_TAG;
use crate::ehr_models::{ErrorResponse, LoginParams};
use actix_web::{HttpResponse, get, web};
use slog::info;

/// 通过链码 AuthenticateUser 校验账号, 返回账号信息
#[utoipa::path(
    get,
    context_path = "/api",
    params(LoginParams),
    responses(
        (status = 200, description = "Authenticated account", body = common::entities::Account),
        (status = 401, description = "Authentication failed", body = ErrorResponse)
    ),
    tag = AUTH_TAG
)]
#[get("/login")]
pub async fn login(
    app_state: web::Data<AppState>,
    params: web::Query<LoginParams>,
) -> Result<HttpResponse, ApiError> {
    let params = params.into_inner();
    let (username, password, user_type) = match (params.username, params.password, params.user_type) {
        (Some(u), Some(p), Some(t)) => (u, p, t),
        _ => return Err(ApiError::Unauthorized("Authentication failed".to_string())),
    };
    info!(app_state.log, "Evaluate Transaction: AuthenticateUser"; "user" => &username, "type" => &user_type);
    let account = app_state
        .relay
        .authenticate(&username, &password, &user_type)
        .await?;
    Ok(HttpResponse::Ok().json(account))
}
