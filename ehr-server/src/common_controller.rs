use crate::api_doc::ApiDoc;
use actix_web::{HttpResponse, Responder, get};
use utoipa::OpenApi;

/// nothing to do, just for test to verify services is running
#[utoipa::path(
    get,
    responses(
        (status = 200, description = "Echo Success"),
    ),
    tag = "WEBAPI",
    description = "Echo endpoint"
)]
#[get("/echo")]
pub async fn echo() -> impl Responder {
    HttpResponse::Ok().body("Success")
}

#[get("/api-docs/openapi.json")]
pub async fn openapi_json() -> impl Responder {
    HttpResponse::Ok().json(ApiDoc::openapi())
}
