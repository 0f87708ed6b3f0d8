mod api_doc;
mod api_error;
mod apilog_middleware;
mod auth_controller;
mod bootstrap;
mod common_controller;
mod constants;
mod doctor_controller;
mod ehr_models;
mod patient_controller;
mod query_controller;
mod record_controller;
mod relay;
#[cfg(test)]
mod test_support;

use crate::apilog_middleware::ApiLoggerMiddleware;
use crate::constants::API_CONTEXT_PATH;
use crate::relay::LedgerRelay;
use actix_cors::Cors;
use actix_web::{App, HttpServer, http, web};
use common::server_config;
use common::utils::{console_logger, setup_logging};
use slog::{Logger, error, info};

// 定义应用状态
#[derive(Clone)]
pub struct AppState {
    pub log: Logger,
    pub relay: LedgerRelay,
}

pub(crate) fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.app_data(ehr_models::json_config())
        .service(common_controller::echo)
        .service(common_controller::openapi_json)
        .service(
            web::scope(API_CONTEXT_PATH)
                .service(auth_controller::login)
                .service(query_controller::get_patients)
                .service(query_controller::get_doctors)
                .service(query_controller::get_hospitals)
                .service(query_controller::get_records)
                .service(query_controller::get_log_changes)
                .service(query_controller::read_patient)
                .service(query_controller::read_doctor)
                .service(query_controller::read_hospital)
                .service(query_controller::read_record)
                .service(query_controller::read_records)
                .service(patient_controller::create_patient)
                .service(patient_controller::update_patient)
                .service(patient_controller::delete_patient)
                .service(doctor_controller::create_doctor)
                .service(doctor_controller::update_doctor)
                .service(doctor_controller::delete_doctor)
                .service(record_controller::create_record)
                .service(record_controller::update_record),
        );
}

fn missing_section(name: &str) -> std::io::Error {
    std::io::Error::new(
        std::io::ErrorKind::Other,
        format!("missing config section: {}", name),
    )
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    let boot_log = console_logger();

    let config = match server_config::load_config() {
        Ok(config) => config,
        Err(e) => {
            error!(boot_log, "Error loading config: {:?}", e);
            return Err(std::io::Error::new(std::io::ErrorKind::Other, e));
        }
    };

    let log = match &config.log {
        Some(log_config) => setup_logging(log_config)?,
        None => boot_log,
    };

    let server_config = config.server.ok_or_else(|| missing_section("server"))?;
    let ledger_config = config.ledger.ok_or_else(|| missing_section("ledger"))?;
    let wallet_config = config.wallet.ok_or_else(|| missing_section("wallet"))?;
    let pool_config = config.session_pool.unwrap_or_default();
    info!(log, "Ledger Config is: {:?}", ledger_config);

    let relay = match bootstrap::build_relay(
        &ledger_config,
        &wallet_config,
        config.ca.as_ref(),
        &pool_config,
        &log,
    )
    .await
    {
        Ok(relay) => relay,
        Err(e) => {
            error!(log, "Failed to set up ledger access: {}", e);
            return Err(std::io::Error::new(std::io::ErrorKind::Other, e));
        }
    };

    if let Err(e) = bootstrap::prime_ledger(&relay, ledger_config.init_ledger, &log).await {
        error!(log, "Failed to run the application: {}", e);
        relay.pool().close_all();
        return Err(std::io::Error::new(std::io::ErrorKind::Other, e));
    }

    let app_state = AppState {
        log: log.clone(),
        relay: relay.clone(),
    };

    info!(
        log,
        "Starting the server at {}:{}", server_config.host, server_config.port
    );
    let middleware_log = log.clone();
    let result = HttpServer::new(move || {
        let cors = Cors::default()
            .allow_any_origin()
            .allowed_methods(vec!["GET", "POST", "PUT", "DELETE"])
            .allowed_headers(vec![http::header::ACCEPT])
            .allowed_header(http::header::CONTENT_TYPE)
            .max_age(3600);

        App::new()
            .wrap(ApiLoggerMiddleware {
                logger: middleware_log.clone(),
            })
            .wrap(cors)
            .app_data(web::Data::new(app_state.clone()))
            .configure(configure_routes)
    })
    .bind((server_config.host, server_config.port))?
    .run()
    .await;

    relay.pool().close_all();
    info!(log, "Server stopped");
    result
}
