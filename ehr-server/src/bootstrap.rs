use crate::relay::LedgerRelay;
use common::server_config::{CaConfig, LedgerConfig, SessionPoolConfig, WalletConfig};
use ledger::ca_client::CaClient;
use ledger::connection_profile::ConnectionProfile;
use ledger::enrollment::{enroll_admin, register_and_enroll_user};
use ledger::http_gateway::{CaEnrollment, HttpGateway};
use ledger::wallet::FileSystemWallet;
use ledger::{LedgerError, SessionPool};
use slog::{Logger, info};
use std::sync::Arc;
use std::time::Duration;

static LEDGER_LISTINGS: [&str; 6] = [
    "GetAllPatients",
    "GetAllDoctors",
    "GetAllHospitals",
    "GetAllMedicalRecords",
    "ReadAllAccounts",
    "GetAllLogChanges",
];

/// 加载连接配置和钱包, 按需向 CA 登记身份, 然后建立会话池
pub async fn build_relay(
    ledger_config: &LedgerConfig,
    wallet_config: &WalletConfig,
    ca_config: Option<&CaConfig>,
    pool_config: &SessionPoolConfig,
    log: &Logger,
) -> Result<LedgerRelay, LedgerError> {
    let profile = ConnectionProfile::load(&ledger_config.connection_profile)?;
    let wallet = FileSystemWallet::open(&wallet_config.path)?;
    info!(log, "Wallet opened"; "path" => &wallet_config.path);

    let ca = match ca_config {
        Some(ca_config) => {
            let client = CaClient::from_profile(&profile, &ca_config.name)?;
            enroll_admin(
                &client,
                &wallet,
                &ledger_config.msp_id,
                &ca_config.admin_id,
                &ca_config.admin_secret,
                log,
            )
            .await?;
            register_and_enroll_user(
                &client,
                &wallet,
                &ledger_config.msp_id,
                &ledger_config.identity,
                &ca_config.affiliation,
                log,
            )
            .await?;
            Some(CaEnrollment {
                client,
                affiliation: ca_config.affiliation.clone(),
            })
        }
        None => None,
    };

    let gateway = HttpGateway::new(
        profile,
        wallet,
        &ledger_config.msp_id,
        Duration::from_secs(ledger_config.request_timeout_secs),
        ca,
        log.clone(),
    );
    let pool = SessionPool::new(
        Arc::new(gateway),
        pool_config.max_idle_per_identity,
        log.clone(),
    );
    Ok(LedgerRelay::new(
        pool,
        &ledger_config.identity,
        &ledger_config.channel,
        &ledger_config.chaincode,
        log.clone(),
    ))
}

fn entry_count(payload: &[u8]) -> usize {
    serde_json::from_slice::<serde_json::Value>(payload)
        .ok()
        .and_then(|v| v.as_array().map(|a| a.len()))
        .unwrap_or(0)
}

/// 可选提交 InitLedger, 然后逐个查询各类资产并记录数量
pub async fn prime_ledger(relay: &LedgerRelay, init_ledger: bool, log: &Logger) -> Result<(), LedgerError> {
    let mut contract = relay.contract().await?;
    if init_ledger {
        info!(log, "Submit Transaction: InitLedger, function creates the initial set of assets on the ledger");
        contract.submit("InitLedger", &[]).await?;
        info!(log, "InitLedger committed");
    }
    for function in LEDGER_LISTINGS {
        let payload = contract.evaluate(function, &[]).await?;
        info!(log, "Evaluate Transaction: {}", function; "count" => entry_count(&payload));
    }
    Ok(())
}
