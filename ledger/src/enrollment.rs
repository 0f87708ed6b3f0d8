use crate::ca_client::{CaClient, RegistrationRequest};
use crate::ledger_error::LedgerError;
use crate::wallet::{FileSystemWallet, Identity};
use slog::{Logger, info};

pub static ADMIN_LABEL: &str = "admin";

/// 钱包中没有 admin 身份时用引导账号登记一次
pub async fn enroll_admin(
    ca: &CaClient,
    wallet: &FileSystemWallet,
    msp_id: &str,
    admin_id: &str,
    admin_secret: &str,
    log: &Logger,
) -> Result<(), LedgerError> {
    if wallet.get(ADMIN_LABEL)?.is_some() {
        info!(log, "An identity for the admin user already exists in the wallet");
        return Ok(());
    }

    let enrollment = ca.enroll(admin_id, admin_secret).await?;
    let identity = Identity::x509(msp_id, enrollment.certificate, enrollment.private_key);
    wallet.put(ADMIN_LABEL, &identity)?;
    info!(log, "Successfully enrolled admin user and imported it into the wallet");
    Ok(())
}

/// 以 admin 为注册员注册并登记应用用户
pub async fn register_and_enroll_user(
    ca: &CaClient,
    wallet: &FileSystemWallet,
    msp_id: &str,
    user_id: &str,
    affiliation: &str,
    log: &Logger,
) -> Result<Identity, LedgerError> {
    if let Some(identity) = wallet.get(user_id)? {
        info!(log, "An identity for the user already exists in the wallet"; "user" => user_id);
        return Ok(identity);
    }

    let admin = wallet.get(ADMIN_LABEL)?.ok_or_else(|| {
        LedgerError::Identity(
            "An identity for the admin user does not exist in the wallet, enroll the admin user first"
                .to_string(),
        )
    })?;

    let request = RegistrationRequest {
        id: user_id.to_string(),
        type_: "client".to_string(),
        affiliation: affiliation.to_string(),
        secret: None,
        max_enrollments: -1,
        caname: ca.ca_name().to_string(),
    };
    let secret = ca.register(&admin, &request).await?;
    let enrollment = ca.enroll(user_id, &secret).await?;

    let identity = Identity::x509(msp_id, enrollment.certificate, enrollment.private_key);
    wallet.put(user_id, &identity)?;
    info!(log, "Successfully registered and enrolled user and imported it into the wallet"; "user" => user_id);
    Ok(identity)
}
