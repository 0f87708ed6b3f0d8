use crate::api_error::ApiError;
use crate::ehr_models::{LedgerArgs, LedgerUpdate, MessageResponse};
use ledger::{Contract, LedgerError, SessionLease, SessionPool};
use serde_json::Value;
use slog::{Logger, error, info};
use std::sync::Arc;

/// 以固定身份访问指定通道上的链码
#[derive(Clone)]
pub struct LedgerRelay {
    pool: SessionPool,
    identity: String,
    channel: String,
    chaincode: String,
    log: Logger,
}

/// 一次租借的会话及其链码句柄, 网关故障时会话不再归还
pub struct ContractLease {
    lease: SessionLease,
    contract: Arc<dyn Contract>,
}

impl ContractLease {
    fn inspect<T>(&mut self, result: &Result<T, LedgerError>) {
        if let Err(e) = result {
            if e.is_session_fault() {
                self.lease.discard();
            }
        }
    }

    pub async fn evaluate(&mut self, function: &str, args: &[String]) -> Result<Vec<u8>, LedgerError> {
        let result = self.contract.evaluate(function, args).await;
        self.inspect(&result);
        result
    }

    pub async fn submit(&mut self, function: &str, args: &[String]) -> Result<Vec<u8>, LedgerError> {
        let result = self.contract.submit(function, args).await;
        self.inspect(&result);
        result
    }
}

// 存在性检查结果: 空或字面量 false 视为不存在
fn exists_flag(payload: &[u8]) -> bool {
    let text = String::from_utf8_lossy(payload);
    let text = text.trim();
    !(text.is_empty() || text == "false")
}

fn parse_payload(payload: &[u8]) -> Result<Value, LedgerError> {
    serde_json::from_slice(payload)
        .map_err(|e| LedgerError::Gateway(format!("ledger returned invalid JSON: {}", e)))
}

impl LedgerRelay {
    pub fn new(pool: SessionPool, identity: &str, channel: &str, chaincode: &str, log: Logger) -> Self {
        LedgerRelay {
            pool,
            identity: identity.to_string(),
            channel: channel.to_string(),
            chaincode: chaincode.to_string(),
            log,
        }
    }

    pub fn pool(&self) -> &SessionPool {
        &self.pool
    }

    pub async fn contract(&self) -> Result<ContractLease, LedgerError> {
        let lease = self.pool.acquire(&self.identity).await?;
        let contract = lease.contract(&self.channel, &self.chaincode);
        Ok(ContractLease { lease, contract })
    }

    async fn evaluate_json(&self, function: &str, args: &[String]) -> Result<Value, LedgerError> {
        let mut contract = self.contract().await?;
        let payload = contract.evaluate(function, args).await?;
        parse_payload(&payload)
    }

    /// GetAll* 列表查询
    pub async fn list_assets(&self, function: &str) -> Result<Value, ApiError> {
        self.evaluate_json(function, &[]).await.map_err(|e| {
            error!(self.log, "Failed to fetch assets"; "function" => function, "error" => %e);
            ApiError::Internal("Failed to fetch assets".to_string())
        })
    }

    pub async fn read_asset(&self, function: &str, asset_id: &str) -> Result<Value, ApiError> {
        self.evaluate_json(function, &[asset_id.to_string()])
            .await
            .map_err(|e| {
                if e.is_not_found() {
                    return ApiError::asset_not_found(asset_id);
                }
                error!(self.log, "Failed to read asset";
                    "function" => function, "asset" => asset_id, "error" => %e);
                ApiError::Internal("Failed to read asset".to_string())
            })
    }

    /// 创建不做存在性检查, 每个请求只提交一次
    pub async fn create_asset<R: LedgerArgs>(
        &self,
        function: &str,
        request: &R,
        success: &str,
        failure: &str,
    ) -> Result<MessageResponse, ApiError> {
        request.validate().map_err(ApiError::BadRequest)?;
        let args = request.to_args();
        let result: Result<Vec<u8>, LedgerError> = async {
            let mut contract = self.contract().await?;
            contract.submit(function, &args).await
        }
        .await;
        match result {
            Ok(_) => {
                info!(self.log, "Transaction committed"; "function" => function);
                Ok(MessageResponse::new(success))
            }
            Err(e) => {
                error!(self.log, "{}", failure; "function" => function, "error" => %e);
                Err(ApiError::Internal(failure.to_string()))
            }
        }
    }

    /// 先检查存在性, 存在时在同一会话上提交更新
    pub async fn update_asset<R: LedgerUpdate>(
        &self,
        exists_function: &str,
        update_function: &str,
        request: &R,
        success: &str,
        failure: &str,
    ) -> Result<MessageResponse, ApiError> {
        request.validate().map_err(ApiError::BadRequest)?;
        let asset_id = request.asset_id();

        let result: Result<bool, LedgerError> = async {
            let mut contract = self.contract().await?;
            let exists = contract
                .evaluate(exists_function, &[asset_id.to_string()])
                .await?;
            if !exists_flag(&exists) {
                return Ok(false);
            }
            contract.submit(update_function, &request.to_args()).await?;
            Ok(true)
        }
        .await;

        match result {
            Ok(true) => {
                info!(self.log, "Transaction committed"; "function" => update_function, "asset" => asset_id);
                Ok(MessageResponse::new(success))
            }
            Ok(false) => Err(ApiError::asset_not_found(asset_id)),
            Err(e) => {
                error!(self.log, "{}", failure; "function" => update_function, "error" => %e);
                Err(ApiError::Internal(failure.to_string()))
            }
        }
    }

    pub async fn delete_asset(
        &self,
        function: &str,
        resource: &str,
        asset_id: &str,
    ) -> Result<MessageResponse, ApiError> {
        let result: Result<Vec<u8>, LedgerError> = async {
            let mut contract = self.contract().await?;
            contract.submit(function, &[asset_id.to_string()]).await
        }
        .await;
        match result {
            Ok(_) => {
                info!(self.log, "Asset deleted successfully"; "asset" => asset_id);
                Ok(MessageResponse::new(format!(
                    "{} {} deleted successfully",
                    resource, asset_id
                )))
            }
            Err(e) => {
                error!(self.log, "Failed to delete asset"; "asset" => asset_id, "error" => %e);
                Err(ApiError::Internal(format!(
                    "Failed to delete {}: {}",
                    resource, e
                )))
            }
        }
    }

    /// 认证失败 (包括参数缺失) 一律返回 401
    pub async fn authenticate(
        &self,
        username: &str,
        password: &str,
        user_type: &str,
    ) -> Result<Value, ApiError> {
        let args = [username.to_string(), password.to_string(), user_type.to_string()];
        self.evaluate_json("AuthenticateUser", &args)
            .await
            .map_err(|e| {
                error!(self.log, "Authentication failed"; "user" => username, "error" => %e);
                ApiError::Unauthorized("Authentication failed".to_string())
            })
    }
}
