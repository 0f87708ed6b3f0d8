use crate::ledger_error::LedgerError;
use async_trait::async_trait;
use std::sync::Arc;

/// 链码句柄: evaluate 只读查询, submit 提交交易 (出错即视为未提交)
#[async_trait]
pub trait Contract: Send + Sync {
    async fn evaluate(&self, function: &str, args: &[String]) -> Result<Vec<u8>, LedgerError>;

    async fn submit(&self, function: &str, args: &[String]) -> Result<Vec<u8>, LedgerError>;
}

/// 以某个身份建立的网关会话
pub trait Session: Send + Sync {
    fn identity_label(&self) -> &str;

    fn contract(&self, channel: &str, chaincode: &str) -> Arc<dyn Contract>;

    fn close(&self);

    fn is_closed(&self) -> bool;
}

#[async_trait]
pub trait SessionFactory: Send + Sync {
    async fn open_session(&self, identity_label: &str) -> Result<Arc<dyn Session>, LedgerError>;
}
