use std::fmt;
use thiserror::Error;

/// 链码错误分类, 由网关边界给出, 调用方按标签分派而不再匹配消息文本
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContractErrorKind {
    NotFound,
    ValidationFailed,
    Unavailable,
}

impl fmt::Display for ContractErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContractErrorKind::NotFound => write!(f, "not found"),
            ContractErrorKind::ValidationFailed => write!(f, "validation failed"),
            ContractErrorKind::Unavailable => write!(f, "unavailable"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ContractError {
    pub kind: ContractErrorKind,
    pub message: String,
}

const NOT_FOUND_MARKER: &str = "does not exist";

impl ContractError {
    pub fn new(kind: ContractErrorKind, message: impl Into<String>) -> Self {
        ContractError {
            kind,
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ContractErrorKind::NotFound, message)
    }

    pub fn validation_failed(message: impl Into<String>) -> Self {
        Self::new(ContractErrorKind::ValidationFailed, message)
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::new(ContractErrorKind::Unavailable, message)
    }

    /// 链码只返回字符串错误, 这里是唯一检查消息文本的地方
    pub fn from_chaincode_message(message: impl Into<String>) -> Self {
        let message = message.into();
        if message.contains(NOT_FOUND_MARKER) {
            Self::not_found(message)
        } else {
            Self::validation_failed(message)
        }
    }

    /// 根据网关返回的 HTTP 状态码和消息分类; 只有链码消息能判定资产不存在,
    /// 裸 404 (通道或链码名错误等) 不算
    pub fn from_status(status: u16, message: impl Into<String>) -> Self {
        let message = message.into();
        if message.contains(NOT_FOUND_MARKER) {
            return Self::not_found(message);
        }
        match status {
            500 | 502..=599 => Self::unavailable(message),
            _ => Self::validation_failed(message),
        }
    }
}

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("Connection profile error: {0}")]
    Connection(String),

    #[error("Identity error: {0}")]
    Identity(String),

    #[error("Gateway error: {0}")]
    Gateway(String),

    #[error(transparent)]
    Contract(#[from] ContractError),
}

impl LedgerError {
    pub fn contract_kind(&self) -> Option<ContractErrorKind> {
        match self {
            LedgerError::Contract(e) => Some(e.kind),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.contract_kind() == Some(ContractErrorKind::NotFound)
    }

    /// 会话本身可能已失效 (网络中断等), 租约归还时应丢弃而非复用
    pub fn is_session_fault(&self) -> bool {
        matches!(self, LedgerError::Gateway(_))
            || self.contract_kind() == Some(ContractErrorKind::Unavailable)
    }
}
