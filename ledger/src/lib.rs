pub mod ca_client;
pub mod connection_profile;
pub mod enrollment;
pub mod gateway;
pub mod http_gateway;
pub mod ledger_error;
pub mod session_pool;
pub mod signing;
pub mod wallet;

pub use gateway::{Contract, Session, SessionFactory};
pub use ledger_error::{ContractError, ContractErrorKind, LedgerError};
pub use session_pool::{SessionLease, SessionPool};
