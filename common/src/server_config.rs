use config::{Config, ConfigError, Environment, File};
use dotenv::dotenv;
use serde::Deserialize;
use std::env;

// 定义配置结构体
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub port: u16,
    pub host: String,
}

/// 账本网关相关配置
///
/// `identity` 是钱包中用于签名的身份标签, 所有路由共用该身份.
#[derive(Debug, Clone, Deserialize)]
pub struct LedgerConfig {
    pub connection_profile: String, // 连接配置文件路径 (Fabric connection profile JSON)
    pub channel: String,
    pub chaincode: String,
    pub msp_id: String,
    pub identity: String,
    #[serde(default)]
    pub init_ledger: bool, // 启动时是否提交 InitLedger
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_request_timeout_secs() -> u64 {
    30
}

#[derive(Debug, Clone, Deserialize)]
pub struct WalletConfig {
    pub path: String,
}

// "ca": {
//   "name": "ca.hospital1.example.com",
//   "admin_id": "admin",
//   "admin_secret": "adminpw",
//   "affiliation": "hospital1.department1"
// }
#[derive(Debug, Clone, Deserialize)]
pub struct CaConfig {
    pub name: String,
    pub admin_id: String,
    pub admin_secret: String,
    pub affiliation: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SessionPoolConfig {
    #[serde(default = "default_max_idle_per_identity")]
    pub max_idle_per_identity: usize,
}

fn default_max_idle_per_identity() -> usize {
    4
}

impl Default for SessionPoolConfig {
    fn default() -> Self {
        SessionPoolConfig {
            max_idle_per_identity: default_max_idle_per_identity(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LogConfig {
    pub name: String,
    pub dir: String,
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

#[derive(Debug, Deserialize)]
pub struct AppConfig {
    pub server: Option<ServerConfig>,
    pub ledger: Option<LedgerConfig>,
    pub wallet: Option<WalletConfig>,
    pub ca: Option<CaConfig>,
    pub session_pool: Option<SessionPoolConfig>,
    pub log: Option<LogConfig>,
}

static APP_ENV: &str = "APP_ENV";
static APP_PREFIX: &str = "EHR";

pub fn load_config() -> Result<AppConfig, ConfigError> {
    // 1. 加载 .env 文件
    dotenv().ok();

    // 2. 从 .env 获取当前环境 (默认 dev)
    let env = env::var(APP_ENV).unwrap_or_else(|_| "dev".into());

    // 3. 动态加载配置文件 (如 application.dev.json)
    let config_path = format!("application.{}.json", env);
    load_config_from(&config_path)
}

/// 从指定路径加载配置, 环境变量 `EHR_<SECTION>__<KEY>` 可覆盖文件中的值.
pub fn load_config_from(config_path: &str) -> Result<AppConfig, ConfigError> {
    let settings = Config::builder()
        .add_source(File::with_name(config_path).required(true))
        .add_source(
            Environment::with_prefix(APP_PREFIX)
                .prefix_separator("_")
                .separator("__"),
        )
        .build()?;

    let app_config: AppConfig = settings.try_deserialize()?;
    Ok(app_config)
}
