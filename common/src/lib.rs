pub mod entities;
pub mod server_config;
pub mod utils;
