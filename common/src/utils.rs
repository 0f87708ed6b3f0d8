use crate::server_config::LogConfig;
use slog::LevelFilter;
use slog::{Drain, Level, Logger, o};
use std::fs;
use std::fs::OpenOptions;
use std::path::Path;

/// 解析日志级别, 无法识别时退回 Info
pub fn parse_log_level(level: &str) -> Level {
    level.parse::<Level>().unwrap_or(Level::Info)
}

// 设置日志记录: 控制台 + 文件 ({dir}/{name}.log) 双输出
pub fn setup_logging(log_config: &LogConfig) -> std::io::Result<Logger> {
    // 创建控制台logger
    let stdout_decorator = slog_term::TermDecorator::new().build();
    let stdout_drain = slog_term::FullFormat::new(stdout_decorator).build().fuse();
    let stdout_drain = slog_async::Async::new(stdout_drain).build().fuse();

    // 创建文件logger
    fs::create_dir_all(&log_config.dir)?;
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(Path::new(&log_config.dir).join(format!("{}.log", log_config.name)))?;

    let file_decorator = slog_term::PlainDecorator::new(file);
    let file_drain = slog_term::FullFormat::new(file_decorator).build().fuse();
    let file_drain = slog_async::Async::new(file_drain).build().fuse();

    // 组合drains
    let drain = slog::Duplicate::new(stdout_drain, file_drain).map(slog::Fuse);
    let drain = LevelFilter::new(drain, parse_log_level(&log_config.level)).map(slog::Fuse);

    Ok(Logger::root(
        drain,
        o!("version" => env!("CARGO_PKG_VERSION"), "service" => log_config.name.clone()),
    ))
}

/// 仅输出到控制台, 用于尚未读取配置时的启动阶段
pub fn console_logger() -> Logger {
    let decorator = slog_term::TermDecorator::new().build();
    let console_drain = slog_term::FullFormat::new(decorator).build().fuse();
    let console_drain = slog_async::Async::new(console_drain).build().fuse();
    Logger::root(console_drain, o!("version" => env!("CARGO_PKG_VERSION")))
}
