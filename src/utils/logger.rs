use log::LevelFilter;
use env_logger::{Builder, Env};

/// 设置日志记录器
///
/// `RUST_LOG` 优先于传入的级别。重复初始化会返回错误而不是 panic。
pub fn setup_logger(level: Option<LevelFilter>) -> Result<(), String> {
    let env = Env::default().default_filter_or(level_to_string(level.unwrap_or(LevelFilter::Info)));

    let mut builder = Builder::from_env(env);
    builder.format_timestamp(None).format_target(false);

    builder.try_init().map_err(|e| e.to_string())
}

/// 将日志级别转换为字符串
fn level_to_string(level: LevelFilter) -> &'static str {
    match level {
        LevelFilter::Off => "off",
        LevelFilter::Error => "error",
        LevelFilter::Warn => "warn",
        LevelFilter::Info => "info",
        LevelFilter::Debug => "debug",
        LevelFilter::Trace => "trace",
    }
}

/// 从字符串解析日志级别
pub fn parse_log_level(level_str: &str) -> Result<LevelFilter, String> {
    match level_str.to_lowercase().as_str() {
        "off" => Ok(LevelFilter::Off),
        "error" => Ok(LevelFilter::Error),
        "warn" => Ok(LevelFilter::Warn),
        "info" => Ok(LevelFilter::Info),
        "debug" => Ok(LevelFilter::Debug),
        "trace" => Ok(LevelFilter::Trace),
        _ => Err(format!("Invalid log level: {}", level_str)),
    }
}
