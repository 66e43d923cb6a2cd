mod logger;
mod config;

pub use logger::{setup_logger, parse_log_level};
pub use config::{Config, ConfigError};

/// 获取应用程序版本
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

/// 获取应用程序名称
pub fn name() -> &'static str {
    env!("CARGO_PKG_NAME")
}

/// 获取应用程序描述
pub fn description() -> &'static str {
    env!("CARGO_PKG_DESCRIPTION")
}
