use serde::{Deserialize, Serialize};
use std::fs::{File, create_dir_all};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    ParseError(#[from] serde_json::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// 应用程序配置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// 发起方名称
    pub initiator_name: String,

    /// 响应方名称
    pub responder_name: String,

    /// 日志级别
    pub log_level: String,

    /// 随机种子，未设置时使用系统熵源
    pub seed: Option<u64>,

    /// 是否输出彩色轨迹
    pub color: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            initiator_name: "Alice".to_string(),
            responder_name: "Bob".to_string(),
            log_level: "info".to_string(),
            seed: None,
            color: true,
        }
    }
}

impl Config {
    /// 默认配置文件路径
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("ratchet-sim")
            .join("config.json")
    }

    /// 从文件加载配置
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        // 文件不存在时使用默认配置
        if !path.exists() {
            return Ok(Self::default());
        }

        let mut file = File::open(path)?;
        let mut content = String::new();
        file.read_to_string(&mut content)?;

        let config: Self = serde_json::from_str(&content)?;
        config.validate()?;

        Ok(config)
    }

    /// 保存配置到文件
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        let mut file = File::create(path)?;
        file.write_all(content.as_bytes())?;

        Ok(())
    }

    /// 检查参与者名称
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.initiator_name.trim().is_empty() || self.responder_name.trim().is_empty() {
            return Err(ConfigError::Invalid("participant names must not be empty".to_string()));
        }
        if self.initiator_name == self.responder_name {
            return Err(ConfigError::Invalid(format!(
                "initiator and responder are both named {}",
                self.initiator_name
            )));
        }
        Ok(())
    }
}
