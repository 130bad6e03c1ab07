//! Dev only

use std::fs;
use std::path::Path;
use std::time::Duration;
use serde::Deserialize;
use crate::core::{DevHookError, Result};
use crate::utils::RetryStrategy;

pub const DEFAULT_CONFIG_PATH: &str = "devhook.toml";
pub const SECRET_ENV: &str = "UPLOADTHING_SECRET";

#[derive(Deserialize, Debug, Clone)]
pub struct Config {
    /// 用于签名回调的 API key
    #[serde(default)]
    pub api_key: String,
    /// 单个请求的超时，默认不设置
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,
    #[serde(default)]
    pub backoff: BackoffConfig,
}

/// 轮询退避参数
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct BackoffConfig {
    pub initial_delay_ms: u64,
    pub multiplier: f64,
    pub max_delay_ms: u64,
    pub max_elapsed_secs: Option<u64>,
    pub max_attempts: Option<u32>,
}

impl Default for BackoffConfig {
    fn default() -> Self {
        Self {
            initial_delay_ms: 10,
            multiplier: 4.0,
            max_delay_ms: 60_000,
            max_elapsed_secs: Some(60),
            max_attempts: None,
        }
    }
}

impl BackoffConfig {
    pub fn strategy(&self) -> RetryStrategy {
        RetryStrategy::Exponential {
            initial: Duration::from_millis(self.initial_delay_ms),
            multiplier: self.multiplier,
            max_delay: Duration::from_millis(self.max_delay_ms),
        }
    }

    pub fn max_elapsed(&self) -> Option<Duration> {
        self.max_elapsed_secs.map(Duration::from_secs)
    }

    /// 退避必须严格递增
    pub fn validate(&self) -> Result<()> {
        if !(self.multiplier > 1.0) || !self.multiplier.is_finite() {
            return Err(DevHookError::config("backoff.multiplier must be greater than 1"));
        }
        if self.initial_delay_ms == 0 {
            return Err(DevHookError::config("backoff.initial_delay_ms must be positive"));
        }
        Ok(())
    }
}

impl Config {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            request_timeout_secs: None,
            backoff: BackoffConfig::default(),
        }
    }

    /// 读取配置文件；文件不存在时使用默认值，之后应用环境变量
    pub fn load_config(path: impl AsRef<Path>) -> Result<Config> {
        let path = path.as_ref();
        let mut config = if path.exists() {
            let config_str = fs::read_to_string(path).map_err(|e| {
                DevHookError::config(format!("can't read {}: {}", path.display(), e))
            })?;
            Self::parse(&config_str)?
        } else {
            tracing::debug!(path = %path.display(), "Config file not found, using defaults");
            Self::new("")
        };

        if let Ok(secret) = std::env::var(SECRET_ENV) {
            config.api_key = secret;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn parse(config_str: &str) -> Result<Config> {
        toml::from_str(config_str).map_err(|e| DevHookError::config(e.to_string()))
    }

    pub fn validate(&self) -> Result<()> {
        if self.api_key.trim().is_empty() {
            return Err(DevHookError::config(format!(
                "api_key is missing, set it in the config file or {}",
                SECRET_ENV
            )));
        }
        self.backoff.validate()
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }
}
