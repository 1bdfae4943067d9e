use thiserror::Error;
use std::num::ParseFloatError;

#[derive(Error, Debug)]
pub enum ScreenerError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("HTTP request error: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("JSON parsing error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Date parsing error: {0}")]
    DateError(#[from] chrono::ParseError),

    #[error("Parse float error: {0}")]
    ParseFloatError(#[from] ParseFloatError),

    #[error("Provider error: {0}")]
    ProviderError(String),

    #[error("Data error: {0}")]
    DataError(String),

    #[error("Config error: {0}")]
    ConfigError(String),

    #[error("Task error: {0}")]
    TaskError(String),

    #[error("Unknown error: {0}")]
    Unknown(String),
}

impl ScreenerError {
    /// 是否由调用方输入导致（Web 层据此返回 400）
    pub fn is_user_error(&self) -> bool {
        matches!(self, ScreenerError::ConfigError(_) | ScreenerError::DateError(_))
    }
}

pub type Result<T> = std::result::Result<T, ScreenerError>;

// 用于从字符串创建错误
impl From<String> for ScreenerError {
    fn from(s: String) -> Self {
        ScreenerError::Unknown(s)
    }
}

// 用于从&str创建错误
impl From<&str> for ScreenerError {
    fn from(s: &str) -> Self {
        ScreenerError::Unknown(s.to_string())
    }
}
