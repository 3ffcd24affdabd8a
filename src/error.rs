use thiserror::Error;

/// 核心错误类型
///
/// 只在内部各层之间传递；会话管理器和占用通知器对外不抛出错误。
#[derive(Debug, Error)]
pub enum AppError {
    /// 凭证错误或后端返回的令牌无效
    #[error("authentication failed: {0}")]
    Auth(String),

    /// 持久化存储不可用
    #[error("storage error: {0}")]
    Storage(String),

    /// 令牌无法解析
    #[error("token decode error: {0}")]
    Decode(#[from] jsonwebtoken::errors::Error),

    /// 通知发送失败
    #[error("notification dispatch failed: {0}")]
    Dispatch(String),

    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
}

impl From<redis::RedisError> for AppError {
    fn from(e: redis::RedisError) -> Self {
        AppError::Storage(e.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(e: std::io::Error) -> Self {
        AppError::Storage(e.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(e: serde_json::Error) -> Self {
        AppError::Storage(format!("序列化错误: {}", e))
    }
}

pub type AppResult<T> = Result<T, AppError>;
