//! 通知管线错误类型

/// 通知错误
#[derive(Debug, thiserror::Error)]
pub enum NotifierError {
    /// 配置错误（房间无法解析、缺少必填项等），重新配置前不会恢复
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// 投递失败（传输错误或非成功状态码）
    #[error("Delivery to {backend} failed: {message}")]
    Delivery { backend: String, message: String },
}

impl NotifierError {
    pub fn config(message: impl Into<String>) -> Self {
        NotifierError::Configuration(message.into())
    }

    pub fn delivery(backend: impl Into<String>, message: impl Into<String>) -> Self {
        NotifierError::Delivery {
            backend: backend.into(),
            message: message.into(),
        }
    }

    pub fn is_configuration(&self) -> bool {
        matches!(self, NotifierError::Configuration(_))
    }
}

pub type Result<T> = std::result::Result<T, NotifierError>;
