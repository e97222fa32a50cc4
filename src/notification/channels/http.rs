//! 各后端共享的 HTTP 客户端设置

use crate::error::{NotifierError, Result};
use reqwest::blocking::{Client, Response};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{error, warn};

const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// HTTP 客户端设置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpSettings {
    /// 超时时间 (秒)
    pub timeout_secs: u64,
    /// 代理地址（如 http://proxy:3128）
    pub proxy: Option<String>,
    pub user_agent: String,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            proxy: None,
            user_agent: concat!("build-notifier/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl HttpSettings {
    /// 创建阻塞 HTTP 客户端
    pub fn build_client(&self) -> Result<Client> {
        let mut builder = Client::builder()
            .timeout(Duration::from_secs(self.timeout_secs))
            .user_agent(self.user_agent.clone());

        if let Some(proxy) = self.proxy.as_deref().filter(|p| !p.trim().is_empty()) {
            let proxy = reqwest::Proxy::all(proxy)
                .map_err(|e| NotifierError::config(format!("Invalid proxy '{}': {}", proxy, e)))?;
            builder = builder.proxy(proxy);
        }

        builder
            .build()
            .map_err(|e| NotifierError::config(format!("Cannot create HTTP client: {}", e)))
    }
}

/// 把传输错误转换为投递错误
pub(crate) fn transport_error(backend: &str, e: reqwest::Error) -> NotifierError {
    error!(channel = backend, error = %e, "HTTP request failed");
    NotifierError::delivery(backend, format!("HTTP request failed: {}", e))
}

/// 检查响应状态，成功时返回响应体
pub(crate) fn check_response(backend: &str, response: Response) -> Result<String> {
    let status = response.status();
    let body = response
        .text()
        .map_err(|e| NotifierError::delivery(backend, format!("Failed to read response: {}", e)))?;

    if status.is_success() {
        Ok(body)
    } else {
        warn!(channel = backend, status = %status, response = %body, "Post may have failed");
        Err(NotifierError::delivery(backend, format!("HTTP {}: {}", status.as_u16(), body)))
    }
}

/// 去掉末尾 `/` 的 API 地址
pub(crate) fn trim_base(base: &str) -> &str {
    base.trim_end_matches('/')
}
