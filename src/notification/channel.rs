//! 投递渠道 trait 定义

use crate::error::Result;
use crate::outcome::BuildOutcome;

/// 与聊天后端建立的会话（如已解析出的房间）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    /// 后端使用的投递目标（房间 ID、频道名等）
    pub target: String,
    /// 人类可读的目标名称（用于日志）
    pub label: String,
}

impl Session {
    pub fn new(target: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            label: label.into(),
        }
    }

    /// 目标与名称相同的会话
    pub fn named(target: impl Into<String>) -> Self {
        let target = target.into();
        Self {
            label: target.clone(),
            target,
        }
    }
}

/// 发送结果
#[derive(Debug, Clone, PartialEq)]
pub enum SendResult {
    /// 发送成功
    Sent,
    /// 跳过（空模板、smart notify 抑制、dry-run）
    Skipped(String),
}

impl SendResult {
    pub fn is_sent(&self) -> bool {
        matches!(self, SendResult::Sent)
    }
}

/// 投递渠道 trait，每个聊天后端一个实现
pub trait NotificationChannel: Send + Sync {
    /// 渠道名称（用于日志和错误）
    fn name(&self) -> &str;

    /// 解析会话，失败时返回 `NotifierError::Configuration`
    fn resolve_session(&self) -> Result<Session>;

    /// 投递已渲染的消息，失败时返回 `NotifierError::Delivery`
    fn deliver(&self, session: &Session, outcome: &BuildOutcome, message: &str) -> Result<()>;
}
