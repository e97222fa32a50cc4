//! HipChat 渠道（v2 room notification API）

use super::http::{check_response, transport_error, HttpSettings};
use crate::error::{NotifierError, Result};
use crate::notification::channel::{NotificationChannel, Session};
use crate::outcome::{BuildOutcome, BuildResult};
use reqwest::blocking::Client;
use reqwest::Url;
use serde::Serialize;
use tracing::debug;

const NAME: &str = "hipchat";
const DEFAULT_API_BASE: &str = "https://api.hipchat.com";

/// HipChat 渠道配置
#[derive(Debug, Clone, Default)]
pub struct HipchatConfig {
    /// Room notification token
    pub token: String,
    /// 房间名或 ID
    pub room: String,
    /// 覆盖 API 地址
    pub api_base: Option<String>,
    pub http: HttpSettings,
}

/// HipChat 请求载荷
#[derive(Debug, Serialize)]
pub(crate) struct HipchatPayload<'a> {
    pub color: &'static str,
    pub message_format: &'static str,
    pub message: &'a str,
    pub notify: bool,
}

impl<'a> HipchatPayload<'a> {
    pub(crate) fn new(message: &'a str, result: BuildResult) -> Self {
        Self {
            color: if result.is_success() { "green" } else { "red" },
            message_format: "text",
            message,
            notify: true,
        }
    }
}

/// HipChat 渠道
pub struct HipchatChannel {
    config: HipchatConfig,
    client: Client,
}

impl HipchatChannel {
    pub fn new(config: HipchatConfig) -> Result<Self> {
        let client = config.http.build_client()?;
        Ok(Self { config, client })
    }

    /// `{base}/v2/room/{room}/notification`，房间名按路径段编码
    fn notification_url(&self, room: &str) -> Result<Url> {
        let base = self.config.api_base.as_deref().unwrap_or(DEFAULT_API_BASE);
        let mut url = Url::parse(base)
            .map_err(|e| NotifierError::config(format!("Invalid HipChat API base '{}': {}", base, e)))?;

        url.path_segments_mut()
            .map_err(|_| NotifierError::config(format!("Invalid HipChat API base '{}'", base)))?
            .pop_if_empty()
            .extend(["v2", "room", room, "notification"]);

        Ok(url)
    }
}

impl NotificationChannel for HipchatChannel {
    fn name(&self) -> &str {
        NAME
    }

    fn resolve_session(&self) -> Result<Session> {
        let room = self.config.room.trim();
        if room.is_empty() {
            return Err(NotifierError::config("HipChat room is required"));
        }
        self.notification_url(room)?;
        Ok(Session::named(room))
    }

    fn deliver(&self, session: &Session, outcome: &BuildOutcome, message: &str) -> Result<()> {
        let url = self.notification_url(&session.target)?;
        let payload = HipchatPayload::new(message, outcome.result);
        debug!(channel = NAME, url = %url, color = payload.color, "Sending to HipChat");

        let response = self
            .client
            .post(url)
            .bearer_auth(&self.config.token)
            .json(&payload)
            .send()
            .map_err(|e| transport_error(NAME, e))?;

        check_response(NAME, response)?;
        Ok(())
    }
}
