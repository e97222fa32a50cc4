//! Slack 渠道（Jenkins CI incoming hook）

use super::http::{check_response, transport_error, trim_base, HttpSettings};
use crate::error::{NotifierError, Result};
use crate::notification::channel::{NotificationChannel, Session};
use crate::outcome::{BuildOutcome, BuildResult};
use reqwest::blocking::Client;
use tracing::debug;

const NAME: &str = "slack";
const HOOK_PATH: &str = "/services/hooks/jenkins-ci";

/// Slack 渠道配置
#[derive(Debug, Clone, Default)]
pub struct SlackConfig {
    /// 团队域名（`{team_domain}.slack.com`）
    pub team_domain: String,
    /// Hook token
    pub token: String,
    /// 频道（如 `#ci`）
    pub room: String,
    /// 覆盖 API 地址
    pub api_base: Option<String>,
    pub http: HttpSettings,
}

/// Slack 渠道
pub struct SlackChannel {
    config: SlackConfig,
    client: Client,
}

impl SlackChannel {
    pub fn new(config: SlackConfig) -> Result<Self> {
        if config.api_base.is_none() && config.team_domain.trim().is_empty() {
            return Err(NotifierError::config("Slack team domain is required"));
        }

        let client = config.http.build_client()?;
        Ok(Self { config, client })
    }

    fn hook_url(&self) -> String {
        match &self.config.api_base {
            Some(base) => format!("{}{}", trim_base(base), HOOK_PATH),
            None => format!("https://{}.slack.com{}", self.config.team_domain.trim(), HOOK_PATH),
        }
    }
}

fn color_for(result: BuildResult) -> &'static str {
    if result.is_success() {
        "good"
    } else {
        "danger"
    }
}

/// 构建 attachment 形式的 payload
pub(crate) fn slack_payload(channel: &str, message: &str, result: BuildResult) -> serde_json::Value {
    serde_json::json!({
        "channel": channel,
        "attachments": [{
            "fallback": message,
            "color": color_for(result),
            "fields": [{
                "short": false,
                "value": message,
            }],
        }],
    })
}

impl NotificationChannel for SlackChannel {
    fn name(&self) -> &str {
        NAME
    }

    fn resolve_session(&self) -> Result<Session> {
        let room = self.config.room.trim();
        if room.is_empty() {
            return Err(NotifierError::config("Slack channel is required"));
        }
        Ok(Session::named(room))
    }

    fn deliver(&self, session: &Session, outcome: &BuildOutcome, message: &str) -> Result<()> {
        let payload = slack_payload(&session.target, message, outcome.result).to_string();
        debug!(channel = NAME, target = %session.target, "Posting to Slack");

        let response = self
            .client
            .post(self.hook_url())
            .query(&[("token", self.config.token.as_str())])
            .form(&[("payload", payload.as_str())])
            .send()
            .map_err(|e| transport_error(NAME, e))?;

        check_response(NAME, response)?;
        Ok(())
    }
}
