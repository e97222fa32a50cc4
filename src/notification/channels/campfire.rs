//! Campfire 渠道
//!
//! 会话解析：`GET /rooms.json` 按名称查找房间，找不到时为配置错误；
//! 请求失败或返回非 2xx 时为投递错误（带 HTTP 状态），可重试。
//! 投递：`POST /room/{id}/speak.json`，启用声音时再播放一段音效
//! （失败为 trombone，其余为 rimshot）。

use super::http::{check_response, transport_error, trim_base, HttpSettings};
use crate::error::{NotifierError, Result};
use crate::notification::channel::{NotificationChannel, Session};
use crate::outcome::{BuildOutcome, BuildResult};
use reqwest::blocking::Client;
use serde::Deserialize;
use tracing::{debug, info};

const NAME: &str = "campfire";

/// Campfire 渠道配置
#[derive(Debug, Clone, Default)]
pub struct CampfireConfig {
    /// 子域名（`{subdomain}.campfirenow.com`）
    pub subdomain: String,
    /// API token（作为 basic auth 用户名）
    pub token: String,
    /// 房间名
    pub room: String,
    /// 是否使用 https
    pub ssl: bool,
    /// 是否在消息后播放音效
    pub sound: bool,
    /// 覆盖 API 地址
    pub api_base: Option<String>,
    pub http: HttpSettings,
}

#[derive(Debug, Deserialize)]
struct RoomsResponse {
    #[serde(default)]
    rooms: Vec<Room>,
}

#[derive(Debug, Deserialize)]
struct Room {
    id: u64,
    name: String,
}

/// Campfire 渠道
pub struct CampfireChannel {
    config: CampfireConfig,
    client: Client,
}

impl CampfireChannel {
    pub fn new(config: CampfireConfig) -> Result<Self> {
        if config.api_base.is_none() && config.subdomain.trim().is_empty() {
            return Err(NotifierError::config("Campfire subdomain is required"));
        }
        if config.room.trim().is_empty() {
            return Err(NotifierError::config("Campfire room is required"));
        }

        let client = config.http.build_client()?;
        Ok(Self { config, client })
    }

    fn base_url(&self) -> String {
        match &self.config.api_base {
            Some(base) => trim_base(base).to_string(),
            None => {
                let scheme = if self.config.ssl { "https" } else { "http" };
                format!("{}://{}.campfirenow.com", scheme, self.config.subdomain.trim())
            }
        }
    }

    fn speak(&self, room_id: &str, kind: &str, body: &str) -> Result<()> {
        let url = format!("{}/room/{}/speak.json", self.base_url(), room_id);
        let payload = speak_payload(kind, body);

        let response = self
            .client
            .post(&url)
            .basic_auth(&self.config.token, Some("X"))
            .json(&payload)
            .send()
            .map_err(|e| transport_error(NAME, e))?;

        check_response(NAME, response)?;
        Ok(())
    }
}

pub(crate) fn speak_payload(kind: &str, body: &str) -> serde_json::Value {
    serde_json::json!({
        "message": {
            "type": kind,
            "body": body,
        }
    })
}

/// 构建结果对应的音效
pub(crate) fn sound_for(result: BuildResult) -> &'static str {
    match result {
        BuildResult::Failure => "trombone",
        _ => "rimshot",
    }
}

impl NotificationChannel for CampfireChannel {
    fn name(&self) -> &str {
        NAME
    }

    fn resolve_session(&self) -> Result<Session> {
        let url = format!("{}/rooms.json", self.base_url());
        let room_name = self.config.room.trim();

        // 传输错误与非 2xx 状态都是可重试的投递错误，只有房间不存在才是配置错误
        let response = self
            .client
            .get(&url)
            .basic_auth(&self.config.token, Some("X"))
            .send()
            .map_err(|e| transport_error(NAME, e))?;

        let body = check_response(NAME, response)?;

        let rooms: RoomsResponse = serde_json::from_str(&body).map_err(|e| {
            NotifierError::delivery(NAME, format!("Unexpected Campfire rooms response: {}", e))
        })?;

        let room = rooms
            .rooms
            .into_iter()
            .find(|r| r.name == room_name)
            .ok_or_else(|| {
                NotifierError::config(format!(
                    "Room '{}' not found - verify name and room permissions",
                    room_name
                ))
            })?;

        info!(channel = NAME, room = %room.name, room_id = room.id, "Found Campfire room");
        Ok(Session::new(room.id.to_string(), room.name))
    }

    fn deliver(&self, session: &Session, outcome: &BuildOutcome, message: &str) -> Result<()> {
        self.speak(&session.target, "TextMessage", message)?;

        if self.config.sound {
            let sound = sound_for(outcome.result);
            debug!(channel = NAME, sound, "Playing sound");
            self.speak(&session.target, "SoundMessage", sound)?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> CampfireConfig {
        CampfireConfig {
            subdomain: "acme".to_string(),
            token: "secret".to_string(),
            room: "Ops".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_requires_subdomain_and_room() {
        let err = CampfireChannel::new(CampfireConfig {
            subdomain: " ".to_string(),
            ..config()
        })
        .err()
        .unwrap();
        assert!(err.to_string().contains("subdomain"));

        let err = CampfireChannel::new(CampfireConfig {
            room: String::new(),
            ..config()
        })
        .err()
        .unwrap();
        assert!(err.to_string().contains("room"));
    }

    #[test]
    fn test_base_url_follows_ssl_flag() {
        let channel = CampfireChannel::new(config()).unwrap();
        assert_eq!(channel.base_url(), "http://acme.campfirenow.com");

        let channel = CampfireChannel::new(CampfireConfig { ssl: true, ..config() }).unwrap();
        assert_eq!(channel.base_url(), "https://acme.campfirenow.com");

        let channel = CampfireChannel::new(CampfireConfig {
            subdomain: String::new(),
            api_base: Some("http://127.0.0.1:9/".to_string()),
            ..config()
        })
        .unwrap();
        assert_eq!(channel.base_url(), "http://127.0.0.1:9");
    }

    #[test]
    fn test_sound_for_result() {
        assert_eq!(sound_for(BuildResult::Failure), "trombone");
        assert_eq!(sound_for(BuildResult::Success), "rimshot");
        assert_eq!(sound_for(BuildResult::Unstable), "rimshot");
    }

    #[test]
    fn test_speak_payload() {
        let payload = speak_payload("TextMessage", "demo #1: FAILURE");
        assert_eq!(payload["message"]["type"], "TextMessage");
        assert_eq!(payload["message"]["body"], "demo #1: FAILURE");
    }
}
