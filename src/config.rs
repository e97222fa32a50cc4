//! 通知配置 - 全局设置与项目级覆盖
//!
//! 配置文件查找优先级：
//! 1. 环境变量 `BUILD_NOTIFIER_CONFIG` 指定的路径
//! 2. `~/.config/build-notifier/config.json`
//!
//! 都不存在时使用默认配置。
//!
//! ```json
//! {
//!   "backend": "campfire",
//!   "subdomain": "acme",
//!   "token": "...",
//!   "room": "Ops",
//!   "build_server_url": "https://ci.example.com",
//!   "smart_notify": true,
//!   "projects": {
//!     "demo": { "room": "Demo" }
//!   }
//! }
//! ```

use crate::notification::channels::HttpSettings;
use crate::notification::template::{is_blank, DEFAULT_TEMPLATE};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// 配置文件路径环境变量
pub const CONFIG_ENV: &str = "BUILD_NOTIFIER_CONFIG";

/// 聊天后端
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    #[default]
    Slack,
    Campfire,
    Hipchat,
}

/// 全局设置（也用作合并项目覆盖后的有效设置）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GlobalSettings {
    pub backend: Backend,
    /// 房间 / 频道名
    pub room: String,
    pub token: String,
    /// Campfire 子域名
    pub subdomain: String,
    /// Slack 团队域名
    pub team_domain: String,
    /// Campfire 是否使用 https
    pub ssl: bool,
    /// Campfire 是否播放音效
    pub sound: bool,
    /// 构建服务器地址，用于拼接 `BUILD_URL`
    pub build_server_url: Option<String>,
    pub template: String,
    pub smart_notify: bool,
    /// 覆盖后端 API 地址
    pub api_base: Option<String>,
    pub http: HttpSettings,
}

impl Default for GlobalSettings {
    fn default() -> Self {
        Self {
            backend: Backend::default(),
            room: String::new(),
            token: String::new(),
            subdomain: String::new(),
            team_domain: String::new(),
            ssl: false,
            sound: false,
            build_server_url: None,
            template: DEFAULT_TEMPLATE.to_string(),
            smart_notify: false,
            api_base: None,
            http: HttpSettings::default(),
        }
    }
}

/// 项目级覆盖，空值回退到全局设置
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub room: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subdomain: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub team_domain: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub template: Option<String>,
}

/// 完整配置
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotifierSettings {
    #[serde(flatten)]
    pub global: GlobalSettings,
    #[serde(default)]
    pub projects: HashMap<String, ProjectOverrides>,
}

impl NotifierSettings {
    /// 从指定文件加载
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file '{}'", path.display()))?;
        Self::from_json(&content)
            .with_context(|| format!("Failed to parse config file '{}'", path.display()))
    }

    /// 从 JSON 字符串解析
    pub fn from_json(content: &str) -> Result<Self> {
        let settings: NotifierSettings = serde_json::from_str(content)?;
        Ok(settings.normalized())
    }

    /// 自动查找配置文件，不存在时返回默认配置
    pub fn auto_load() -> Result<Self> {
        match Self::default_path() {
            Some(path) if path.exists() => {
                debug!(path = %path.display(), "Loading notifier config");
                Self::load(path)
            }
            _ => {
                debug!("No notifier config found, using defaults");
                Ok(Self::default())
            }
        }
    }

    /// 配置文件路径
    pub fn default_path() -> Option<PathBuf> {
        if let Ok(path) = std::env::var(CONFIG_ENV) {
            if !path.trim().is_empty() {
                return Some(PathBuf::from(path));
            }
        }
        dirs::home_dir().map(|home| home.join(".config/build-notifier/config.json"))
    }

    /// 规范化：构建服务器地址补齐结尾的 `/`，空模板换成默认模板
    pub fn normalized(mut self) -> Self {
        self.global.build_server_url = self
            .global
            .build_server_url
            .take()
            .map(|url| url.trim().to_string())
            .filter(|url| !url.is_empty())
            .map(|url| if url.ends_with('/') { url } else { format!("{}/", url) });

        if is_blank(&self.global.template) {
            self.global.template = DEFAULT_TEMPLATE.to_string();
        }
        self
    }

    /// 合并项目覆盖后的有效设置
    pub fn effective(&self, project: &str) -> GlobalSettings {
        let mut settings = self.global.clone();
        if let Some(o) = self.projects.get(project) {
            settings.room = pick(&o.room, &self.global.room);
            settings.token = pick(&o.token, &self.global.token);
            settings.subdomain = pick(&o.subdomain, &self.global.subdomain);
            settings.team_domain = pick(&o.team_domain, &self.global.team_domain);
            settings.template = pick(&o.template, &self.global.template);
        }
        settings
    }

    /// 项目的房间与全局不同时返回
    pub fn configured_room(&self, project: &str) -> Option<String> {
        differs(self.effective(project).room, &self.global.room)
    }

    /// 项目的 token 与全局不同时返回
    pub fn configured_token(&self, project: &str) -> Option<String> {
        differs(self.effective(project).token, &self.global.token)
    }

    /// 项目的模板与全局不同时返回
    pub fn configured_template(&self, project: &str) -> Option<String> {
        differs(self.effective(project).template, &self.global.template)
    }
}

/// 覆盖值非空白时原样使用（不裁剪），否则回退到全局值
fn pick(value: &Option<String>, fallback: &str) -> String {
    match value.as_deref() {
        Some(v) if !v.trim().is_empty() => v.to_string(),
        _ => fallback.to_string(),
    }
}

fn differs(value: String, global: &str) -> Option<String> {
    if value == global {
        None
    } else {
        Some(value)
    }
}
