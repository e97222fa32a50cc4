//! 模板变量上下文

use super::changes::summarize;
use super::template::render;
use crate::outcome::BuildOutcome;
use std::collections::HashMap;

/// 模板变量名
pub mod keys {
    pub const PROJECT_NAME: &str = "PROJECT_NAME";
    pub const PROJECT_DISPLAY_NAME: &str = "PROJECT_DISPLAY_NAME";
    pub const PROJECT_FULL_NAME: &str = "PROJECT_FULL_NAME";
    pub const PROJECT_FULL_DISPLAY_NAME: &str = "PROJECT_FULL_DISPLAY_NAME";
    pub const BUILD_DISPLAY_NAME: &str = "BUILD_DISPLAY_NAME";
    pub const RESULT: &str = "RESULT";
    pub const SMART_RESULT: &str = "SMART_RESULT";
    pub const CHANGES: &str = "CHANGES";
    /// 仅在配置了构建服务器地址时存在
    pub const BUILD_URL: &str = "BUILD_URL";
}

/// 一次通知可用的全部模板变量
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NotificationContext {
    vars: HashMap<String, String>,
}

impl NotificationContext {
    /// 从构建快照组装上下文
    ///
    /// `SMART_RESULT` 在未启用 smart notify 且构建成功时为小写，
    /// 让例行的成功消息在聊天室里不那么显眼。
    pub fn build(outcome: &BuildOutcome, base_url: Option<&str>, smart_notify: bool) -> Self {
        let mut ctx = Self::default();

        ctx.insert(keys::PROJECT_NAME, &outcome.project_name);
        ctx.insert(keys::PROJECT_DISPLAY_NAME, &outcome.project_display_name);
        ctx.insert(keys::PROJECT_FULL_NAME, &outcome.project_full_name);
        ctx.insert(keys::PROJECT_FULL_DISPLAY_NAME, &outcome.project_full_display_name);
        ctx.insert(keys::BUILD_DISPLAY_NAME, &outcome.display_name);

        let result = outcome.result.as_str();
        ctx.insert(keys::RESULT, result);
        if !smart_notify && outcome.result.is_success() {
            ctx.insert(keys::SMART_RESULT, &result.to_lowercase());
        } else {
            ctx.insert(keys::SMART_RESULT, result);
        }

        ctx.insert(keys::CHANGES, &summarize(outcome));

        if let Some(base) = base_url.filter(|b| b.chars().count() > 1) {
            ctx.insert(keys::BUILD_URL, &format!("{}{}", base, outcome.url));
        }

        ctx
    }

    fn insert(&mut self, key: &str, value: &str) {
        self.vars.insert(key.to_string(), value.to_string());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars.get(key).map(String::as_str)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.vars.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    pub fn as_map(&self) -> &HashMap<String, String> {
        &self.vars
    }

    /// 用当前上下文渲染模板
    pub fn render(&self, template: &str) -> String {
        render(template, &self.vars)
    }
}
