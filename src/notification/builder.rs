//! 发布器构建器 - 根据配置为项目创建渠道和发布器

use super::channel::{NotificationChannel, SendResult};
use super::channels::{
    CampfireChannel, CampfireConfig, HipchatChannel, HipchatConfig, SlackChannel, SlackConfig,
};
use super::publisher::{Publisher, PublisherConfig};
use crate::config::{Backend, GlobalSettings, NotifierSettings};
use crate::error::Result;
use crate::outcome::BuildOutcome;
use std::sync::Arc;
use tracing::info;

/// 发布器构建器
pub struct NotificationBuilder {
    settings: NotifierSettings,
    dry_run: bool,
}

impl NotificationBuilder {
    pub fn new(settings: NotifierSettings) -> Self {
        Self {
            settings,
            dry_run: false,
        }
    }

    /// 设置 dry-run 模式
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn settings(&self) -> &NotifierSettings {
        &self.settings
    }

    /// 为项目构建发布器（合并项目覆盖）
    pub fn build_for(&self, project: &str) -> Result<Publisher> {
        let effective = self.settings.effective(project);
        let channel = Self::channel(&effective)?;

        info!(
            channel = channel.name(),
            project = %project,
            room = %effective.room,
            smart_notify = effective.smart_notify,
            "Creating build notifier"
        );

        let config = PublisherConfig {
            template: effective.template,
            base_url: effective.build_server_url,
            smart_notify: effective.smart_notify,
        };
        Ok(Publisher::new(channel, config).with_dry_run(self.dry_run))
    }

    /// 根据后端类型创建渠道
    fn channel(settings: &GlobalSettings) -> Result<Arc<dyn NotificationChannel>> {
        let channel: Arc<dyn NotificationChannel> = match settings.backend {
            Backend::Campfire => Arc::new(CampfireChannel::new(CampfireConfig {
                subdomain: settings.subdomain.clone(),
                token: settings.token.clone(),
                room: settings.room.clone(),
                ssl: settings.ssl,
                sound: settings.sound,
                api_base: settings.api_base.clone(),
                http: settings.http.clone(),
            })?),
            Backend::Slack => Arc::new(SlackChannel::new(SlackConfig {
                team_domain: settings.team_domain.clone(),
                token: settings.token.clone(),
                room: settings.room.clone(),
                api_base: settings.api_base.clone(),
                http: settings.http.clone(),
            })?),
            Backend::Hipchat => Arc::new(HipchatChannel::new(HipchatConfig {
                token: settings.token.clone(),
                room: settings.room.clone(),
                api_base: settings.api_base.clone(),
                http: settings.http.clone(),
            })?),
        };
        Ok(channel)
    }
}

/// 便捷函数：自动加载配置并通知一次构建
pub fn notify_build(outcome: &BuildOutcome) -> anyhow::Result<SendResult> {
    let settings = NotifierSettings::auto_load()?;
    let publisher = NotificationBuilder::new(settings).build_for(&outcome.project_name)?;
    Ok(publisher.perform(outcome)?)
}
