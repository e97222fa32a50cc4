//! Build Notifier - 构建完成后向聊天室发送通知（Campfire / Slack / HipChat）

pub mod config;
pub mod error;
pub mod logging;
pub mod notification;
pub mod outcome;

pub use config::{Backend, GlobalSettings, NotifierSettings, ProjectOverrides};
pub use error::{NotifierError, Result};
pub use notification::builder::notify_build;
pub use notification::{
    render, should_notify, summarize, NotificationBuilder, NotificationChannel,
    NotificationContext, Publisher, PublisherConfig, SendResult, Session, DEFAULT_TEMPLATE,
};
pub use outcome::{BuildOutcome, BuildResult, ChangeEntry, ChangeOrdering, ChangeSet};
