//! 构建通知 - 所有后端共享的决策与渲染管线
//!
//! # 流程
//! 1. `Publisher::perform` 确保与后端的会话已建立
//! 2. `policy::should_notify` 决定是否通知（smart notify）
//! 3. `NotificationContext::build` 组装模板变量（含 `changes::summarize` 变更摘要）
//! 4. `template::render` 渲染 `%KEY%` 模板
//! 5. `NotificationChannel::deliver` 交给具体后端投递
//!
//! # 使用示例
//! ```ignore
//! use build_notifier::config::NotifierSettings;
//! use build_notifier::notification::NotificationBuilder;
//!
//! let settings = NotifierSettings::auto_load()?;
//! let publisher = NotificationBuilder::new(settings).build_for("demo")?;
//! publisher.perform(&outcome)?;
//! ```

pub mod builder;
pub mod changes;
pub mod channel;
pub mod channels;
pub mod context;
pub mod policy;
pub mod publisher;
pub mod template;

pub use builder::NotificationBuilder;
pub use changes::summarize;
pub use channel::{NotificationChannel, SendResult, Session};
pub use context::{keys, NotificationContext};
pub use policy::should_notify;
pub use publisher::{Publisher, PublisherConfig};
pub use template::{render, DEFAULT_TEMPLATE};
