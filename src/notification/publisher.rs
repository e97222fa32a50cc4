//! 通知发布器 - 组合决策、上下文、模板渲染并交给渠道投递

use super::channel::{NotificationChannel, SendResult, Session};
use super::context::NotificationContext;
use super::policy::should_notify;
use super::template::{is_blank, DEFAULT_TEMPLATE};
use crate::error::{NotifierError, Result};
use crate::outcome::BuildOutcome;
use std::sync::{Arc, Mutex};
use tracing::{debug, info, warn};

/// 发布器配置
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublisherConfig {
    /// 消息模板
    pub template: String,
    /// 构建服务器地址（以 `/` 结尾），用于 `BUILD_URL`
    pub base_url: Option<String>,
    /// 是否启用 smart notify
    pub smart_notify: bool,
}

impl Default for PublisherConfig {
    fn default() -> Self {
        Self {
            template: DEFAULT_TEMPLATE.to_string(),
            base_url: None,
            smart_notify: false,
        }
    }
}

/// 会话状态
#[derive(Debug)]
enum SessionState {
    Unresolved,
    Ready(Session),
    /// 配置性解析失败（如房间不存在），重新配置前不再尝试
    Failed(String),
}

/// 通知发布器，每个项目一个实例
pub struct Publisher {
    channel: Arc<dyn NotificationChannel>,
    config: PublisherConfig,
    session: Mutex<SessionState>,
    dry_run: bool,
}

impl Publisher {
    pub fn new(channel: Arc<dyn NotificationChannel>, config: PublisherConfig) -> Self {
        Self {
            channel,
            config,
            session: Mutex::new(SessionState::Unresolved),
            dry_run: false,
        }
    }

    /// 设置 dry-run 模式
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn config(&self) -> &PublisherConfig {
        &self.config
    }

    pub fn channel_name(&self) -> &str {
        self.channel.name()
    }

    /// 构建完成后调用
    ///
    /// 被 smart notify 抑制的构建直接跳过，不解析会话。
    pub fn perform(&self, outcome: &BuildOutcome) -> Result<SendResult> {
        if !should_notify(outcome, self.config.smart_notify) {
            debug!(
                project = %outcome.project_name,
                build = %outcome.display_name,
                "Smart notify: consecutive success suppressed"
            );
            return Ok(SendResult::Skipped("smart notify".to_string()));
        }

        let session = self.ensure_session()?;

        if is_blank(&self.config.template) {
            debug!(project = %outcome.project_name, "Empty notification template, skipping");
            return Ok(SendResult::Skipped("empty template".to_string()));
        }

        let message = self.render(outcome);

        if self.dry_run {
            eprintln!("[DRY-RUN] Would send to {} ({}): {}", self.channel.name(), session.label, message);
            return Ok(SendResult::Skipped("dry-run".to_string()));
        }

        self.channel.deliver(&session, outcome, &message)?;
        info!(
            channel = %self.channel.name(),
            target = %session.label,
            project = %outcome.project_name,
            build = %outcome.display_name,
            result = %outcome.result,
            "Build notification sent"
        );
        Ok(SendResult::Sent)
    }

    /// 渲染本次构建的消息（不做决策、不投递）
    pub fn render(&self, outcome: &BuildOutcome) -> String {
        NotificationContext::build(outcome, self.config.base_url.as_deref(), self.config.smart_notify)
            .render(&self.config.template)
    }

    /// 清除会话（包括缓存的解析失败），下次发布时重新解析
    pub fn reset_session(&self) {
        *self.lock_session() = SessionState::Unresolved;
    }

    fn ensure_session(&self) -> Result<Session> {
        let mut state = self.lock_session();

        match &*state {
            SessionState::Ready(session) => return Ok(session.clone()),
            SessionState::Failed(reason) => return Err(NotifierError::config(reason.clone())),
            SessionState::Unresolved => {}
        }

        match self.channel.resolve_session() {
            Ok(session) => {
                info!(channel = %self.channel.name(), target = %session.label, "Session resolved");
                *state = SessionState::Ready(session.clone());
                Ok(session)
            }
            Err(NotifierError::Configuration(reason)) => {
                warn!(channel = %self.channel.name(), error = %reason, "Session resolution failed");
                *state = SessionState::Failed(reason.clone());
                Err(NotifierError::Configuration(reason))
            }
            // 传输错误或服务暂时不可用：保持未解析，下次发布重试
            Err(e) => {
                warn!(channel = %self.channel.name(), error = %e, "Session resolution failed, will retry");
                Err(e)
            }
        }
    }

    fn lock_session(&self) -> std::sync::MutexGuard<'_, SessionState> {
        // poison 后状态仍然有效
        self.session.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::outcome::{BuildResult, ChangeEntry, ChangeSet};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::thread;
    use std::time::Duration;

    /// 测试用的 mock 渠道
    struct MockChannel {
        resolve_count: AtomicUsize,
        sent: Mutex<Vec<String>>,
        room_exists: bool,
        fail_delivery: bool,
        /// 前 N 次解析返回传输错误
        transient_failures: AtomicUsize,
        resolve_delay: Option<Duration>,
    }

    impl MockChannel {
        fn new() -> Self {
            Self {
                resolve_count: AtomicUsize::new(0),
                sent: Mutex::new(Vec::new()),
                room_exists: true,
                fail_delivery: false,
                transient_failures: AtomicUsize::new(0),
                resolve_delay: None,
            }
        }

        fn sent(&self) -> Vec<String> {
            self.sent.lock().unwrap().clone()
        }
    }

    impl NotificationChannel for MockChannel {
        fn name(&self) -> &str {
            "mock"
        }

        fn resolve_session(&self) -> Result<Session> {
            self.resolve_count.fetch_add(1, Ordering::SeqCst);
            if let Some(delay) = self.resolve_delay {
                thread::sleep(delay);
            }
            let pending = self.transient_failures.load(Ordering::SeqCst);
            if pending > 0 {
                self.transient_failures.store(pending - 1, Ordering::SeqCst);
                return Err(NotifierError::delivery("mock", "HTTP 503: unavailable"));
            }
            if self.room_exists {
                Ok(Session::new("1", "Ops"))
            } else {
                Err(NotifierError::config("Room 'Ops' not found"))
            }
        }

        fn deliver(&self, _session: &Session, _outcome: &BuildOutcome, message: &str) -> Result<()> {
            if self.fail_delivery {
                return Err(NotifierError::delivery("mock", "HTTP 500"));
            }
            self.sent.lock().unwrap().push(message.to_string());
            Ok(())
        }
    }

    fn failure_build() -> BuildOutcome {
        BuildOutcome::new("demo", "#42", BuildResult::Failure)
            .with_url("job/demo/42/")
            .with_changes(ChangeSet::newest_first(vec![ChangeEntry::new("fix bug", "al")]))
    }

    fn config(smart_notify: bool) -> PublisherConfig {
        PublisherConfig {
            template: DEFAULT_TEMPLATE.to_string(),
            base_url: Some("http://ci/".to_string()),
            smart_notify,
        }
    }

    #[test]
    fn test_perform_sends_rendered_message() {
        let channel = Arc::new(MockChannel::new());
        let publisher = Publisher::new(channel.clone(), config(true));

        let result = publisher.perform(&failure_build()).unwrap();

        assert_eq!(result, SendResult::Sent);
        assert_eq!(
            channel.sent(),
            vec!["demo #42 (fix bug - al): FAILURE (http://ci/job/demo/42/)".to_string()]
        );
    }

    #[test]
    fn test_session_resolved_once() {
        let channel = Arc::new(MockChannel::new());
        let publisher = Publisher::new(channel.clone(), config(false));

        publisher.perform(&failure_build()).unwrap();
        publisher.perform(&failure_build()).unwrap();

        assert_eq!(channel.resolve_count.load(Ordering::SeqCst), 1);
        assert_eq!(channel.sent().len(), 2);
    }

    #[test]
    fn test_session_failure_is_cached_until_reset() {
        let channel = Arc::new(MockChannel {
            room_exists: false,
            ..MockChannel::new()
        });
        let publisher = Publisher::new(channel.clone(), config(false));

        let err = publisher.perform(&failure_build()).unwrap_err();
        assert!(err.is_configuration());
        let err = publisher.perform(&failure_build()).unwrap_err();
        assert!(err.to_string().contains("Room 'Ops' not found"));
        assert_eq!(channel.resolve_count.load(Ordering::SeqCst), 1);

        publisher.reset_session();
        assert!(publisher.perform(&failure_build()).is_err());
        assert_eq!(channel.resolve_count.load(Ordering::SeqCst), 2);
        assert!(channel.sent().is_empty());
    }

    #[test]
    fn test_transient_resolution_failure_is_retried() {
        let channel = Arc::new(MockChannel {
            transient_failures: AtomicUsize::new(1),
            ..MockChannel::new()
        });
        let publisher = Publisher::new(channel.clone(), config(false));

        let err = publisher.perform(&failure_build()).unwrap_err();
        assert!(matches!(err, NotifierError::Delivery { .. }));
        assert!(err.to_string().contains("503"));

        assert_eq!(publisher.perform(&failure_build()).unwrap(), SendResult::Sent);
        assert_eq!(channel.resolve_count.load(Ordering::SeqCst), 2);
        assert_eq!(channel.sent().len(), 1);
    }

    #[test]
    fn test_suppressed_build_skips_session_resolution() {
        let channel = Arc::new(MockChannel {
            room_exists: false,
            ..MockChannel::new()
        });
        let publisher = Publisher::new(channel.clone(), config(true));
        let build = BuildOutcome::new("demo", "#43", BuildResult::Success)
            .with_previous(BuildOutcome::new("demo", "#42", BuildResult::Success));

        let result = publisher.perform(&build).unwrap();
        assert_eq!(result, SendResult::Skipped("smart notify".to_string()));
        assert_eq!(channel.resolve_count.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_concurrent_perform_resolves_session_once() {
        let channel = Arc::new(MockChannel {
            resolve_delay: Some(Duration::from_millis(50)),
            ..MockChannel::new()
        });
        let publisher = Publisher::new(channel.clone(), config(false));
        let build = failure_build();

        thread::scope(|scope| {
            for _ in 0..8 {
                scope.spawn(|| {
                    assert_eq!(publisher.perform(&build).unwrap(), SendResult::Sent);
                });
            }
        });

        assert_eq!(channel.resolve_count.load(Ordering::SeqCst), 1);
        assert_eq!(channel.sent().len(), 8);
    }

    #[test]
    fn test_blank_template_is_skipped() {
        let channel = Arc::new(MockChannel::new());
        let publisher = Publisher::new(
            channel.clone(),
            PublisherConfig {
                template: "   ".to_string(),
                ..config(false)
            },
        );

        let result = publisher.perform(&failure_build()).unwrap();
        assert_eq!(result, SendResult::Skipped("empty template".to_string()));
        assert!(channel.sent().is_empty());
        // 会话仍然先被解析
        assert_eq!(channel.resolve_count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_smart_notify_suppresses_consecutive_success() {
        let channel = Arc::new(MockChannel::new());
        let publisher = Publisher::new(channel.clone(), config(true));
        let build = BuildOutcome::new("demo", "#43", BuildResult::Success)
            .with_previous(BuildOutcome::new("demo", "#42", BuildResult::Success));

        let result = publisher.perform(&build).unwrap();
        assert_eq!(result, SendResult::Skipped("smart notify".to_string()));
        assert!(channel.sent().is_empty());
    }

    #[test]
    fn test_delivery_error_propagates() {
        let channel = Arc::new(MockChannel {
            fail_delivery: true,
            ..MockChannel::new()
        });
        let publisher = Publisher::new(channel, config(false));

        let err = publisher.perform(&failure_build()).unwrap_err();
        assert!(matches!(err, NotifierError::Delivery { .. }));
    }

    #[test]
    fn test_dry_run_does_not_deliver() {
        let channel = Arc::new(MockChannel::new());
        let publisher = Publisher::new(channel.clone(), config(false)).with_dry_run(true);

        let result = publisher.perform(&failure_build()).unwrap();
        assert_eq!(result, SendResult::Skipped("dry-run".to_string()));
        assert!(channel.sent().is_empty());
    }

    #[test]
    fn test_render_lowercases_success_without_smart_notify() {
        let publisher = Publisher::new(Arc::new(MockChannel::new()), config(false));
        let build = BuildOutcome::new("demo", "#44", BuildResult::Success).with_url("job/demo/44/");
        assert_eq!(
            publisher.render(&build),
            "demo #44 (No changes): success (http://ci/job/demo/44/)"
        );
    }
}
