//! 日志初始化
//!
//! 嵌入到构建系统中使用时，宿主通常已经安装了自己的 subscriber；
//! 没有时调用 `init()`。日志写到 stderr，级别由 `RUST_LOG` 控制。

use tracing_subscriber::{fmt, EnvFilter};

const DEFAULT_FILTER: &str = "build_notifier=info";

/// 安装 stderr 日志 subscriber，重复调用无副作用
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let _ = fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .try_init();
}
