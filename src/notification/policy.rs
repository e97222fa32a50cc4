//! Smart notify 决策
//!
//! 启用 smart notify 时，只在以下情况通知：
//! 1. 没有上一次构建
//! 2. 本次构建未成功
//! 3. 上一次构建未成功（恢复）
//!
//! 连续成功不再重复通知。

use crate::outcome::BuildOutcome;

/// 是否应该通知本次构建
pub fn should_notify(current: &BuildOutcome, smart_notify: bool) -> bool {
    if !smart_notify {
        return true;
    }

    match current.previous_result() {
        None => true,
        Some(previous) => !current.result.is_success() || !previous.is_success(),
    }
}
