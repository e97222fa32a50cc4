//! `%KEY%` 模板插值
//!
//! 规则：
//! - `%KEY%`（去除空白后非空）替换为变量值，变量不存在时替换为空串
//! - `%%` 或只有空白的 key 输出一个字面 `%`
//! - 没有闭合的 `%` 原样输出，从它之后继续扫描
//!
//! 不提供转义，也不会失败。

use std::collections::HashMap;

/// 默认通知模板
pub const DEFAULT_TEMPLATE: &str =
    "%PROJECT_NAME% %BUILD_DISPLAY_NAME% (%CHANGES%): %SMART_RESULT% (%BUILD_URL%)";

const MARKER: char = '%';

/// 渲染模板
pub fn render(template: &str, vars: &HashMap<String, String>) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find(MARKER) {
        out.push_str(&rest[..start]);
        let after = &rest[start + 1..];

        match after.find(MARKER) {
            Some(end) => {
                let key = after[..end].trim();
                if key.is_empty() {
                    out.push(MARKER);
                } else if let Some(value) = vars.get(key) {
                    out.push_str(value);
                }
                rest = &after[end + 1..];
            }
            None => {
                out.push(MARKER);
                rest = after;
            }
        }
    }

    out.push_str(rest);
    out
}

/// 模板是否为空（只有空白也算空）
pub fn is_blank(template: &str) -> bool {
    template.trim().is_empty()
}
