//! 变更摘要 - 从构建的变更历史中提取一行可读的最近变更描述

use crate::outcome::{BuildOutcome, ChangeEntry, ChangeOrdering, ChangeSet};
use tracing::debug;

/// 变更集尚未计算
pub const CHANGES_NOT_DETERMINED: &str = "Changes not determined";
/// 没有变更（或最近变更的提交信息为空）
pub const NO_CHANGES: &str = "No changes";

/// 提交信息超过该长度时截断
const MAX_MESSAGE_CHARS: usize = 47;
/// 截断后保留的字符数（之后追加省略号）
const TRUNCATED_CHARS: usize = 46;
const ELLIPSIS: &str = "...";

/// 生成 `"{message} - {author}"` 形式的变更摘要
pub fn summarize(outcome: &BuildOutcome) -> String {
    let (entries, ordering) = match &outcome.changes {
        ChangeSet::NotComputed => return CHANGES_NOT_DETERMINED.to_string(),
        ChangeSet::Computed { entries, ordering } => (entries, *ordering),
    };

    let Some(first) = entries.first() else {
        return NO_CHANGES.to_string();
    };

    let entry = match ordering {
        ChangeOrdering::NewestFirst => first,
        ChangeOrdering::OldestFirst => reversed_log::latest_entry(outcome, entries).unwrap_or(first),
    };

    describe(entry)
}

fn describe(entry: &ChangeEntry) -> String {
    let message = entry.message.trim();
    if message.is_empty() {
        return NO_CHANGES.to_string();
    }

    debug!(author = %entry.author, commit = ?entry.commit_id, "Summarizing change");
    format!("{} - {}", truncate_message(message), entry.author)
}

fn truncate_message(message: &str) -> String {
    if message.chars().count() > MAX_MESSAGE_CHARS {
        let head: String = message.chars().take(TRUNCATED_CHARS).collect();
        format!("{}{}", head, ELLIPSIS)
    } else {
        message.to_string()
    }
}

/// 反序变更日志的补救路径
///
/// 某些 VCS 集成返回最旧在前的条目。此时从构建目录的变更日志旁路文件中
/// 读取第一条 `commit <hash>`，再按 commit ID 找到对应条目。
/// 任何失败都返回 None，由调用方回退到第一条。
mod reversed_log {
    use super::*;
    use regex::Regex;
    use std::fs::File;
    use std::io::{self, BufRead, BufReader};
    use std::path::Path;
    use std::sync::LazyLock;
    use tracing::warn;

    static COMMIT_LINE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"^commit ([a-zA-Z0-9]+)$").unwrap());

    pub(super) fn latest_entry<'a>(
        outcome: &BuildOutcome,
        entries: &'a [ChangeEntry],
    ) -> Option<&'a ChangeEntry> {
        let Some(path) = outcome.changelog_path.as_deref() else {
            debug!(project = %outcome.project_name, "No changelog side file for reversed change set");
            return None;
        };

        let sha = match first_commit_hash(path) {
            Ok(Some(sha)) => sha,
            Ok(None) => {
                debug!(path = %path.display(), "No commit line in changelog");
                return None;
            }
            Err(e) => {
                warn!(
                    path = %path.display(),
                    error = %e,
                    "Workaround to obtain latest commit info from changelog failed"
                );
                return None;
            }
        };

        let found = entries
            .iter()
            .find(|entry| entry.commit_id.as_deref() == Some(sha.as_str()));
        if found.is_none() {
            debug!(sha = %sha, "Changelog commit not present in change set");
        }
        found
    }

    /// 读取第一条匹配 `^commit <hash>$` 的行
    ///
    /// 按字节读取，非 UTF-8 内容（提交信息里的旧编码）按 lossy 处理，不中断扫描。
    pub(super) fn first_commit_hash(path: &Path) -> io::Result<Option<String>> {
        let mut reader = BufReader::new(File::open(path)?);
        let mut buf = Vec::new();
        loop {
            buf.clear();
            if reader.read_until(b'\n', &mut buf)? == 0 {
                return Ok(None);
            }
            let line = String::from_utf8_lossy(&buf);
            let line = line.trim_end_matches(['\r', '\n']);
            if let Some(caps) = COMMIT_LINE.captures(line) {
                return Ok(Some(caps[1].to_string()));
            }
        }
    }
}
