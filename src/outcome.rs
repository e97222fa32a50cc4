//! 构建结果快照 - 由构建系统在构建完成后提供的只读视图

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// 构建目录中变更日志旁路文件的默认名称
pub const CHANGELOG_FILE_NAME: &str = "changelog.xml";

/// 构建结果
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BuildResult {
    Success,
    Failure,
    Unstable,
    Aborted,
    NotBuilt,
}

impl BuildResult {
    pub fn as_str(&self) -> &'static str {
        match self {
            BuildResult::Success => "SUCCESS",
            BuildResult::Failure => "FAILURE",
            BuildResult::Unstable => "UNSTABLE",
            BuildResult::Aborted => "ABORTED",
            BuildResult::NotBuilt => "NOT_BUILT",
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, BuildResult::Success)
    }
}

impl fmt::Display for BuildResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// 单条版本控制变更
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeEntry {
    /// 提交信息（可能为空）
    #[serde(default)]
    pub message: String,
    /// 作者
    #[serde(default)]
    pub author: String,
    /// 提交 ID（非分布式 VCS 没有）
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub commit_id: Option<String>,
}

impl ChangeEntry {
    pub fn new(message: impl Into<String>, author: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            author: author.into(),
            commit_id: None,
        }
    }

    pub fn with_commit_id(mut self, commit_id: impl Into<String>) -> Self {
        self.commit_id = Some(commit_id.into());
        self
    }
}

/// 变更列表的排列顺序
///
/// 部分上游 VCS 集成会把日志反转（最旧的在前），由构造 `BuildOutcome`
/// 的适配器显式标记。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeOrdering {
    #[default]
    NewestFirst,
    OldestFirst,
}

/// 构建的变更集
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ChangeSet {
    /// 构建系统尚未计算变更集
    NotComputed,
    /// 已计算（可能为空）
    Computed {
        #[serde(default)]
        entries: Vec<ChangeEntry>,
        #[serde(default)]
        ordering: ChangeOrdering,
    },
}

impl ChangeSet {
    pub fn empty() -> Self {
        ChangeSet::Computed {
            entries: Vec::new(),
            ordering: ChangeOrdering::NewestFirst,
        }
    }

    pub fn newest_first(entries: Vec<ChangeEntry>) -> Self {
        ChangeSet::Computed {
            entries,
            ordering: ChangeOrdering::NewestFirst,
        }
    }

    pub fn oldest_first(entries: Vec<ChangeEntry>) -> Self {
        ChangeSet::Computed {
            entries,
            ordering: ChangeOrdering::OldestFirst,
        }
    }
}

impl Default for ChangeSet {
    fn default() -> Self {
        Self::empty()
    }
}

/// 已完成构建的不可变快照
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildOutcome {
    pub result: BuildResult,
    /// 构建显示名（如 `#42`）
    pub display_name: String,
    /// 相对 URL（如 `job/demo/42/`）
    #[serde(default)]
    pub url: String,
    pub project_name: String,
    #[serde(default)]
    pub project_display_name: String,
    #[serde(default)]
    pub project_full_name: String,
    #[serde(default)]
    pub project_full_display_name: String,
    /// 上一次已完成构建（首次构建为 None）
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous: Option<Box<BuildOutcome>>,
    #[serde(default)]
    pub changes: ChangeSet,
    /// 变更日志旁路文件路径
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub changelog_path: Option<PathBuf>,
}

impl BuildOutcome {
    /// 创建快照，项目的各种显示名默认与 `project_name` 相同
    pub fn new(
        project_name: impl Into<String>,
        display_name: impl Into<String>,
        result: BuildResult,
    ) -> Self {
        let project_name = project_name.into();
        Self {
            result,
            display_name: display_name.into(),
            url: String::new(),
            project_display_name: project_name.clone(),
            project_full_name: project_name.clone(),
            project_full_display_name: project_name.clone(),
            project_name,
            previous: None,
            changes: ChangeSet::default(),
            changelog_path: None,
        }
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    pub fn with_project_names(
        mut self,
        display_name: impl Into<String>,
        full_name: impl Into<String>,
        full_display_name: impl Into<String>,
    ) -> Self {
        self.project_display_name = display_name.into();
        self.project_full_name = full_name.into();
        self.project_full_display_name = full_display_name.into();
        self
    }

    pub fn with_previous(mut self, previous: BuildOutcome) -> Self {
        self.previous = Some(Box::new(previous));
        self
    }

    pub fn with_changes(mut self, changes: ChangeSet) -> Self {
        self.changes = changes;
        self
    }

    pub fn with_changelog_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.changelog_path = Some(path.into());
        self
    }

    /// 使用构建目录下的 `changelog.xml` 作为旁路文件
    pub fn with_build_dir(self, build_dir: impl AsRef<Path>) -> Self {
        let path = build_dir.as_ref().join(CHANGELOG_FILE_NAME);
        self.with_changelog_path(path)
    }

    /// 上一次构建的结果
    pub fn previous_result(&self) -> Option<BuildResult> {
        self.previous.as_ref().map(|p| p.result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_result_display() {
        assert_eq!(BuildResult::Success.to_string(), "SUCCESS");
        assert_eq!(BuildResult::NotBuilt.to_string(), "NOT_BUILT");
        assert_eq!(format!("{}", BuildResult::Unstable), "UNSTABLE");
    }

    #[test]
    fn test_outcome_defaults_project_names() {
        let outcome = BuildOutcome::new("demo", "#1", BuildResult::Success);
        assert_eq!(outcome.project_display_name, "demo");
        assert_eq!(outcome.project_full_name, "demo");
        assert_eq!(outcome.project_full_display_name, "demo");
        assert!(outcome.previous_result().is_none());
    }

    #[test]
    fn test_with_build_dir_points_at_changelog() {
        let outcome = BuildOutcome::new("demo", "#1", BuildResult::Success)
            .with_build_dir("/var/builds/demo/1");
        assert_eq!(
            outcome.changelog_path,
            Some(PathBuf::from("/var/builds/demo/1/changelog.xml"))
        );
    }

    #[test]
    fn test_outcome_from_json() {
        let json = serde_json::json!({
            "result": "FAILURE",
            "display_name": "#7",
            "url": "job/demo/7/",
            "project_name": "demo",
            "previous": {
                "result": "SUCCESS",
                "display_name": "#6",
                "project_name": "demo"
            },
            "changes": {
                "state": "computed",
                "entries": [{"message": "fix", "author": "al", "commit_id": "abc123"}],
                "ordering": "oldest_first"
            }
        });

        let outcome: BuildOutcome = serde_json::from_value(json).unwrap();
        assert_eq!(outcome.result, BuildResult::Failure);
        assert_eq!(outcome.previous_result(), Some(BuildResult::Success));
        match outcome.changes {
            ChangeSet::Computed { entries, ordering } => {
                assert_eq!(entries.len(), 1);
                assert_eq!(entries[0].commit_id.as_deref(), Some("abc123"));
                assert_eq!(ordering, ChangeOrdering::OldestFirst);
            }
            ChangeSet::NotComputed => panic!("expected computed change set"),
        }
    }

    #[test]
    fn test_change_set_not_computed_from_json() {
        let changes: ChangeSet = serde_json::from_str(r#"{"state": "not_computed"}"#).unwrap();
        assert_eq!(changes, ChangeSet::NotComputed);
    }
}
