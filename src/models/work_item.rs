//! PR 工作项

use std::fmt::Display;

/// 待截图的 PR
///
/// 由 CSV 加载时创建，之后不再修改
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkItem {
    /// PR 编号（纯数字）
    pub identifier: String,
    /// 原始 CSV 行（字段以逗号重新拼接）
    pub raw_record: String,
}

impl WorkItem {
    pub fn new(identifier: impl Into<String>, raw_record: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            raw_record: raw_record.into(),
        }
    }
}

impl Display for WorkItem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "PR #{}", self.identifier)
    }
}
