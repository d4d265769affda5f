//! 截图结果与运行统计

use std::path::PathBuf;

use crate::error::CaptureError;

/// 单个 PR 的截图结果
#[derive(Debug)]
pub enum CaptureOutcome {
    /// 截图已保存
    Success { image_path: PathBuf },
    /// 截图失败
    Failure(CaptureError),
}

/// 截图结果，每个 [`WorkItem`](crate::models::WorkItem) 恰好产生一个
#[derive(Debug)]
pub struct CaptureResult {
    pub identifier: String,
    pub outcome: CaptureOutcome,
}

impl CaptureResult {
    pub fn success(identifier: impl Into<String>, image_path: PathBuf) -> Self {
        Self {
            identifier: identifier.into(),
            outcome: CaptureOutcome::Success { image_path },
        }
    }

    pub fn failure(identifier: impl Into<String>, error: CaptureError) -> Self {
        Self {
            identifier: identifier.into(),
            outcome: CaptureOutcome::Failure(error),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self.outcome, CaptureOutcome::Success { .. })
    }

    pub fn image_path(&self) -> Option<&PathBuf> {
        match &self.outcome {
            CaptureOutcome::Success { image_path } => Some(image_path),
            CaptureOutcome::Failure(_) => None,
        }
    }

    /// 失败原因（给人看的）
    pub fn error_detail(&self) -> Option<String> {
        match &self.outcome {
            CaptureOutcome::Success { .. } => None,
            CaptureOutcome::Failure(e) => Some(e.to_string()),
        }
    }
}

/// 截图运行统计
///
/// 由截图循环逐个累加后返回，不做持久化
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RunStatistics {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    /// (PR 编号, 失败原因)，按处理顺序
    pub failures: Vec<(String, String)>,
}

impl RunStatistics {
    pub fn new(total: usize) -> Self {
        Self {
            total,
            ..Default::default()
        }
    }

    /// 记录一个结果
    pub fn record(&mut self, result: &CaptureResult) {
        match &result.outcome {
            CaptureOutcome::Success { .. } => self.succeeded += 1,
            CaptureOutcome::Failure(e) => {
                self.failed += 1;
                self.failures
                    .push((result.identifier.clone(), e.to_string()));
            }
        }
    }

    pub fn has_successes(&self) -> bool {
        self.succeeded > 0
    }
}
