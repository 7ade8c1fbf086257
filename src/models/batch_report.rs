//! 批次汇总结果

use serde::Serialize;
use std::fmt;

use crate::error::PipelineError;
use crate::models::advisory::DocumentAdvisory;
use crate::models::paper_record::PaperRecord;

/// 失败原因的最大字符数
pub const MAX_REASON_CHARS: usize = 300;

/// 失败类别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// 阶段调用重试耗尽
    StageInvocation,
    /// 综合结果不符合记录结构
    SchemaValidation,
    /// 流程前置条件被破坏
    Context,
    /// 被取消（包括尚未开始就被取消）
    Cancelled,
    /// 任务异常退出
    Aborted,
}

impl From<&PipelineError> for FailureKind {
    fn from(err: &PipelineError) -> Self {
        if err.is_cancelled() {
            return FailureKind::Cancelled;
        }
        match err {
            PipelineError::StageInvocation { .. } => FailureKind::StageInvocation,
            PipelineError::SchemaValidation { .. } => FailureKind::SchemaValidation,
            PipelineError::Context(_) => FailureKind::Context,
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FailureKind::StageInvocation => "阶段调用失败",
            FailureKind::SchemaValidation => "结构校验失败",
            FailureKind::Context => "流程错误",
            FailureKind::Cancelled => "已取消",
            FailureKind::Aborted => "任务异常",
        };
        f.write_str(name)
    }
}

/// 单篇文献的失败记录
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocumentFailure {
    pub filename: String,
    pub kind: FailureKind,
    /// 人类可读的原因，截断到 300 个字符
    pub reason: String,
}

/// 一次批次运行的结果
///
/// `successes` 与 `failures` 都保持输入顺序，与完成顺序无关。
#[derive(Debug, Default, Serialize)]
pub struct BatchReport {
    pub successes: Vec<PaperRecord>,
    pub failures: Vec<DocumentFailure>,
    pub advisories: Vec<DocumentAdvisory>,
}

impl BatchReport {
    pub fn total(&self) -> usize {
        self.successes.len() + self.failures.len()
    }
}
