//! 非致命的质量提示
//!
//! 提示随文献一起上报，但不会让文献失败，也不会修改分析记录。

use serde::Serialize;
use std::fmt;

/// 声明类别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DisclosureSignal {
    /// 披露了资助方或作者的利益关联
    IndustryTies,
    /// 作者明确声明无冲突
    NoConflicts,
    /// 两个章节都不存在
    NotReported,
    /// 章节存在，但无法归入上述类别
    Ambiguous,
}

impl DisclosureSignal {
    /// 按利益冲突映射规则应得到的标记
    pub fn expected_flag(self) -> Option<bool> {
        match self {
            DisclosureSignal::IndustryTies => Some(true),
            DisclosureSignal::NoConflicts => Some(false),
            DisclosureSignal::NotReported | DisclosureSignal::Ambiguous => None,
        }
    }

    /// 记录中的标记是否与声明相矛盾；含糊的声明不做判断
    pub fn contradicts(self, reported: Option<bool>) -> bool {
        match self {
            DisclosureSignal::Ambiguous => false,
            signal => signal.expected_flag() != reported,
        }
    }
}

/// 单篇文献的质量提示
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Advisory {
    /// 未识别出方法部分，方法学与统计评审只能基于占位语
    MissingEvidence,
    /// 正文非空却没有识别出任何章节标题
    SegmentationAnomaly,
    /// 综合记录的利益冲突标记与声明扫描结果不一致
    DisclosureMismatch {
        signal: DisclosureSignal,
        reported: Option<bool>,
    },
}

impl fmt::Display for Advisory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Advisory::MissingEvidence => write!(f, "未识别到方法部分，评审结果可能不可靠"),
            Advisory::SegmentationAnomaly => write!(f, "未识别到任何章节标题"),
            Advisory::DisclosureMismatch { signal, reported } => write!(
                f,
                "利益冲突标记 {:?} 与声明扫描结果 {:?} 不一致",
                reported, signal
            ),
        }
    }
}

/// 带文献标识的提示
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocumentAdvisory {
    pub filename: String,
    #[serde(flatten)]
    pub advisory: Advisory,
}
