//! 最终的结构化分析记录

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// 证据等级
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EvidenceLevel {
    High,
    Medium,
    Low,
}

impl EvidenceLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            EvidenceLevel::High => "High",
            EvidenceLevel::Medium => "Medium",
            EvidenceLevel::Low => "Low",
        }
    }

    /// 精确匹配解析，不做大小写或同义词归一
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "High" => Some(EvidenceLevel::High),
            "Medium" => Some(EvidenceLevel::Medium),
            "Low" => Some(EvidenceLevel::Low),
            _ => None,
        }
    }
}

impl fmt::Display for EvidenceLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 单篇文献的综合分析记录
///
/// 所有字段始终存在，未知即为 `None`；使用方不需要探测字段是否存在。
/// `trust_score` 只能是 1..=10 的整数或 `None`，
/// `has_conflict_of_interest` 为三态：披露利益关联为 `Some(true)`，
/// 作者明确声明无冲突为 `Some(false)`，未披露或含糊为 `None`。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaperRecord {
    pub filename: Option<String>,
    pub title: Option<String>,
    pub paper_type: Option<String>,
    pub evidence_level: Option<EvidenceLevel>,

    // 利益冲突
    pub has_conflict_of_interest: Option<bool>,
    pub funding_source: Option<String>,
    pub coi_notes: Option<String>,

    // 方法学
    pub control_group_quality: Option<String>,
    pub intervention_details: Option<String>,
    pub confounding_factors: Option<String>,

    // 统计
    pub primary_outcome: Option<String>,
    pub risk_type_reported: Option<String>,
    pub endpoints: Option<String>,
    pub statistical_significance: Option<String>,

    // 结论
    pub conclusion_summary: Option<String>,
    pub trust_score: Option<u8>,
    pub final_verdict: Option<String>,
}

/// 报告标题的最大字符数
const MAX_TITLE_CHARS: usize = 100;

impl PaperRecord {
    /// 字段名列表，与序列化键一致
    pub const FIELDS: [&'static str; 17] = [
        "filename",
        "title",
        "paper_type",
        "evidence_level",
        "has_conflict_of_interest",
        "funding_source",
        "coi_notes",
        "control_group_quality",
        "intervention_details",
        "confounding_factors",
        "primary_outcome",
        "risk_type_reported",
        "endpoints",
        "statistical_significance",
        "conclusion_summary",
        "trust_score",
        "final_verdict",
    ];

    /// 下游展示用的标题
    ///
    /// 标题非空时截断到 100 个字符；否则用去掉扩展名、首字母大写后的文件名
    /// 生成 `Paper {n} (...)`。`position` 从 1 开始。
    pub fn display_title(&self, position: usize) -> String {
        match self.title.as_deref().map(str::trim) {
            Some(title) if !title.is_empty() => title.chars().take(MAX_TITLE_CHARS).collect(),
            _ => format!(
                "Paper {} ({})",
                position,
                filename_label(self.filename.as_deref().unwrap_or_default())
            ),
        }
    }
}

/// 由文件名生成可读标签
pub fn filename_label(filename: &str) -> String {
    let stem = Path::new(filename)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    if stem.trim().is_empty() {
        return "Untitled Analysis".to_string();
    }
    title_case(&stem)
}

/// 每段连续字母首字母大写，其余小写
fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut prev_is_letter = false;
    for c in s.chars() {
        if c.is_alphabetic() {
            if prev_is_letter {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            prev_is_letter = true;
        } else {
            out.push(c);
            prev_is_letter = false;
        }
    }
    out
}
