//! 分析阶段定义
//!
//! 固定的阶段链：
//!
//! ```text
//! Title ──────────────────────────────────────────────┐
//! Classification ─┬─> Triage ─────────────────────────┤
//!                 └─> Methodology ──> Statistics ─────┴─> Synthesis
//! ```
//!
//! Methodology 依赖 Classification（而非 Triage），方法学评审只需要研究类型。

use serde::Serialize;
use std::fmt;

use crate::infrastructure::resilience::StageCriticality;
use crate::models::paper_record::PaperRecord;
use crate::models::section::SectionSet;

/// 阶段标识
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StageId {
    Title,
    Classification,
    Triage,
    Methodology,
    Statistics,
    Synthesis,
}

impl StageId {
    pub fn name(self) -> &'static str {
        match self {
            StageId::Title => "title",
            StageId::Classification => "classification",
            StageId::Triage => "triage",
            StageId::Methodology => "methodology",
            StageId::Statistics => "statistics",
            StageId::Synthesis => "synthesis",
        }
    }

    /// 作为前序报告传给后续阶段时的标题
    pub fn report_label(self) -> &'static str {
        match self {
            StageId::Title => "Title Extractor report",
            StageId::Classification => "Study Taxonomist report",
            StageId::Triage => "Nutrition Metadata Specialist report",
            StageId::Methodology => "Experimental Design Critic report",
            StageId::Statistics => "Statistical Auditor report",
            StageId::Synthesis => "Lead Principal Investigator synthesis",
        }
    }
}

impl fmt::Display for StageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// 阶段输出类型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputKind {
    FreeText,
    Structured,
}

/// 阶段定义
#[derive(Debug, Clone, Copy)]
pub struct StageDefinition {
    pub id: StageId,
    /// 声明的依赖；阶段只能读取这些阶段的结果
    pub dependencies: &'static [StageId],
    pub output: OutputKind,
    pub criticality: StageCriticality,
    /// 从章节集合中取出本阶段关心的文本，缺失的章节以占位语替代
    pub input_builder: fn(&SectionSet) -> String,
}

impl StageDefinition {
    pub fn depends_on(&self, id: StageId) -> bool {
        self.dependencies.contains(&id)
    }
}

/// 按执行顺序排列的阶段链
pub static STAGE_CHAIN: [StageDefinition; 6] = [
    StageDefinition {
        id: StageId::Title,
        dependencies: &[],
        output: OutputKind::FreeText,
        criticality: StageCriticality::Standard,
        input_builder: title_input,
    },
    StageDefinition {
        id: StageId::Classification,
        dependencies: &[],
        output: OutputKind::FreeText,
        criticality: StageCriticality::Standard,
        input_builder: classification_input,
    },
    StageDefinition {
        id: StageId::Triage,
        dependencies: &[StageId::Classification],
        output: OutputKind::FreeText,
        criticality: StageCriticality::Standard,
        input_builder: triage_input,
    },
    StageDefinition {
        id: StageId::Methodology,
        dependencies: &[StageId::Classification],
        output: OutputKind::FreeText,
        criticality: StageCriticality::Standard,
        input_builder: methodology_input,
    },
    StageDefinition {
        id: StageId::Statistics,
        dependencies: &[StageId::Methodology],
        output: OutputKind::FreeText,
        criticality: StageCriticality::Standard,
        input_builder: statistics_input,
    },
    StageDefinition {
        id: StageId::Synthesis,
        dependencies: &[
            StageId::Title,
            StageId::Classification,
            StageId::Triage,
            StageId::Methodology,
            StageId::Statistics,
        ],
        output: OutputKind::Structured,
        criticality: StageCriticality::Critical,
        input_builder: synthesis_input,
    },
];

/// 检查阶段链中每个依赖都出现在使用者之前，且没有重复阶段
pub fn is_topologically_ordered(chain: &[StageDefinition]) -> bool {
    chain.iter().enumerate().all(|(i, stage)| {
        let earlier = &chain[..i];
        !earlier.iter().any(|e| e.id == stage.id)
            && stage
                .dependencies
                .iter()
                .all(|dep| earlier.iter().any(|e| e.id == *dep))
    })
}

/// 阶段结果内容
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StagePayload {
    Text(String),
    Structured(Box<PaperRecord>),
}

impl StagePayload {
    /// 作为前序报告传递时的文本形式
    pub fn as_report_text(&self) -> String {
        match self {
            StagePayload::Text(text) => text.clone(),
            StagePayload::Structured(record) => {
                serde_json::to_string_pretty(record).unwrap_or_default()
            }
        }
    }
}

/// 一个阶段的完成结果，写入后不再修改
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageResult {
    pub document_id: String,
    pub stage_id: StageId,
    pub payload: StagePayload,
}

// ========== 章节占位语 ==========

pub const TITLE_NOT_FOUND: &str = "TITLE NOT FOUND";
pub const ABSTRACT_NOT_REPORTED: &str = "ABSTRACT NOT REPORTED";
pub const METHODS_NOT_REPORTED: &str = "METHODS NOT REPORTED";
pub const RESULTS_NOT_REPORTED: &str = "RESULTS NOT REPORTED";
pub const FUNDING_NOT_REPORTED: &str = "FUNDING STATEMENT NOT REPORTED";
pub const COI_NOT_REPORTED: &str = "CONFLICT OF INTEREST STATEMENT NOT REPORTED";

/// 分类阶段使用的方法部分长度
const METHODS_PREVIEW_CHARS: usize = 2000;

fn or_sentinel<'a>(text: Option<&'a str>, sentinel: &'a str) -> &'a str {
    match text {
        Some(t) if !t.trim().is_empty() => t,
        _ => sentinel,
    }
}

fn title_input(sections: &SectionSet) -> String {
    or_sentinel(sections.title.as_deref(), TITLE_NOT_FOUND).to_string()
}

fn classification_input(sections: &SectionSet) -> String {
    let methods_start = match sections.methods.as_deref() {
        Some(methods) if !methods.trim().is_empty() => {
            methods.chars().take(METHODS_PREVIEW_CHARS).collect()
        }
        _ => METHODS_NOT_REPORTED.to_string(),
    };
    format!(
        "TITLE: {}\n\nABSTRACT: {}\n\nMETHODS START: {}",
        or_sentinel(sections.title.as_deref(), TITLE_NOT_FOUND),
        or_sentinel(sections.r#abstract.as_deref(), ABSTRACT_NOT_REPORTED),
        methods_start
    )
}

fn triage_input(sections: &SectionSet) -> String {
    [
        or_sentinel(sections.r#abstract.as_deref(), ABSTRACT_NOT_REPORTED),
        or_sentinel(sections.funding.as_deref(), FUNDING_NOT_REPORTED),
        or_sentinel(sections.conflicts_of_interest.as_deref(), COI_NOT_REPORTED),
    ]
    .join("\n\n")
}

fn methodology_input(sections: &SectionSet) -> String {
    or_sentinel(sections.methods.as_deref(), METHODS_NOT_REPORTED).to_string()
}

fn statistics_input(sections: &SectionSet) -> String {
    [
        or_sentinel(sections.methods.as_deref(), METHODS_NOT_REPORTED),
        or_sentinel(sections.results.as_deref(), RESULTS_NOT_REPORTED),
    ]
    .join("\n\n")
}

/// 综合阶段不直接读取章节，只消费前序报告
fn synthesis_input(_sections: &SectionSet) -> String {
    String::new()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stage(id: StageId) -> &'static StageDefinition {
        STAGE_CHAIN.iter().find(|s| s.id == id).unwrap()
    }

    #[test]
    fn test_chain_is_topologically_ordered() {
        assert!(is_topologically_ordered(&STAGE_CHAIN));
        let ids: Vec<StageId> = STAGE_CHAIN.iter().map(|s| s.id).collect();
        assert_eq!(
            ids,
            vec![
                StageId::Title,
                StageId::Classification,
                StageId::Triage,
                StageId::Methodology,
                StageId::Statistics,
                StageId::Synthesis
            ]
        );
    }

    #[test]
    fn test_reordered_chain_is_rejected() {
        let mut chain = STAGE_CHAIN.to_vec();
        chain.swap(3, 4); // Statistics 排到 Methodology 之前
        assert!(!is_topologically_ordered(&chain));

        let duplicated = vec![STAGE_CHAIN[0], STAGE_CHAIN[0]];
        assert!(!is_topologically_ordered(&duplicated));
    }

    #[test]
    fn test_declared_dependencies() {
        assert!(stage(StageId::Title).dependencies.is_empty());
        assert!(stage(StageId::Classification).dependencies.is_empty());
        assert_eq!(stage(StageId::Triage).dependencies, &[StageId::Classification]);
        assert_eq!(stage(StageId::Methodology).dependencies, &[StageId::Classification]);
        assert_eq!(stage(StageId::Statistics).dependencies, &[StageId::Methodology]);
        assert_eq!(stage(StageId::Synthesis).dependencies.len(), 5);
        assert_eq!(stage(StageId::Synthesis).output, OutputKind::Structured);
        assert_eq!(stage(StageId::Synthesis).criticality, StageCriticality::Critical);
    }

    #[test]
    fn test_missing_sections_become_sentinels() {
        let empty = SectionSet::default();
        assert_eq!((stage(StageId::Title).input_builder)(&empty), TITLE_NOT_FOUND);
        assert_eq!(
            (stage(StageId::Methodology).input_builder)(&empty),
            METHODS_NOT_REPORTED
        );
        let triage = (stage(StageId::Triage).input_builder)(&empty);
        assert!(triage.contains(ABSTRACT_NOT_REPORTED));
        assert!(triage.contains(FUNDING_NOT_REPORTED));
        assert!(triage.contains(COI_NOT_REPORTED));
        let stats = (stage(StageId::Statistics).input_builder)(&empty);
        assert!(stats.contains(METHODS_NOT_REPORTED));
        assert!(stats.contains(RESULTS_NOT_REPORTED));
    }

    #[test]
    fn test_classification_input_truncates_methods() {
        let sections = SectionSet {
            title: Some("Egg study".to_string()),
            methods: Some("m".repeat(5000)),
            ..Default::default()
        };
        let input = (stage(StageId::Classification).input_builder)(&sections);
        assert!(input.starts_with("TITLE: Egg study\n\nABSTRACT: ABSTRACT NOT REPORTED"));
        let methods_part = input.split("METHODS START: ").nth(1).unwrap();
        assert_eq!(methods_part.len(), 2000);
    }
}
