//! 章节定义与标题别名词典

use serde::{Deserialize, Serialize};
use std::fmt;

/// 固定的章节枚举
///
/// 声明顺序即枚举顺序，同一偏移位置出现多个标题时按此顺序决胜。
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Section {
    /// 标题（不参与标题扫描）
    Title,
    /// 摘要
    Abstract,
    /// 引言
    Introduction,
    /// 方法
    Methods,
    /// 结果
    Results,
    /// 讨论
    Discussion,
    /// 结论
    Conclusion,
    /// 资助
    Funding,
    /// 利益冲突
    ConflictsOfInterest,
}

impl Section {
    /// 全部章节，按枚举顺序
    pub const ALL: [Section; 9] = [
        Section::Title,
        Section::Abstract,
        Section::Introduction,
        Section::Methods,
        Section::Results,
        Section::Discussion,
        Section::Conclusion,
        Section::Funding,
        Section::ConflictsOfInterest,
    ];

    /// 标准名称
    pub fn name(self) -> &'static str {
        match self {
            Section::Title => "title",
            Section::Abstract => "abstract",
            Section::Introduction => "introduction",
            Section::Methods => "methods",
            Section::Results => "results",
            Section::Discussion => "discussion",
            Section::Conclusion => "conclusion",
            Section::Funding => "funding",
            Section::ConflictsOfInterest => "conflicts_of_interest",
        }
    }

    /// 在枚举中的位置
    pub fn ordinal(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// 标题别名 → 章节
///
/// 别名均为小写短语，匹配时大小写不敏感且按单词边界定界。
pub static HEADING_ALIASES: phf::Map<&'static str, Section> = phf::phf_map! {
    "abstract" => Section::Abstract,
    "introduction" => Section::Introduction,
    "background" => Section::Introduction,
    "methods" => Section::Methods,
    "materials and methods" => Section::Methods,
    "methodology" => Section::Methods,
    "results" => Section::Results,
    "findings" => Section::Results,
    "discussion" => Section::Discussion,
    "conclusion" => Section::Conclusion,
    "conclusions" => Section::Conclusion,
    "funding" => Section::Funding,
    "funding statement" => Section::Funding,
    "sources of funding" => Section::Funding,
    "conflicts of interest" => Section::ConflictsOfInterest,
    "conflict of interest" => Section::ConflictsOfInterest,
    "competing interests" => Section::ConflictsOfInterest,
    "disclosure" => Section::ConflictsOfInterest,
};

/// 一篇文献的章节切片
///
/// 每个章节恰好一个槽位，缺失的章节显式为 `None`，序列化时也不会省略。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionSet {
    pub title: Option<String>,
    pub r#abstract: Option<String>,
    pub introduction: Option<String>,
    pub methods: Option<String>,
    pub results: Option<String>,
    pub discussion: Option<String>,
    pub conclusion: Option<String>,
    pub funding: Option<String>,
    pub conflicts_of_interest: Option<String>,
}

impl SectionSet {
    /// 读取某个章节
    pub fn get(&self, section: Section) -> Option<&str> {
        self.slot(section).as_deref()
    }

    fn slot(&self, section: Section) -> &Option<String> {
        match section {
            Section::Title => &self.title,
            Section::Abstract => &self.r#abstract,
            Section::Introduction => &self.introduction,
            Section::Methods => &self.methods,
            Section::Results => &self.results,
            Section::Discussion => &self.discussion,
            Section::Conclusion => &self.conclusion,
            Section::Funding => &self.funding,
            Section::ConflictsOfInterest => &self.conflicts_of_interest,
        }
    }

    pub(crate) fn slot_mut(&mut self, section: Section) -> &mut Option<String> {
        match section {
            Section::Title => &mut self.title,
            Section::Abstract => &mut self.r#abstract,
            Section::Introduction => &mut self.introduction,
            Section::Methods => &mut self.methods,
            Section::Results => &mut self.results,
            Section::Discussion => &mut self.discussion,
            Section::Conclusion => &mut self.conclusion,
            Section::Funding => &mut self.funding,
            Section::ConflictsOfInterest => &mut self.conflicts_of_interest,
        }
    }

    /// 除标题外是否至少识别出一个章节
    pub fn has_headings(&self) -> bool {
        Section::ALL
            .into_iter()
            .filter(|s| *s != Section::Title)
            .any(|s| self.get(s).is_some())
    }
}
