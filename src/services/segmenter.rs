//! 章节切分服务 - 业务能力层
//!
//! 只负责把一篇文献的正文确定性地切成固定的命名章节，不调用 LLM。
//!
//! ## 算法
//! 1. 空白折叠为单个空格
//! 2. 对词典中的每个别名做大小写不敏感、单词边界定界的全文匹配，记录 `(偏移, 章节)`
//! 3. 按偏移升序排序；同一偏移只保留枚举顺序靠前的章节（同一章节取更长的别名）。
//!    嵌套别名（如 "materials and methods" 中的 "methods"）在自己的偏移处独立命中
//! 4. 每个匹配的切片从自身偏移延伸到下一个匹配的偏移（或正文末尾）
//! 5. 同一章节只保留第一次出现的切片
//! 6. 标题独立取正文前 500 个字符

use regex::Regex;
use tracing::{debug, error};

use crate::models::section::{Section, SectionSet, HEADING_ALIASES};

/// 标题片段的最大字符数
pub const TITLE_SNIPPET_CHARS: usize = 500;

/// 一个标题命中
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeadingMatch {
    /// 在折叠空白后的正文中的字节偏移
    pub offset: usize,
    /// 命中的结束偏移（不含）
    pub end: usize,
    pub section: Section,
}

/// 章节切分器
///
/// 构造时编译全部别名的正则，之后 `segment` 为纯函数，可在多个任务间共享。
pub struct SectionSegmenter {
    patterns: Vec<(Section, Regex)>,
}

impl SectionSegmenter {
    /// 根据标题别名词典创建切分器
    pub fn new() -> Self {
        let mut aliases: Vec<(&'static str, Section)> = HEADING_ALIASES
            .entries()
            .map(|(alias, section)| (*alias, *section))
            .collect();
        aliases.sort_unstable();

        let patterns = aliases
            .into_iter()
            .filter_map(|(alias, section)| {
                let pattern = format!(r"(?i)\b{}\b", regex::escape(alias));
                match Regex::new(&pattern) {
                    Ok(re) => Some((section, re)),
                    Err(e) => {
                        error!("标题别名 '{}' 无法编译为正则: {}", alias, e);
                        None
                    }
                }
            })
            .collect();

        Self { patterns }
    }

    /// 切分正文，永不失败
    pub fn segment(&self, raw_text: &str) -> SectionSet {
        let normalized = normalize_whitespace(raw_text);

        let mut sections = SectionSet {
            title: title_snippet(&normalized),
            ..Default::default()
        };

        let matches = self.find_headings(&normalized);
        if matches.is_empty() {
            debug!("未识别到任何章节标题");
            return sections;
        }

        for (i, current) in matches.iter().enumerate() {
            let end = matches
                .get(i + 1)
                .map(|next| next.offset)
                .unwrap_or(normalized.len());
            let slot = sections.slot_mut(current.section);
            // 同一章节只保留第一次出现
            if slot.is_none() {
                *slot = Some(normalized[current.offset..end].trim().to_string());
            }
        }

        sections
    }

    /// 找出全部切分点
    ///
    /// 排序键为 (偏移, 枚举顺序, 更长的命中优先)，同一偏移只保留排序后的第一个命中。
    pub fn find_headings(&self, normalized: &str) -> Vec<HeadingMatch> {
        let mut candidates: Vec<HeadingMatch> = self
            .patterns
            .iter()
            .flat_map(|(section, re)| {
                re.find_iter(normalized).map(move |m| HeadingMatch {
                    offset: m.start(),
                    end: m.end(),
                    section: *section,
                })
            })
            .collect();

        candidates.sort_by_key(|m| (m.offset, m.section.ordinal(), std::cmp::Reverse(m.end)));

        candidates.dedup_by_key(|m| m.offset);
        candidates
    }
}

impl Default for SectionSegmenter {
    fn default() -> Self {
        Self::new()
    }
}

/// 把连续空白折叠为单个空格（首尾空白同样折叠而非去除）
pub fn normalize_whitespace(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_whitespace = false;
    for c in text.chars() {
        if c.is_whitespace() {
            if !in_whitespace {
                out.push(' ');
            }
            in_whitespace = true;
        } else {
            out.push(c);
            in_whitespace = false;
        }
    }
    out
}

fn title_snippet(normalized: &str) -> Option<String> {
    let snippet: String = normalized.chars().take(TITLE_SNIPPET_CHARS).collect();
    let snippet = snippet.trim();
    if snippet.is_empty() {
        None
    } else {
        Some(snippet.to_string())
    }
}
