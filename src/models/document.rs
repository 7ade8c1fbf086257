use serde::{Deserialize, Serialize};

/// 待分析的文献
///
/// 由上游文本提取环节提供，读入后不再修改。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    /// 原始文件名
    pub filename: String,
    /// 按页拼接后的正文
    pub raw_text: String,
}

impl Document {
    pub fn new(filename: impl Into<String>, raw_text: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
            raw_text: raw_text.into(),
        }
    }
}

/// 清洗提取出的文本
///
/// 排版引号和破折号替换为 ASCII，去除控制字符，空白折叠为单个空格。
pub fn clean_text(raw_text: &str) -> String {
    let replaced: String = raw_text
        .chars()
        .map(|c| match c {
            '\u{201C}' | '\u{201D}' => '"',
            '\u{2018}' | '\u{2019}' => '\'',
            '\u{2014}' | '\u{2013}' => '-',
            '\u{00A0}' | '\u{2009}' => ' ',
            c if c.is_ascii_control() => ' ',
            other => other,
        })
        .collect();

    replaced.split_whitespace().collect::<Vec<_>>().join(" ")
}
