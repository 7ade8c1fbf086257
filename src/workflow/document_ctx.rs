//! 文献处理上下文
//!
//! 封装"我正在处理批次中的第几篇文献"这一信息

use std::fmt::Display;

/// 文献处理上下文
#[derive(Debug, Clone)]
pub struct DocumentCtx {
    /// 文档标识（文件名）
    pub filename: String,

    /// 在批次中的位置（从1开始，仅用于日志和展示标题）
    pub position: usize,

    /// 批次总数
    pub total: usize,
}

impl DocumentCtx {
    /// 创建新的文献上下文
    pub fn new(filename: String, position: usize, total: usize) -> Self {
        Self {
            filename,
            position,
            total,
        }
    }
}

impl Display for DocumentCtx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[文献 {}/{} {}]",
            self.position, self.total, self.filename
        )
    }
}
