//! 失败记录写入服务 - 业务能力层
//!
//! 只负责"写失败记录文件"能力，不关心流程

use anyhow::Result;
use std::fs::OpenOptions;
use std::io::Write;
use tracing::debug;

use crate::models::batch_report::DocumentFailure;

/// 失败记录写入服务
///
/// 职责：
/// - 将分析失败的文献追加到失败记录文件
/// - 只处理单篇文献的失败
/// - 不关心流程顺序
pub struct FailureWriter {
    failure_file_path: String,
}

impl FailureWriter {
    /// 创建新的失败记录写入服务
    pub fn new() -> Self {
        Self {
            failure_file_path: "failures.txt".to_string(),
        }
    }

    /// 使用自定义文件路径创建
    pub fn with_path(path: impl Into<String>) -> Self {
        Self {
            failure_file_path: path.into(),
        }
    }

    /// 追加一条失败记录
    pub async fn write(&self, failure: &DocumentFailure) -> Result<()> {
        debug!(
            "写入失败记录: 文献 {} | 类型 {}",
            failure.filename, failure.kind
        );

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.failure_file_path)?;

        let line = format!(
            "文献 {} | {} | 原因: {}\n",
            failure.filename, failure.kind, failure.reason
        );

        file.write_all(line.as_bytes())?;

        Ok(())
    }
}

impl Default for FailureWriter {
    fn default() -> Self {
        Self::new()
    }
}
