//! 分析结果导出服务 - 业务能力层
//!
//! 只负责把一次批次的结果写成带时间戳的 JSON 文件

use anyhow::{Context, Result};
use serde::Serialize;
use std::fs::{self, File, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tracing::info;

use crate::models::advisory::DocumentAdvisory;
use crate::models::batch_report::{BatchReport, DocumentFailure};
use crate::models::paper_record::PaperRecord;

/// 单条导出记录：展示标题加完整的分析记录
#[derive(Debug, Serialize)]
struct ExportRecord<'a> {
    display_title: String,
    #[serde(flatten)]
    record: &'a PaperRecord,
}

#[derive(Debug, Serialize)]
struct ExportFile<'a> {
    generated_at: String,
    model: &'a str,
    records: Vec<ExportRecord<'a>>,
    failures: &'a [DocumentFailure],
    advisories: &'a [DocumentAdvisory],
}

/// 结果导出服务
pub struct ResultWriter {
    output_folder: PathBuf,
}

impl ResultWriter {
    pub fn new(output_folder: impl AsRef<Path>) -> Self {
        Self {
            output_folder: output_folder.as_ref().to_path_buf(),
        }
    }

    /// 写入 `paper_audit_{YYYY-mm-dd_HH-MM-SS}.json`，返回文件路径
    ///
    /// 同一秒内已有导出文件时追加序号（`_1`、`_2` ...），不会覆盖旧文件。
    pub async fn write(&self, report: &BatchReport, model: &str) -> Result<PathBuf> {
        fs::create_dir_all(&self.output_folder).with_context(|| {
            format!("无法创建输出目录: {}", self.output_folder.display())
        })?;

        let now = chrono::Local::now();
        let stamp = now.format("%Y-%m-%d_%H-%M-%S").to_string();
        let (path, mut file) = self.create_export_file(&stamp)?;

        let export = ExportFile {
            generated_at: now.to_rfc3339(),
            model,
            records: report
                .successes
                .iter()
                .enumerate()
                .map(|(i, record)| ExportRecord {
                    display_title: record.display_title(i + 1),
                    record,
                })
                .collect(),
            failures: &report.failures,
            advisories: &report.advisories,
        };

        let json = serde_json::to_string_pretty(&export)?;
        file.write_all(json.as_bytes())
            .with_context(|| format!("写入结果失败: {}", path.display()))?;

        info!("💾 分析结果已导出: {}", path.display());
        Ok(path)
    }

    /// 以 `create_new` 打开一个尚不存在的导出文件
    fn create_export_file(&self, stamp: &str) -> Result<(PathBuf, File)> {
        let mut suffix = 0u32;
        loop {
            let name = if suffix == 0 {
                format!("paper_audit_{}.json", stamp)
            } else {
                format!("paper_audit_{}_{}.json", stamp, suffix)
            };
            let path = self.output_folder.join(name);
            match OpenOptions::new().write(true).create_new(true).open(&path) {
                Ok(file) => return Ok((path, file)),
                Err(e) if e.kind() == ErrorKind::AlreadyExists => suffix += 1,
                Err(e) => {
                    return Err(e).with_context(|| format!("无法创建导出文件: {}", path.display()))
                }
            }
        }
    }
}
