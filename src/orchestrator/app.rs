//! 应用入口 - 编排层
//!
//! ## 核心功能
//!
//! 1. **应用初始化**：日志文件、推理客户端、分析流水线
//! 2. **批量加载**：扫描输入目录下的全部文本（`Vec<Document>`）
//! 3. **批次分析**：委托 `BatchCoordinator`
//! 4. **中断处理**：Ctrl-C 触发取消，已完成的结果照常输出
//! 5. **结果输出**：JSON 导出、失败记录、运行日志、全局统计

use anyhow::Result;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crate::config::Config;
use crate::infrastructure::{CompletionClient, OpenAiCompletionClient};
use crate::models::batch_report::BatchReport;
use crate::models::document::Document;
use crate::orchestrator::batch_coordinator::BatchCoordinator;
use crate::services::{FailureWriter, ResultWriter};
use crate::utils::logging::{
    append_log_lines, init_log_file, log_documents_loaded, log_startup, print_final_stats,
};
use crate::workflow::AnalysisPipeline;

/// 应用主结构
pub struct App {
    config: Config,
    coordinator: BatchCoordinator,
    failure_writer: FailureWriter,
    result_writer: ResultWriter,
    model_name: String,
}

impl App {
    /// 初始化应用
    pub async fn initialize(config: Config) -> Result<Self> {
        let client: Arc<dyn CompletionClient> = Arc::new(OpenAiCompletionClient::new(&config));
        Self::with_client(config, client)
    }

    /// 使用指定的补全客户端初始化
    pub fn with_client(config: Config, client: Arc<dyn CompletionClient>) -> Result<Self> {
        // 初始化日志文件
        init_log_file(&config.output_log_file)?;

        log_startup(&config);

        let pipeline = AnalysisPipeline::new(client, &config);
        let model_name = pipeline.model_name().to_string();
        let coordinator = BatchCoordinator::new(pipeline, config.max_concurrent_papers);

        Ok(Self {
            failure_writer: FailureWriter::with_path(&config.failure_log_file),
            result_writer: ResultWriter::new(&config.output_folder),
            coordinator,
            model_name,
            config,
        })
    }

    /// 运行应用主逻辑
    pub async fn run(&self) -> Result<BatchReport> {
        // 加载所有待分析的文献
        let documents = self.load_documents().await?;

        if documents.is_empty() {
            warn!("⚠️ 没有找到待分析的文本文件，程序结束");
            return Ok(BatchReport::default());
        }

        let total = documents.len();
        log_documents_loaded(total, self.config.max_concurrent_papers);

        let cancel = CancellationToken::new();
        let watcher = tokio::spawn(watch_ctrl_c(cancel.clone()));

        let report = self.coordinator.run_batch(documents, &cancel).await;
        watcher.abort();

        self.write_outputs(&report).await?;

        print_final_stats(
            report.successes.len(),
            report.failures.len(),
            report.advisories.len(),
            total,
            &self.config.output_log_file,
        );

        Ok(report)
    }

    /// 加载文献
    async fn load_documents(&self) -> Result<Vec<Document>> {
        info!("\n📁 正在扫描待分析的文献...");
        crate::models::load_all_documents(&self.config.input_folder).await
    }

    /// 导出结果、写失败记录和运行日志
    async fn write_outputs(&self, report: &BatchReport) -> Result<()> {
        if !report.successes.is_empty() || !report.failures.is_empty() {
            self.result_writer.write(report, &self.model_name).await?;
        }

        for failure in &report.failures {
            if let Err(e) = self.failure_writer.write(failure).await {
                error!("写入失败记录出错 ({}): {}", failure.filename, e);
            }
        }

        append_log_lines(&self.config.output_log_file, &summary_lines(report))
    }
}

/// 收到 Ctrl-C 时触发取消
async fn watch_ctrl_c(cancel: CancellationToken) {
    if tokio::signal::ctrl_c().await.is_ok() {
        warn!("⏹️ 收到中断信号，正在取消未完成的文献...");
        cancel.cancel();
    }
}

/// 运行日志中的逐篇摘要
fn summary_lines(report: &BatchReport) -> Vec<String> {
    let mut lines: Vec<String> = report
        .successes
        .iter()
        .enumerate()
        .map(|(i, record)| {
            format!(
                "✅ {} | {} | 证据等级 {} | 可信度 {}",
                record.filename.as_deref().unwrap_or_default(),
                record.display_title(i + 1),
                record
                    .evidence_level
                    .map(|l| l.to_string())
                    .unwrap_or_else(|| "-".to_string()),
                record
                    .trust_score
                    .map(|s| format!("{}/10", s))
                    .unwrap_or_else(|| "-".to_string())
            )
        })
        .collect();

    lines.extend(
        report
            .failures
            .iter()
            .map(|f| format!("❌ {} | {} | {}", f.filename, f.kind, f.reason)),
    );
    lines.extend(
        report
            .advisories
            .iter()
            .map(|a| format!("⚠️ {} | {}", a.filename, a.advisory)),
    );
    lines
}
