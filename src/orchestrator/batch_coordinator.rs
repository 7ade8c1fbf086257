//! 批次协调器 - 编排层
//!
//! ## 职责
//!
//! 1. **并发控制**：使用 Semaphore 限制同时分析的文献数量
//! 2. **故障隔离**：每篇文献独立成败，一篇失败不影响其他文献
//! 3. **顺序汇总**：结果写入按输入位置编号的槽位，与完成顺序无关
//! 4. **进度上报**：每完成一篇文献通知观察者一次，计数单调递增
//! 5. **取消**：取消后尚未开始的文献记为失败，进行中的调用立即中断

use futures::stream::{FuturesUnordered, StreamExt};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crate::models::advisory::{Advisory, DocumentAdvisory};
use crate::models::batch_report::{BatchReport, DocumentFailure, FailureKind, MAX_REASON_CHARS};
use crate::models::document::Document;
use crate::models::paper_record::PaperRecord;
use crate::orchestrator::document_processor::DocumentProcessor;
use crate::utils::logging::truncate_text;
use crate::workflow::{AnalysisPipeline, DocumentCtx};

/// 批次进度
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchProgress {
    /// 已结束（成功或失败）的文献数
    pub processed: usize,
    pub total: usize,
}

impl BatchProgress {
    /// 完成比例，空批次视为 1.0
    pub fn fraction(&self) -> f64 {
        if self.total == 0 {
            1.0
        } else {
            self.processed as f64 / self.total as f64
        }
    }
}

/// 进度与提示的观察者
pub trait ProgressObserver: Send + Sync {
    fn on_progress(&self, progress: BatchProgress);

    fn on_advisory(&self, _ctx: &DocumentCtx, _advisory: &Advisory) {}
}

/// 写日志的默认观察者
pub struct LogProgress;

impl ProgressObserver for LogProgress {
    fn on_progress(&self, progress: BatchProgress) {
        info!(
            "📈 进度: {}/{} ({:.0}%)",
            progress.processed,
            progress.total,
            progress.fraction() * 100.0
        );
    }
}

/// 槽位中的单篇结果
enum SlotOutcome {
    Finished {
        advisories: Vec<Advisory>,
        result: Result<PaperRecord, DocumentFailure>,
    },
    NotStarted,
    Aborted(String),
}

/// 批次协调器
pub struct BatchCoordinator {
    processor: Arc<DocumentProcessor>,
    max_concurrent: usize,
    observer: Arc<dyn ProgressObserver>,
}

impl BatchCoordinator {
    /// 创建批次协调器，`max_concurrent` 至少为 1
    pub fn new(pipeline: AnalysisPipeline, max_concurrent: usize) -> Self {
        Self {
            processor: Arc::new(DocumentProcessor::new(pipeline)),
            max_concurrent: max_concurrent.max(1),
            observer: Arc::new(LogProgress),
        }
    }

    /// 替换进度观察者
    pub fn with_observer(mut self, observer: Arc<dyn ProgressObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// 分析一批文献
    ///
    /// 永不因单篇文献失败而失败；返回的成功与失败列表都保持输入顺序。
    pub async fn run_batch(
        &self,
        documents: Vec<Document>,
        cancel: &CancellationToken,
    ) -> BatchReport {
        let total = documents.len();
        let semaphore = Arc::new(Semaphore::new(self.max_concurrent));
        let mut filenames = Vec::with_capacity(total);
        let mut pending = FuturesUnordered::new();

        for (index, document) in documents.into_iter().enumerate() {
            filenames.push(document.filename.clone());

            let ctx = DocumentCtx::new(document.filename.clone(), index + 1, total);
            let processor = self.processor.clone();
            let observer = self.observer.clone();
            let semaphore = semaphore.clone();
            let cancel = cancel.clone();

            let handle = tokio::spawn(async move {
                let _permit = match semaphore.acquire_owned().await {
                    Ok(permit) => permit,
                    Err(_) => return SlotOutcome::NotStarted,
                };
                if cancel.is_cancelled() {
                    return SlotOutcome::NotStarted;
                }

                let outcome = processor
                    .process(&document, &ctx, observer.as_ref(), &cancel)
                    .await;

                SlotOutcome::Finished {
                    advisories: outcome.advisories,
                    result: outcome.result.map_err(|e| DocumentFailure {
                        filename: ctx.filename.clone(),
                        kind: FailureKind::from(&e),
                        reason: truncate_text(&e.to_string(), MAX_REASON_CHARS),
                    }),
                }
            });

            pending.push(async move { (index, handle.await) });
        }

        let mut slots: Vec<Option<SlotOutcome>> = (0..total).map(|_| None).collect();
        let mut processed = 0;

        while let Some((index, joined)) = pending.next().await {
            let outcome = match joined {
                Ok(outcome) => outcome,
                Err(e) => {
                    error!("[文献 {}/{}] 任务执行失败: {}", index + 1, total, e);
                    SlotOutcome::Aborted(e.to_string())
                }
            };
            slots[index] = Some(outcome);
            processed += 1;
            self.observer.on_progress(BatchProgress { processed, total });
        }

        let report = assemble_report(filenames, slots);
        if cancel.is_cancelled() {
            warn!(
                "⏹️ 批次已取消: 成功 {} 篇，失败 {} 篇",
                report.successes.len(),
                report.failures.len()
            );
        }
        report
    }
}

/// 按输入顺序汇总槽位
fn assemble_report(filenames: Vec<String>, slots: Vec<Option<SlotOutcome>>) -> BatchReport {
    let mut report = BatchReport::default();

    for (filename, slot) in filenames.into_iter().zip(slots) {
        match slot {
            Some(SlotOutcome::Finished { advisories, result }) => {
                report
                    .advisories
                    .extend(advisories.into_iter().map(|advisory| DocumentAdvisory {
                        filename: filename.clone(),
                        advisory,
                    }));
                match result {
                    Ok(record) => report.successes.push(record),
                    Err(failure) => report.failures.push(failure),
                }
            }
            Some(SlotOutcome::NotStarted) | None => report.failures.push(DocumentFailure {
                filename,
                kind: FailureKind::Cancelled,
                reason: "cancelled before start".to_string(),
            }),
            Some(SlotOutcome::Aborted(reason)) => report.failures.push(DocumentFailure {
                filename,
                kind: FailureKind::Aborted,
                reason: truncate_text(&reason, MAX_REASON_CHARS),
            }),
        }
    }

    report
}
