//! 单篇文献处理器 - 编排层
//!
//! ## 职责
//!
//! 1. **章节切分**：调用 `SectionSegmenter`
//! 2. **质量提示**：方法缺失、未识别章节标题
//! 3. **流程调度**：把章节交给 `AnalysisPipeline`
//! 4. **披露对照**：记录中的利益冲突标记与声明扫描结果不一致时给出提示

use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crate::error::PipelineError;
use crate::models::advisory::Advisory;
use crate::models::document::Document;
use crate::models::paper_record::PaperRecord;
use crate::orchestrator::batch_coordinator::ProgressObserver;
use crate::services::{DisclosureScanner, SectionSegmenter};
use crate::workflow::{AnalysisPipeline, DocumentCtx};

/// 单篇文献的处理结果
#[derive(Debug)]
pub struct DocumentOutcome {
    pub advisories: Vec<Advisory>,
    pub result: Result<PaperRecord, PipelineError>,
}

/// 单篇文献处理所需的共享能力
pub struct DocumentProcessor {
    pub pipeline: AnalysisPipeline,
    pub segmenter: SectionSegmenter,
    pub scanner: DisclosureScanner,
}

impl DocumentProcessor {
    pub fn new(pipeline: AnalysisPipeline) -> Self {
        Self {
            pipeline,
            segmenter: SectionSegmenter::new(),
            scanner: DisclosureScanner::new(),
        }
    }

    /// 处理单篇文献
    ///
    /// 提示在产生时立即通知观察者，同时随结果一起返回。
    pub async fn process(
        &self,
        document: &Document,
        ctx: &DocumentCtx,
        observer: &dyn ProgressObserver,
        cancel: &CancellationToken,
    ) -> DocumentOutcome {
        info!("{} 📄 开始分析，正文 {} 字符", ctx, document.raw_text.chars().count());

        let sections = self.segmenter.segment(&document.raw_text);
        let mut advisories = Vec::new();

        if !sections.has_headings() {
            advisories.push(Advisory::SegmentationAnomaly);
        }
        if sections.methods.is_none() {
            advisories.push(Advisory::MissingEvidence);
        }
        for advisory in &advisories {
            warn!("{} ⚠️ {}", ctx, advisory);
            observer.on_advisory(ctx, advisory);
        }

        let result = self.pipeline.run(ctx, &sections, cancel).await;

        match &result {
            Ok(record) => {
                let signal = self.scanner.scan(&sections);
                if signal.contradicts(record.has_conflict_of_interest) {
                    let advisory = Advisory::DisclosureMismatch {
                        signal,
                        reported: record.has_conflict_of_interest,
                    };
                    warn!("{} ⚠️ {}", ctx, advisory);
                    observer.on_advisory(ctx, &advisory);
                    advisories.push(advisory);
                }
                info!(
                    "{} ✅ 分析完成: 证据等级 {} | 可信度 {}",
                    ctx,
                    record
                        .evidence_level
                        .map(|l| l.to_string())
                        .unwrap_or_else(|| "未知".to_string()),
                    record
                        .trust_score
                        .map(|s| format!("{}/10", s))
                        .unwrap_or_else(|| "未评分".to_string())
                );
            }
            Err(e) if e.is_cancelled() => {
                warn!("{} ⏹️ 分析已取消", ctx);
            }
            Err(e) => {
                error!("{} ❌ 分析失败: {}", ctx, e);
            }
        }

        DocumentOutcome { advisories, result }
    }
}
