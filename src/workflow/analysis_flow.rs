//! 单篇文献分析流程 - 流程层
//!
//! 核心职责：定义"一篇文献"的完整分析流程
//!
//! 流程顺序（严格串行，后一阶段只读取自己声明的依赖）：
//! 1. title → classification → triage → methodology → statistics
//! 2. synthesis → 结构校验 → PaperRecord
//!
//! 任一阶段重试耗尽即终止本篇文献，不会产出部分记录。

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use crate::config::Config;
use crate::error::PipelineError;
use crate::infrastructure::completion::{CompletionClient, CompletionRequest, PriorStageText};
use crate::infrastructure::resilience::{invoke_with_retry, RetryPolicy, StageCriticality};
use crate::models::paper_record::PaperRecord;
use crate::models::section::SectionSet;
use crate::utils::logging::truncate_text;
use crate::workflow::context_store::ContextStore;
use crate::workflow::document_ctx::DocumentCtx;
use crate::workflow::prompts;
use crate::workflow::stage::{
    OutputKind, StageDefinition, StageId, StagePayload, StageResult, STAGE_CHAIN,
};
use crate::workflow::synthesis;

/// 文献分析流水线
///
/// - 编排固定的阶段链
/// - 不持有任何文献状态，每次 `run` 新建自己的上下文存储
/// - 可在多个并发任务间共享
pub struct AnalysisPipeline {
    client: Arc<dyn CompletionClient>,
    standard_policy: RetryPolicy,
    critical_policy: RetryPolicy,
    verbose_logging: bool,
}

impl AnalysisPipeline {
    /// 创建新的分析流水线
    pub fn new(client: Arc<dyn CompletionClient>, config: &Config) -> Self {
        Self {
            client,
            standard_policy: RetryPolicy::from_config(config, StageCriticality::Standard),
            critical_policy: RetryPolicy::from_config(config, StageCriticality::Critical),
            verbose_logging: config.verbose_logging,
        }
    }

    /// 使用指定的重试策略创建
    pub fn with_policies(
        client: Arc<dyn CompletionClient>,
        standard_policy: RetryPolicy,
        critical_policy: RetryPolicy,
    ) -> Self {
        Self {
            client,
            standard_policy,
            critical_policy,
            verbose_logging: false,
        }
    }

    pub fn model_name(&self) -> &str {
        self.client.model_name()
    }

    /// 对一篇文献运行完整的阶段链
    pub async fn run(
        &self,
        ctx: &DocumentCtx,
        sections: &SectionSet,
        cancel: &CancellationToken,
    ) -> Result<PaperRecord, PipelineError> {
        let mut store = ContextStore::new();

        for stage in STAGE_CHAIN.iter() {
            let result = self.run_stage(stage, ctx, sections, &store, cancel).await?;
            store.put(result)?;
        }

        match store.into_result(StageId::Synthesis).map(|r| r.payload) {
            Some(StagePayload::Structured(record)) => Ok(*record),
            _ => Err(crate::error::ContextError::MissingSynthesis.into()),
        }
    }

    /// 执行单个阶段
    async fn run_stage(
        &self,
        stage: &StageDefinition,
        ctx: &DocumentCtx,
        sections: &SectionSet,
        store: &ContextStore,
        cancel: &CancellationToken,
    ) -> Result<StageResult, PipelineError> {
        // 依赖必须全部完成，否则是流程定义错误
        let prior_stage_texts = store
            .dependencies_of(stage)?
            .into_iter()
            .map(|prior| PriorStageText {
                label: prior.stage_id.report_label().to_string(),
                text: prior.payload.as_report_text(),
            })
            .collect();

        let section_text = (stage.input_builder)(sections);
        let request = CompletionRequest {
            label: stage.id.name().to_string(),
            framing_text: prompts::framing(stage.id).to_string(),
            task_text: prompts::task(stage.id, &section_text),
            prior_stage_texts,
        };

        let policy = match stage.criticality {
            StageCriticality::Standard => &self.standard_policy,
            StageCriticality::Critical => &self.critical_policy,
        };

        info!("{} 🔬 阶段 {} 开始...", ctx, stage.id);

        let text = invoke_with_retry(self.client.as_ref(), &request, policy, cancel)
            .await
            .map_err(|failure| {
                error!(
                    "{} ❌ 阶段 {} 失败 (已尝试 {} 次): {}",
                    ctx, stage.id, failure.attempts, failure.error
                );
                PipelineError::StageInvocation {
                    stage: stage.id,
                    attempts: failure.attempts,
                    source: failure.error,
                }
            })?;

        if self.verbose_logging {
            debug!("{} 阶段 {} 输出: {}", ctx, stage.id, truncate_text(&text, 200));
        }

        let payload = match stage.output {
            OutputKind::FreeText => StagePayload::Text(text),
            OutputKind::Structured => {
                let mut record = synthesis::parse_synthesis(&text).map_err(|violation| {
                    error!(
                        "{} ❌ 综合结果不符合记录结构: {} | 原文: {}",
                        ctx,
                        violation,
                        truncate_text(&text, 200)
                    );
                    violation
                })?;
                record.filename = Some(ctx.filename.clone());
                StagePayload::Structured(Box::new(record))
            }
        };

        info!("{} ✓ 阶段 {} 完成", ctx, stage.id);

        Ok(StageResult {
            document_id: ctx.filename.clone(),
            stage_id: stage.id,
            payload,
        })
    }
}
