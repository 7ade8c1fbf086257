//! 集成测试共用的脚本化补全客户端

#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use paper_audit::error::LlmError;
use paper_audit::infrastructure::{RetryPolicy, StageCriticality};
use paper_audit::models::{Advisory, Document};
use paper_audit::orchestrator::{BatchProgress, ProgressObserver};
use paper_audit::workflow::DocumentCtx;
use paper_audit::{AnalysisPipeline, CompletionClient, CompletionRequest};

pub const VALID_SYNTHESIS: &str = r#"{
    "title": null, "paper_type": "Cohort Study", "evidence_level": "Medium",
    "has_conflict_of_interest": null, "funding_source": null, "coi_notes": null,
    "control_group_quality": "NOT REPORTED", "intervention_details": null,
    "confounding_factors": "Healthy user bias", "primary_outcome": "All-cause mortality",
    "risk_type_reported": "HR", "endpoints": "Clinical", "statistical_significance": "p < 0.05",
    "conclusion_summary": "Modest association", "trust_score": 5, "final_verdict": "Weak"
}"#;

/// 按阶段名称应答的补全客户端
///
/// 每篇测试文献带一个唯一标记，前序报告会原样带上标记，
/// 因此任何阶段的请求都能归属到具体文献。
pub struct ScriptedClient {
    markers: Vec<String>,
    /// (标记, 阶段) → 该调用失败
    failures: Vec<(String, &'static str)>,
    /// 该标记的综合阶段返回纯文本
    unstructured: Vec<String>,
    /// 每个标记的调用延迟
    delays: HashMap<String, Duration>,
    default_delay: Duration,
    calls: Mutex<Vec<(String, CompletionRequest)>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl ScriptedClient {
    pub fn new(markers: &[&str]) -> Self {
        Self {
            markers: markers.iter().map(|m| m.to_string()).collect(),
            failures: Vec::new(),
            unstructured: Vec::new(),
            delays: HashMap::new(),
            default_delay: Duration::from_millis(1),
            calls: Mutex::new(Vec::new()),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
        }
    }

    pub fn fail(mut self, marker: &str, stage: &'static str) -> Self {
        self.failures.push((marker.to_string(), stage));
        self
    }

    pub fn unstructured_synthesis(mut self, marker: &str) -> Self {
        self.unstructured.push(marker.to_string());
        self
    }

    pub fn delay(mut self, marker: &str, delay: Duration) -> Self {
        self.delays.insert(marker.to_string(), delay);
        self
    }

    pub fn default_delay(mut self, delay: Duration) -> Self {
        self.default_delay = delay;
        self
    }

    /// 某篇文献依次调用的阶段
    pub fn stages_for(&self, marker: &str) -> Vec<String> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|(m, _)| m == marker)
            .map(|(_, r)| r.label.clone())
            .collect()
    }

    pub fn request_for(&self, marker: &str, stage: &str) -> Option<CompletionRequest> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .find(|(m, r)| m == marker && r.label == stage)
            .map(|(_, r)| r.clone())
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    fn marker_of(&self, request: &CompletionRequest) -> String {
        let mut haystack = request.task_text.clone();
        for prior in &request.prior_stage_texts {
            haystack.push_str(&prior.text);
        }
        self.markers
            .iter()
            .find(|m| haystack.contains(m.as_str()))
            .cloned()
            .unwrap_or_default()
    }
}

#[async_trait]
impl CompletionClient for ScriptedClient {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, LlmError> {
        let marker = self.marker_of(request);
        self.calls
            .lock()
            .unwrap()
            .push((marker.clone(), request.clone()));

        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        let delay = self.delays.get(&marker).copied().unwrap_or(self.default_delay);
        tokio::time::sleep(delay).await;
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if self
            .failures
            .iter()
            .any(|(m, stage)| *m == marker && *stage == request.label)
        {
            return Err(LlmError::EmptyContent {
                model: "scripted".to_string(),
            });
        }

        match request.label.as_str() {
            "synthesis" if self.unstructured.contains(&marker) => {
                Ok("This cohort study looks moderately trustworthy.".to_string())
            }
            "synthesis" => Ok(VALID_SYNTHESIS.to_string()),
            label => Ok(format!("{} report for {}", label, marker)),
        }
    }

    fn model_name(&self) -> &str {
        "scripted"
    }
}

/// 记录进度和提示的观察者
#[derive(Default)]
pub struct RecordingObserver {
    pub progress: Mutex<Vec<BatchProgress>>,
    pub advisories: Mutex<Vec<(String, Advisory)>>,
}

impl ProgressObserver for RecordingObserver {
    fn on_progress(&self, progress: BatchProgress) {
        self.progress.lock().unwrap().push(progress);
    }

    fn on_advisory(&self, ctx: &DocumentCtx, advisory: &Advisory) {
        self.advisories
            .lock()
            .unwrap()
            .push((ctx.filename.clone(), advisory.clone()));
    }
}

/// 带完整章节的测试文献
pub fn paper(marker: &str) -> Document {
    Document::new(
        format!("{}.txt", marker),
        format!(
            "Egg intake and mortality {marker}. Abstract: we followed 10,000 adults. \
             Methods: prospective cohort with baseline questionnaires. \
             Results: HR 1.12 (95% CI 1.01-1.24). Discussion: residual confounding is likely."
        ),
    )
}

/// 没有方法部分的测试文献
pub fn paper_without_methods(marker: &str) -> Document {
    Document::new(
        format!("{}.txt", marker),
        format!(
            "Coffee and sleep {marker}. Abstract: a short survey. \
             Results: people who drank coffee slept less. Conclusion: drink less coffee."
        ),
    )
}

/// 快速失败的重试策略
pub fn fast_pipeline(client: Arc<ScriptedClient>) -> AnalysisPipeline {
    let policy = |criticality| RetryPolicy {
        max_attempts: 2,
        timeout: Duration::from_secs(5),
        initial_backoff: Duration::from_millis(1),
        criticality,
    };
    AnalysisPipeline::with_policies(
        client,
        policy(StageCriticality::Standard),
        policy(StageCriticality::Critical),
    )
}
