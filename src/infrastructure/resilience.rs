//! 补全调用的超时、重试与取消

use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{error, warn};

use crate::config::Config;
use crate::error::LlmError;
use crate::infrastructure::completion::{CompletionClient, CompletionRequest};

/// 退避时间上限
const MAX_BACKOFF: Duration = Duration::from_secs(30);

/// 阶段的关键程度
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageCriticality {
    /// 自由文本阶段
    Standard,
    /// 综合阶段：失败必须显式暴露，绝不降级为部分结果
    Critical,
}

/// 单次调用的重试策略
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// 最多尝试次数（至少 1）
    pub max_attempts: u32,
    /// 单次调用超时
    pub timeout: Duration,
    /// 第一次重试前的等待，之后每次翻倍
    pub initial_backoff: Duration,
    pub criticality: StageCriticality,
}

impl RetryPolicy {
    /// 按关键程度从配置生成策略
    pub fn from_config(config: &Config, criticality: StageCriticality) -> Self {
        let timeout_secs = match criticality {
            StageCriticality::Standard => config.stage_timeout_secs,
            StageCriticality::Critical => config.synthesis_timeout_secs,
        };
        Self {
            max_attempts: config.max_retries.saturating_add(1),
            timeout: Duration::from_secs(timeout_secs),
            initial_backoff: Duration::from_millis(config.retry_backoff_ms),
            criticality,
        }
    }

    /// 第 `attempt` 次失败后的等待时间
    pub fn backoff_after(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt.saturating_sub(1));
        self.initial_backoff.saturating_mul(factor).min(MAX_BACKOFF)
    }
}

/// 重试耗尽后的失败
#[derive(Debug)]
pub struct InvocationFailure {
    /// 实际发起的调用次数
    pub attempts: u32,
    /// 最后一次的错误
    pub error: LlmError,
}

/// 带超时、退避重试与取消的补全调用
///
/// 取消信号会立即中断进行中的调用和退避等待；`Cancelled` 与请求构建错误不重试。
pub async fn invoke_with_retry(
    client: &dyn CompletionClient,
    request: &CompletionRequest,
    policy: &RetryPolicy,
    cancel: &CancellationToken,
) -> Result<String, InvocationFailure> {
    let max_attempts = policy.max_attempts.max(1);
    let mut attempts = 0;

    loop {
        if cancel.is_cancelled() {
            return Err(InvocationFailure {
                attempts,
                error: LlmError::Cancelled,
            });
        }

        attempts += 1;
        let outcome = tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(LlmError::Cancelled),
            result = tokio::time::timeout(policy.timeout, client.complete(request)) => match result {
                Ok(inner) => inner,
                Err(_) => Err(LlmError::Timeout {
                    timeout_secs: policy.timeout.as_secs(),
                }),
            },
        };

        let error = match outcome {
            Ok(text) => return Ok(text),
            Err(e) => e,
        };

        if !error.is_retryable() || attempts >= max_attempts {
            if policy.criticality == StageCriticality::Critical {
                error!(
                    "[{}] 关键阶段调用失败 ({}/{}): {}",
                    request.label, attempts, max_attempts, error
                );
            }
            return Err(InvocationFailure { attempts, error });
        }

        let backoff = policy.backoff_after(attempts);
        warn!(
            "[{}] 调用失败 ({}/{}): {}，{} 毫秒后重试...",
            request.label,
            attempts,
            max_attempts,
            error,
            backoff.as_millis()
        );

        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                return Err(InvocationFailure {
                    attempts,
                    error: LlmError::Cancelled,
                });
            }
            _ = tokio::time::sleep(backoff) => {}
        }
    }
}
