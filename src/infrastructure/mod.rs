//! 基础设施层
//!
//! 持有与推理服务的连接，对上只暴露"补全"能力及其容错包装

pub mod completion;
pub mod resilience;

pub use completion::{CompletionClient, CompletionRequest, OpenAiCompletionClient, PriorStageText};
pub use resilience::{invoke_with_retry, InvocationFailure, RetryPolicy, StageCriticality};
