//! 文本补全能力 - 基础设施层
//!
//! 持有与 LLM 端点的连接，只暴露"给定提示返回文本"的能力
//!
//! ## 技术栈
//! - 使用 `async-openai` crate 进行 API 调用
//! - 兼容 OpenAI API 的服务（Ollama、vLLM、Azure 等）
//! - 端点、模型、温度在整个批次内固定

use async_openai::{
    config::OpenAIConfig,
    types::chat::{
        ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
        ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs,
    },
    Client,
};
use async_trait::async_trait;
use tracing::{debug, warn};

use crate::config::Config;
use crate::error::LlmError;

/// 前序阶段的输出文本
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriorStageText {
    /// 阶段名称
    pub label: String,
    pub text: String,
}

/// 一次补全请求
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionRequest {
    /// 发起请求的阶段名称（仅用于日志）
    pub label: String,
    /// 角色设定，作为系统消息发送
    pub framing_text: String,
    /// 任务描述及章节文本
    pub task_text: String,
    /// 已声明依赖的前序阶段输出
    pub prior_stage_texts: Vec<PriorStageText>,
}

impl CompletionRequest {
    /// 组装用户消息：任务在前，前序阶段报告在后
    pub fn user_message(&self) -> String {
        if self.prior_stage_texts.is_empty() {
            return self.task_text.clone();
        }

        let mut message = self.task_text.clone();
        message.push_str("\n\n## Reports from earlier stages\n");
        for prior in &self.prior_stage_texts {
            message.push_str(&format!("\n### {}\n{}\n", prior.label, prior.text.trim()));
        }
        message
    }
}

/// 文本补全能力
///
/// 职责：
/// - 把一次请求发送给推理服务并返回文本
/// - 不认识章节、阶段顺序或记录结构
/// - 实现必须可以在多个任务间并发共享
#[async_trait]
pub trait CompletionClient: Send + Sync {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, LlmError>;

    /// 模型标识（用于日志）
    fn model_name(&self) -> &str;
}

/// 基于 OpenAI 兼容接口的补全客户端
pub struct OpenAiCompletionClient {
    client: Client<OpenAIConfig>,
    model_name: String,
    temperature: f32,
    max_tokens: u32,
}

impl OpenAiCompletionClient {
    /// 创建新的补全客户端
    pub fn new(config: &Config) -> Self {
        // 配置 OpenAI 客户端（兼容 OpenAI API 的服务）
        let openai_config = OpenAIConfig::new()
            .with_api_key(&config.llm_api_key)
            .with_api_base(&config.llm_api_base_url);

        let client = Client::with_config(openai_config);

        Self {
            client,
            model_name: config.llm_model_name.clone(),
            temperature: config.llm_temperature,
            max_tokens: config.llm_max_tokens,
        }
    }
}

#[async_trait]
impl CompletionClient for OpenAiCompletionClient {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, LlmError> {
        let user_message = request.user_message();
        debug!(
            "调用 LLM API，阶段: {}, 模型: {}, 用户消息长度: {} 字符",
            request.label,
            self.model_name,
            user_message.len()
        );

        let system_msg = ChatCompletionRequestSystemMessageArgs::default()
            .content(request.framing_text.as_str())
            .build()?;
        let user_msg = ChatCompletionRequestUserMessageArgs::default()
            .content(user_message)
            .build()?;

        let messages = vec![
            ChatCompletionRequestMessage::System(system_msg),
            ChatCompletionRequestMessage::User(user_msg),
        ];

        let chat_request = CreateChatCompletionRequestArgs::default()
            .model(&self.model_name)
            .messages(messages)
            .temperature(self.temperature)
            .max_tokens(self.max_tokens)
            .build()?;

        let response = self
            .client
            .chat()
            .create(chat_request)
            .await
            .map_err(|e| {
                warn!("LLM API 调用失败 (阶段: {}): {}", request.label, e);
                LlmError::ApiCallFailed {
                    model: self.model_name.clone(),
                    source: Box::new(e),
                }
            })?;

        let choice = response
            .choices
            .first()
            .ok_or_else(|| LlmError::EmptyResponse {
                model: self.model_name.clone(),
            })?;

        let content = choice
            .message
            .content
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .ok_or_else(|| LlmError::EmptyContent {
                model: self.model_name.clone(),
            })?;

        debug!("LLM API 调用成功 (阶段: {})", request.label);
        Ok(content.to_string())
    }

    fn model_name(&self) -> &str {
        &self.model_name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_message_without_prior_stages() {
        let request = CompletionRequest {
            label: "title".to_string(),
            framing_text: "You extract titles.".to_string(),
            task_text: "Extract the title.".to_string(),
            prior_stage_texts: vec![],
        };
        assert_eq!(request.user_message(), "Extract the title.");
    }

    #[test]
    fn test_user_message_appends_prior_reports_in_order() {
        let request = CompletionRequest {
            label: "triage".to_string(),
            framing_text: String::new(),
            task_text: "Assign an evidence level.".to_string(),
            prior_stage_texts: vec![
                PriorStageText {
                    label: "classification".to_string(),
                    text: " RCT \n".to_string(),
                },
                PriorStageText {
                    label: "methodology".to_string(),
                    text: "Adequate control.".to_string(),
                },
            ],
        };
        let message = request.user_message();
        let classification = message.find("### classification\nRCT\n").unwrap();
        let methodology = message.find("### methodology\nAdequate control.\n").unwrap();
        assert!(message.starts_with("Assign an evidence level."));
        assert!(classification < methodology);
    }

    /// 测试真实端点连通性
    ///
    /// 运行方式：
    /// ```bash
    /// cargo test test_openai_client_connectivity -- --ignored --nocapture
    /// ```
    #[tokio::test]
    #[ignore]
    async fn test_openai_client_connectivity() {
        let _ = tracing_subscriber::fmt::try_init();

        let client = OpenAiCompletionClient::new(&Config::from_env());
        let request = CompletionRequest {
            label: "ping".to_string(),
            framing_text: "You answer tersely.".to_string(),
            task_text: "Reply with the single word OK.".to_string(),
            prior_stage_texts: vec![],
        };

        match client.complete(&request).await {
            Ok(response) => {
                println!("LLM 响应: {}", response);
                assert!(!response.is_empty());
            }
            Err(e) => panic!("LLM 调用失败: {}", e),
        }
    }
}
