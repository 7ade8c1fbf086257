//! # Paper Audit
//!
//! 对一批已提取正文的科研文献做可信度审查的 Rust 应用程序
//!
//! ## 架构设计
//!
//! 本系统采用严格的四层架构：
//!
//! ### ① 基础设施层（Infrastructure）
//! - `infrastructure/` - 持有与推理服务的连接，只暴露能力
//! - `CompletionClient` - "给定提示返回文本"的能力
//! - `invoke_with_retry` - 超时、退避重试与取消
//!
//! ### ② 业务能力层（Services）
//! - `services/` - 描述"我能做什么"，只处理单篇文献
//! - `SectionSegmenter` - 确定性的章节切分
//! - `DisclosureScanner` - 利益冲突声明扫描
//! - `FailureWriter` / `ResultWriter` - 写失败记录与结果导出
//!
//! ### ③ 流程层（Workflow）
//! - `workflow/` - 定义"一篇文献"的完整分析流程
//! - `DocumentCtx` - 上下文封装（文件名 + 批次位置）
//! - `AnalysisPipeline` - 阶段链编排（title → … → synthesis）
//! - `ContextStore` - 单篇文献的阶段结果存储
//!
//! ### ④ 编排层（Orchestration）
//! - `orchestrator/app` - 应用入口，加载与输出
//! - `orchestrator/batch_coordinator` - 并发、顺序汇总、进度
//! - `orchestrator/document_processor` - 单篇文献处理器
//!
//! ## 模块结构

pub mod config;
pub mod error;
pub mod infrastructure;

pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use config::Config;
pub use error::{AppError, AppResult, PipelineError};
pub use infrastructure::{CompletionClient, CompletionRequest};
pub use models::{Document, PaperRecord, SectionSet};
pub use orchestrator::{App, BatchCoordinator, BatchProgress, ProgressObserver};
pub use services::SectionSegmenter;
pub use workflow::{AnalysisPipeline, DocumentCtx};
