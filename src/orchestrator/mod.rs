//! 编排层（Orchestration Layer）
//!
//! ## 职责
//!
//! 本层负责批量处理和流程调度，是整个系统的"指挥中心"。
//!
//! ## 模块划分
//!
//! ### `app` - 应用入口
//! - 管理应用生命周期（初始化、运行、输出）
//! - 批量加载文献（Vec<Document>）
//! - Ctrl-C 取消
//! - 输出全局统计信息
//!
//! ### `batch_coordinator` - 批次协调器
//! - 控制并发数量（Semaphore）
//! - 按输入顺序汇总结果，单篇失败不影响其他文献
//! - 上报进度与提示
//!
//! ### `document_processor` - 单篇文献处理器
//! - 章节切分、质量提示
//! - 委托 AnalysisPipeline 完成阶段链
//!
//! ## 层次关系
//!
//! ```text
//! app (加载 / 输出)
//!     ↓
//! batch_coordinator (处理 Vec<Document>)
//!     ↓
//! document_processor (处理单篇 Document)
//!     ↓
//! workflow::AnalysisPipeline (阶段链)
//!     ↓
//! services (能力层：切分 / 披露扫描 / 写文件)
//!     ↓
//! infrastructure (基础设施：CompletionClient)
//! ```

pub mod app;
pub mod batch_coordinator;
pub mod document_processor;

// 重新导出主要类型
pub use app::App;
pub use batch_coordinator::{BatchCoordinator, BatchProgress, LogProgress, ProgressObserver};
pub use document_processor::{DocumentOutcome, DocumentProcessor};
