pub mod analysis_flow;
pub mod context_store;
pub mod document_ctx;
pub mod prompts;
pub mod stage;
pub mod synthesis;

pub use analysis_flow::AnalysisPipeline;
pub use context_store::ContextStore;
pub use document_ctx::DocumentCtx;
pub use stage::{StageDefinition, StageId, StagePayload, StageResult, STAGE_CHAIN};
