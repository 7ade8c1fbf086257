use thiserror::Error;

use crate::workflow::stage::StageId;

/// 应用程序错误类型
#[derive(Debug, Error)]
pub enum AppError {
    /// 文件操作错误
    #[error("文件错误: {0}")]
    File(#[from] FileError),
    /// 配置错误
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),
}

/// LLM 服务错误
#[derive(Debug, Error)]
pub enum LlmError {
    /// API 调用失败
    #[error("LLM API调用失败 (模型: {model}): {source}")]
    ApiCallFailed {
        model: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// 构建请求失败
    #[error("构建LLM请求失败: {source}")]
    RequestBuildFailed {
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// 返回结果为空
    #[error("LLM返回结果为空 (模型: {model})")]
    EmptyResponse { model: String },
    /// 返回内容为空
    #[error("LLM返回内容为空 (模型: {model})")]
    EmptyContent { model: String },
    /// 单次调用超时
    #[error("LLM调用超时 ({timeout_secs} 秒)")]
    Timeout { timeout_secs: u64 },
    /// 调用被取消
    #[error("LLM调用已取消")]
    Cancelled,
}

impl LlmError {
    /// 是否值得重试
    pub fn is_retryable(&self) -> bool {
        !matches!(self, LlmError::Cancelled | LlmError::RequestBuildFailed { .. })
    }
}

/// 分析流水线错误（对单篇文献致命，不影响整个批次）
#[derive(Debug, Error)]
pub enum PipelineError {
    /// 阶段调用失败
    #[error("阶段 {stage} 调用失败 (已尝试 {attempts} 次): {source}")]
    StageInvocation {
        stage: StageId,
        attempts: u32,
        #[source]
        source: LlmError,
    },
    /// 综合阶段输出不符合 PaperRecord 结构
    #[error("综合结果校验失败: {violation}")]
    SchemaValidation { violation: SchemaViolation },
    /// 上下文存储前置条件被破坏
    #[error("上下文错误: {0}")]
    Context(#[from] ContextError),
}

impl PipelineError {
    /// 是否由取消信号导致
    pub fn is_cancelled(&self) -> bool {
        matches!(
            self,
            PipelineError::StageInvocation {
                source: LlmError::Cancelled,
                ..
            }
        )
    }
}

impl From<SchemaViolation> for PipelineError {
    fn from(violation: SchemaViolation) -> Self {
        PipelineError::SchemaValidation { violation }
    }
}

/// 上下文存储错误
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ContextError {
    /// 同一阶段写入两次
    #[error("阶段 {0} 的结果已存在，拒绝重复写入")]
    AlreadyRecorded(StageId),
    /// 读取了未声明的依赖
    #[error("阶段 {requester} 未声明依赖 {dependency}")]
    UndeclaredDependency {
        requester: StageId,
        dependency: StageId,
    },
    /// 依赖尚未完成
    #[error("阶段 {requester} 的依赖 {dependency} 尚未完成")]
    NotCompleted {
        requester: StageId,
        dependency: StageId,
    },
    /// 流水线结束时缺少综合结果
    #[error("综合阶段未产生结构化结果")]
    MissingSynthesis,
}

/// 综合结果的结构违规
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SchemaViolation {
    /// 返回的是纯文本而非结构化数据
    #[error("返回内容不是结构化 JSON: {excerpt}")]
    Unstructured { excerpt: String },
    /// 顶层不是 JSON 对象
    #[error("返回的 JSON 顶层不是对象 (实际: {found})")]
    NotAnObject { found: String },
    /// 缺少声明字段
    #[error("缺少字段 {0}")]
    MissingField(&'static str),
    /// 字段类型错误
    #[error("字段 {field} 类型错误: 期望 {expected}, 实际 {found}")]
    WrongType {
        field: &'static str,
        expected: &'static str,
        found: String,
    },
    /// 可信度评分超出范围
    #[error("trust_score {0} 超出范围 [1, 10]")]
    TrustScoreOutOfRange(i64),
    /// 证据等级不在枚举内
    #[error("evidence_level '{0}' 不是 High/Medium/Low")]
    InvalidEvidenceLevel(String),
}

/// 文件操作错误
#[derive(Debug, Error)]
pub enum FileError {
    /// 读取文件失败
    #[error("读取文件失败 ({path}): {source}")]
    ReadFailed {
        path: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// TOML 解析失败
    #[error("TOML解析失败 ({path}): {source}")]
    TomlParseFailed {
        path: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

/// 配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    /// 数值不合法
    #[error("配置项 {name} 不合法: {reason}")]
    InvalidValue { name: &'static str, reason: String },
}

// ========== 从常见错误类型转换 ==========

impl From<async_openai::error::OpenAIError> for LlmError {
    fn from(err: async_openai::error::OpenAIError) -> Self {
        LlmError::RequestBuildFailed {
            source: Box::new(err),
        }
    }
}

// ========== 便捷构造函数 ==========

impl AppError {
    /// 创建文件读取错误
    pub fn file_read_failed(
        path: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        AppError::File(FileError::ReadFailed {
            path: path.into(),
            source: Box::new(source),
        })
    }
}

// ========== Result 类型别名 ==========

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;
