use serde::Deserialize;
use std::path::Path;

use crate::error::{AppError, AppResult, ConfigError, FileError};

/// 配置文件路径的环境变量
pub const CONFIG_PATH_ENV: &str = "PAPER_AUDIT_CONFIG";

/// 程序配置文件
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// 同时分析的文献数量
    pub max_concurrent_papers: usize,
    /// 已提取文本（.txt）所在目录
    pub input_folder: String,
    /// 分析结果输出目录
    pub output_folder: String,
    /// 运行日志文件
    pub output_log_file: String,
    /// 失败记录文件
    pub failure_log_file: String,
    /// 是否显示详细日志
    pub verbose_logging: bool,
    // --- LLM 配置（整个批次固定） ---
    pub llm_api_key: String,
    pub llm_api_base_url: String,
    pub llm_model_name: String,
    /// 采样温度，0 表示尽量确定
    pub llm_temperature: f32,
    pub llm_max_tokens: u32,
    // --- 容错配置 ---
    /// 自由文本阶段单次调用超时（秒）
    pub stage_timeout_secs: u64,
    /// 综合阶段单次调用超时（秒）
    pub synthesis_timeout_secs: u64,
    /// 失败后的最大重试次数
    pub max_retries: u32,
    /// 第一次重试前的等待（毫秒）
    pub retry_backoff_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_concurrent_papers: 1,
            input_folder: "papers".to_string(),
            output_folder: "output".to_string(),
            output_log_file: "output.txt".to_string(),
            failure_log_file: "failures.txt".to_string(),
            verbose_logging: false,
            llm_api_key: "ollama".to_string(),
            llm_api_base_url: "http://localhost:11434/v1".to_string(),
            llm_model_name: "qwen3".to_string(),
            llm_temperature: 0.0,
            llm_max_tokens: 2048,
            stage_timeout_secs: 300,
            synthesis_timeout_secs: 600,
            max_retries: 2,
            retry_backoff_ms: 1000,
        }
    }
}

fn env_or<T: std::str::FromStr>(name: &str, default: T) -> T {
    std::env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

impl Config {
    /// 以当前配置为基础，用环境变量覆盖
    pub fn with_env_overrides(self) -> Self {
        Self {
            max_concurrent_papers: env_or("MAX_CONCURRENT_PAPERS", self.max_concurrent_papers),
            input_folder: std::env::var("INPUT_FOLDER").unwrap_or(self.input_folder),
            output_folder: std::env::var("OUTPUT_FOLDER").unwrap_or(self.output_folder),
            output_log_file: std::env::var("OUTPUT_LOG_FILE").unwrap_or(self.output_log_file),
            failure_log_file: std::env::var("FAILURE_LOG_FILE").unwrap_or(self.failure_log_file),
            verbose_logging: env_or("VERBOSE_LOGGING", self.verbose_logging),
            llm_api_key: std::env::var("LLM_API_KEY").unwrap_or(self.llm_api_key),
            llm_api_base_url: std::env::var("LLM_API_BASE_URL").unwrap_or(self.llm_api_base_url),
            llm_model_name: std::env::var("LLM_MODEL_NAME").unwrap_or(self.llm_model_name),
            llm_temperature: env_or("LLM_TEMPERATURE", self.llm_temperature),
            llm_max_tokens: env_or("LLM_MAX_TOKENS", self.llm_max_tokens),
            stage_timeout_secs: env_or("STAGE_TIMEOUT_SECS", self.stage_timeout_secs),
            synthesis_timeout_secs: env_or("SYNTHESIS_TIMEOUT_SECS", self.synthesis_timeout_secs),
            max_retries: env_or("MAX_RETRIES", self.max_retries),
            retry_backoff_ms: env_or("RETRY_BACKOFF_MS", self.retry_backoff_ms),
        }
    }

    pub fn from_env() -> Self {
        Self::default().with_env_overrides()
    }

    /// 从 TOML 文件读取，缺省的键使用默认值
    pub fn from_toml_file(path: &Path) -> AppResult<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| AppError::file_read_failed(path.display().to_string(), e))?;
        toml::from_str(&content).map_err(|e| {
            AppError::File(FileError::TomlParseFailed {
                path: path.display().to_string(),
                source: Box::new(e),
            })
        })
    }

    /// 读取 `PAPER_AUDIT_CONFIG` 指向的文件（如有），再应用环境变量并校验
    pub fn load() -> AppResult<Self> {
        let base = match std::env::var(CONFIG_PATH_ENV) {
            Ok(path) => Self::from_toml_file(Path::new(&path))?,
            Err(_) => Self::default(),
        };
        let config = base.with_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// 校验数值范围
    pub fn validate(&self) -> AppResult<()> {
        if self.max_concurrent_papers == 0 {
            return Err(ConfigError::InvalidValue {
                name: "max_concurrent_papers",
                reason: "必须大于 0".to_string(),
            }
            .into());
        }
        if self.stage_timeout_secs == 0 || self.synthesis_timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                name: "stage_timeout_secs",
                reason: "超时必须大于 0".to_string(),
            }
            .into());
        }
        if !(0.0..=2.0).contains(&self.llm_temperature) {
            return Err(ConfigError::InvalidValue {
                name: "llm_temperature",
                reason: format!("{} 不在 [0, 2] 内", self.llm_temperature),
            }
            .into());
        }
        Ok(())
    }
}
