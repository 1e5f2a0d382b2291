use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::ConfigError;

/// 默认配置文件名（位于工作目录）
pub const DEFAULT_CONFIG_FILE: &str = "mcq_extract.toml";

/// 程序配置文件
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// 每个批次包含的页数
    pub pages_per_batch: usize,
    /// 单个批次的字符数上限（超过只告警）
    pub max_chars_per_batch: usize,
    /// 忽略窗口的最大题目数
    pub max_questions_to_ignore: usize,
    /// 是否显示详细日志
    pub verbose_logging: bool,
    /// 元数据列表文件
    pub metadata_path: PathBuf,
    /// 抽取结果输出目录
    pub output_dir: PathBuf,
    // --- LLM 配置 ---
    pub llm_api_key: String,
    pub llm_api_base_url: String,
    pub llm_model_name: String,
    pub llm_temperature: f32,
    pub llm_max_tokens: u32,
    /// 单次 LLM 调用超时（秒），为空则不限制
    pub llm_timeout_secs: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            pages_per_batch: 15,
            max_chars_per_batch: 15000,
            max_questions_to_ignore: 10,
            verbose_logging: false,
            metadata_path: PathBuf::from("metadata/metadata_list.json"),
            output_dir: PathBuf::from("Outputs"),
            llm_api_key: String::new(),
            llm_api_base_url: "https://api.openai.com/v1".to_string(),
            llm_model_name: "gemini-2.5-pro".to_string(),
            llm_temperature: 0.2,
            llm_max_tokens: 16384,
            llm_timeout_secs: None,
        }
    }
}

impl Config {
    /// 只从环境变量加载（未设置的项使用默认值）
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::default().with_env_overrides()
    }

    /// 从 TOML 文件加载，缺省项使用默认值
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let content =
            std::fs::read_to_string(path).map_err(|source| ConfigError::FileReadFailed {
                path: path.to_path_buf(),
                source,
            })?;
        toml::from_str(&content).map_err(|source| ConfigError::TomlParseFailed {
            path: path.to_path_buf(),
            source,
        })
    }

    /// 完整加载流程：配置文件（`MCQ_CONFIG` 或默认文件）→ 环境变量覆盖
    pub fn load() -> Result<Self, ConfigError> {
        let base = match std::env::var("MCQ_CONFIG") {
            Ok(path) => Self::from_toml_file(Path::new(&path))?,
            Err(_) if Path::new(DEFAULT_CONFIG_FILE).exists() => {
                Self::from_toml_file(Path::new(DEFAULT_CONFIG_FILE))?
            }
            Err(_) => Self::default(),
        };
        base.with_env_overrides()
    }

    fn with_env_overrides(self) -> Result<Self, ConfigError> {
        Ok(Self {
            pages_per_batch: env_parse("PAGES_PER_BATCH", "usize")?.unwrap_or(self.pages_per_batch),
            max_chars_per_batch: env_parse("MAX_CHARS_PER_BATCH", "usize")?
                .unwrap_or(self.max_chars_per_batch),
            max_questions_to_ignore: env_parse("MAX_QUESTIONS_TO_IGNORE", "usize")?
                .unwrap_or(self.max_questions_to_ignore),
            verbose_logging: env_parse("VERBOSE_LOGGING", "bool")?.unwrap_or(self.verbose_logging),
            metadata_path: std::env::var("METADATA_PATH").map(PathBuf::from).unwrap_or(self.metadata_path),
            output_dir: std::env::var("OUTPUT_DIR").map(PathBuf::from).unwrap_or(self.output_dir),
            // 未设置 LLM_API_KEY 时回退到 API_KEY
            llm_api_key: std::env::var("LLM_API_KEY")
                .or_else(|_| std::env::var("API_KEY"))
                .unwrap_or(self.llm_api_key),
            llm_api_base_url: std::env::var("LLM_API_BASE_URL").unwrap_or(self.llm_api_base_url),
            llm_model_name: std::env::var("LLM_MODEL_NAME").unwrap_or(self.llm_model_name),
            llm_temperature: env_parse("LLM_TEMPERATURE", "f32")?.unwrap_or(self.llm_temperature),
            llm_max_tokens: env_parse("LLM_MAX_TOKENS", "u32")?.unwrap_or(self.llm_max_tokens),
            llm_timeout_secs: env_parse("LLM_TIMEOUT_SECS", "u64")?.or(self.llm_timeout_secs),
        })
    }
}

/// 读取并解析环境变量；未设置返回 None，格式错误返回错误
fn env_parse<T: std::str::FromStr>(var_name: &str, expected_type: &str) -> Result<Option<T>, ConfigError> {
    match std::env::var(var_name) {
        Ok(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::EnvVarParseFailed {
                var_name: var_name.to_string(),
                value,
                expected_type: expected_type.to_string(),
            }),
        Err(_) => Ok(None),
    }
}
