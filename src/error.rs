use std::path::PathBuf;

use thiserror::Error;
use uuid::Uuid;

/// 应用程序错误类型
#[derive(Debug, Error)]
pub enum AppError {
    /// 文档读取 / 分页错误
    #[error("文档错误: {0}")]
    Document(#[from] DocumentError),
    /// 抽取服务错误
    #[error("抽取错误: {0}")]
    Extraction(#[from] ExtractionError),
    /// 元数据存储错误
    #[error("存储错误: {0}")]
    Store(#[from] StoreError),
    /// 配置错误
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),
    /// 结果文件写入失败
    #[error("写入结果文件失败 ({}): {source}", path.display())]
    ResultWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// 结果文件读取或解析失败
    #[error("读取结果文件失败 ({}): {reason}", path.display())]
    ResultReadFailed { path: PathBuf, reason: String },
    /// 序列化失败
    #[error("JSON序列化失败: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// 文档相关错误
#[derive(Debug, Error)]
pub enum DocumentError {
    /// 文件不存在
    #[error("文件不存在: {}", path.display())]
    NotFound { path: PathBuf },
    /// 读取文件失败
    #[error("读取文件失败 ({}): {source}", path.display())]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// PDF 解析失败
    #[error("PDF解析失败 ({}): {reason}", path.display())]
    PdfParseFailed { path: PathBuf, reason: String },
    /// 后台分页任务异常退出
    #[error("分页任务异常退出: {0}")]
    TaskAborted(String),
}

/// 抽取服务错误
#[derive(Debug, Error)]
pub enum ExtractionError {
    /// API 调用失败
    #[error("LLM API调用失败 (模型: {model}): {source}")]
    ApiCallFailed {
        model: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// 返回内容为空
    #[error("LLM返回内容为空 (模型: {model})")]
    EmptyContent { model: String },
    /// 调用超时
    #[error("LLM调用超时 (模型: {model}, {secs}秒)")]
    Timeout { model: String, secs: u64 },
    /// 返回内容不是合法的题目数组
    #[error("无法解析LLM返回的JSON (响应: {preview}): {source}")]
    DecodeFailed {
        preview: String,
        #[source]
        source: serde_json::Error,
    },
}

impl ExtractionError {
    /// 是否是响应解析失败（值得用相同输入重试）
    pub fn is_decode_failure(&self) -> bool {
        matches!(self, ExtractionError::DecodeFailed { .. })
    }
}

/// 元数据存储错误
#[derive(Debug, Error)]
pub enum StoreError {
    /// 读写元数据文件失败
    #[error("元数据文件读写失败 ({}): {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// 元数据文件内容无法解析
    #[error("元数据文件格式错误 ({}): {source}", path.display())]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    /// 任务不存在
    #[error("任务不存在: {0}")]
    JobNotFound(Uuid),
    /// 任务已存在
    #[error("任务已存在: {0}")]
    DuplicateJob(Uuid),
}

/// 配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    /// 读取配置文件失败
    #[error("读取配置文件失败 ({}): {source}", path.display())]
    FileReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// TOML 解析失败
    #[error("TOML解析失败 ({}): {source}", path.display())]
    TomlParseFailed {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    /// 环境变量解析失败
    #[error("环境变量 {var_name} 解析失败: 值 '{value}' 无法转换为 {expected_type}")]
    EnvVarParseFailed {
        var_name: String,
        value: String,
        expected_type: String,
    },
}

// ========== 便捷构造函数 ==========

impl ExtractionError {
    /// 创建LLM API调用错误
    pub fn api_failed(
        model: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        ExtractionError::ApiCallFailed {
            model: model.into(),
            source: Box::new(source),
        }
    }
}

impl AppError {
    /// 创建结果文件写入错误
    pub fn result_write_failed(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        AppError::ResultWriteFailed {
            path: path.into(),
            source,
        }
    }
}

// ========== Result 类型别名 ==========

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;
