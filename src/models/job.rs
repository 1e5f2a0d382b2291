use std::fmt::Display;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// 任务状态（序列化为固定字符串，供状态轮询方读取）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum JobStatus {
    #[serde(rename = "Processing")]
    Processing,
    #[serde(rename = "Processed")]
    Processed,
    #[serde(rename = "Processed, No questions found")]
    NoQuestionsFound,
    #[serde(rename = "Failed")]
    Failed,
}

impl JobStatus {
    /// 获取状态字符串
    pub fn as_str(self) -> &'static str {
        match self {
            JobStatus::Processing => "Processing",
            JobStatus::Processed => "Processed",
            JobStatus::NoQuestionsFound => "Processed, No questions found",
            JobStatus::Failed => "Failed",
        }
    }

    /// 是否已结束
    pub fn is_terminal(self) -> bool {
        !matches!(self, JobStatus::Processing)
    }
}

impl Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 单个上传文档的任务元数据
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobMetadata {
    #[serde(rename = "uuid")]
    pub id: Uuid,
    pub original_filename: String,
    #[serde(rename = "pdf_filepath")]
    pub source_path: PathBuf,
    #[serde(rename = "json_filepath")]
    pub result_path: PathBuf,
    pub status: JobStatus,
    pub upload_timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_timestamp: Option<DateTime<Utc>>,
}

impl JobMetadata {
    /// 新建处于 Processing 状态的任务
    pub fn new(
        id: Uuid,
        original_filename: impl Into<String>,
        source_path: impl Into<PathBuf>,
        result_path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            id,
            original_filename: original_filename.into(),
            source_path: source_path.into(),
            result_path: result_path.into(),
            status: JobStatus::Processing,
            upload_timestamp: Utc::now(),
            completed_timestamp: None,
        }
    }

    /// 应用局部更新
    pub fn apply(&mut self, patch: &JobPatch) {
        if let Some(status) = patch.status {
            self.status = status;
            if status.is_terminal() {
                self.completed_timestamp = Some(patch.at.unwrap_or_else(Utc::now));
            }
        }
    }
}

/// 元数据的局部更新
#[derive(Debug, Clone, Default)]
pub struct JobPatch {
    pub status: Option<JobStatus>,
    /// 更新时间（为空时取当前时间）
    pub at: Option<DateTime<Utc>>,
}

impl JobPatch {
    pub fn status(status: JobStatus) -> Self {
        Self {
            status: Some(status),
            at: None,
        }
    }
}
