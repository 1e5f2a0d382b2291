//! 文档任务调度器 - 编排层
//!
//! ## 职责
//!
//! 1. **登记任务**：写入 Processing 状态后立即返回任务票据
//! 2. **后台执行**：每个文档一个 tokio 任务，互不共享可变状态
//! 3. **完成回调**：根据结果写入 Processed / 无题目 / Failed 状态
//! 4. **结果文件**：把题目数组写成 `<output_dir>/<uuid>.json`
//!
//! 不支持取消；单个批次的失败在编排器内部已经降级，
//! 只有文档本身无法读取或结果无法写入时任务才会失败。

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::{error, info};
use uuid::Uuid;

use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::models::{load_document, JobMetadata, JobPatch, JobStatus, McqRecord, Paginator};
use crate::orchestrator::batch_orchestrator::BatchOrchestrator;
use crate::services::{ExtractionClient, MetadataStore};

/// 提交的文档任务
#[derive(Debug, Clone)]
pub struct JobRequest {
    /// 待处理的文档
    pub source_path: PathBuf,
    /// 上传时的原始文件名
    pub original_filename: String,
    /// 自定义抽取规则，可为空
    pub custom_instructions: String,
}

impl JobRequest {
    pub fn new(source_path: impl Into<PathBuf>) -> Self {
        let source_path = source_path.into();
        let original_filename = source_path
            .file_name()
            .unwrap_or_default()
            .to_string_lossy()
            .to_string();

        Self {
            source_path,
            original_filename,
            custom_instructions: String::new(),
        }
    }

    pub fn with_instructions(mut self, instructions: impl Into<String>) -> Self {
        self.custom_instructions = instructions.into();
        self
    }

    pub fn with_original_filename(mut self, name: impl Into<String>) -> Self {
        self.original_filename = name.into();
        self
    }
}

/// 任务票据
pub struct JobTicket {
    pub id: Uuid,
    handle: JoinHandle<JobStatus>,
}

impl JobTicket {
    /// 等待任务结束，返回最终状态
    pub async fn wait(self) -> JobStatus {
        match self.handle.await {
            Ok(status) => status,
            Err(e) => {
                error!("[文档 {}] 后台任务异常退出: {}", self.id, e);
                JobStatus::Failed
            }
        }
    }
}

/// 文档任务调度器
pub struct JobRunner<C, S> {
    inner: Arc<RunnerInner<C, S>>,
}

struct RunnerInner<C, S> {
    orchestrator: BatchOrchestrator<C>,
    store: Arc<S>,
    paginator: Arc<dyn Paginator>,
    pages_per_batch: usize,
    output_dir: PathBuf,
}

impl<C, S> Clone for JobRunner<C, S> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<C, S> JobRunner<C, S>
where
    C: ExtractionClient + 'static,
    S: MetadataStore + 'static,
{
    pub fn new(
        orchestrator: BatchOrchestrator<C>,
        store: Arc<S>,
        paginator: Arc<dyn Paginator>,
        config: &Config,
    ) -> Self {
        Self {
            inner: Arc::new(RunnerInner {
                orchestrator,
                store,
                paginator,
                pages_per_batch: config.pages_per_batch,
                output_dir: config.output_dir.clone(),
            }),
        }
    }

    pub fn store(&self) -> &Arc<S> {
        &self.inner.store
    }

    /// 提交文档：登记 Processing 状态后在后台处理，立即返回
    pub async fn submit(&self, request: JobRequest) -> AppResult<JobTicket> {
        let id = Uuid::new_v4();
        let result_path = self.inner.output_dir.join(format!("{id}.json"));

        let metadata = JobMetadata::new(
            id,
            request.original_filename.clone(),
            request.source_path.clone(),
            result_path.clone(),
        );
        self.inner.store.insert(metadata).await?;
        info!(
            "[文档 {}] 📥 已登记: {}，状态: {}",
            id,
            request.original_filename,
            JobStatus::Processing
        );

        let inner = self.inner.clone();
        let handle = tokio::spawn(async move {
            let status = match inner.process(id, &request, &result_path).await {
                Ok(status) => status,
                Err(e) => {
                    error!("[文档 {}] ❌ 处理失败: {}", id, e);
                    JobStatus::Failed
                }
            };
            inner.complete(id, status).await;
            status
        });

        Ok(JobTicket { id, handle })
    }

    /// 查询任务元数据
    pub async fn status(&self, id: Uuid) -> AppResult<Option<JobMetadata>> {
        Ok(self.inner.store.get(id).await?)
    }

    /// 读取已完成任务的结果；任务不存在或结果文件尚未生成时返回 None
    pub async fn result(&self, id: Uuid) -> AppResult<Option<Vec<McqRecord>>> {
        let Some(metadata) = self.inner.store.get(id).await? else {
            return Ok(None);
        };
        read_result(&metadata.result_path).await
    }
}

impl<C, S> RunnerInner<C, S>
where
    C: ExtractionClient,
    S: MetadataStore,
{
    async fn process(
        &self,
        id: Uuid,
        request: &JobRequest,
        result_path: &Path,
    ) -> AppResult<JobStatus> {
        info!("[文档 {}] 🚀 开始处理: {}", id, request.source_path.display());

        let document = load_document(self.paginator.clone(), &request.source_path).await?;

        let report = self
            .orchestrator
            .run_report(&document, self.pages_per_batch, &request.custom_instructions)
            .await;

        info!(
            "[文档 {}] 批次统计: 共 {}，处理 {}，跳过 {}",
            id, report.stats.total_batches, report.stats.processed, report.stats.skipped
        );

        write_result(result_path, &report.records).await?;
        info!("[文档 {}] 💾 结果已保存: {}", id, result_path.display());

        if report.records.is_empty() {
            info!("[文档 {}] 📭 未找到题目", id);
            Ok(JobStatus::NoQuestionsFound)
        } else {
            Ok(JobStatus::Processed)
        }
    }

    /// 完成回调：写入最终状态
    async fn complete(&self, id: Uuid, status: JobStatus) {
        match self.store.upsert(id, JobPatch::status(status)).await {
            Ok(_) => info!("[文档 {}] ✅ 状态更新为: {}", id, status),
            Err(e) => error!("[文档 {}] 状态更新失败 ({}): {}", id, status, e),
        }
    }
}

/// 写入结果文件（UTF-8 JSON 数组，保留非 ASCII 字符）
pub async fn write_result(path: &Path, records: &[McqRecord]) -> AppResult<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| AppError::result_write_failed(path, e))?;
    }

    let json = serde_json::to_string_pretty(records)?;
    tokio::fs::write(path, json)
        .await
        .map_err(|e| AppError::result_write_failed(path, e))
}

/// 读取结果文件；文件不存在返回 None
pub async fn read_result(path: &Path) -> AppResult<Option<Vec<McqRecord>>> {
    let content = match tokio::fs::read_to_string(path).await {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => {
            return Err(AppError::ResultReadFailed {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })
        }
    };

    serde_json::from_str(&content)
        .map(Some)
        .map_err(|e| AppError::ResultReadFailed {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
}
