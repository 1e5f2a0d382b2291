//! 任务元数据存储 - 业务能力层
//!
//! 对外只暴露按 id 的读取和更新；"读全表 → 修改 → 写全表"在实现内部加锁完成，
//! 多个文档同时结束时不会丢失更新。

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::error::StoreError;
use crate::models::{JobMetadata, JobPatch};

/// 元数据存储接口
#[async_trait]
pub trait MetadataStore: Send + Sync {
    /// 新增任务记录
    async fn insert(&self, metadata: JobMetadata) -> Result<(), StoreError>;

    /// 按 id 读取
    async fn get(&self, id: Uuid) -> Result<Option<JobMetadata>, StoreError>;

    /// 按 id 更新，返回更新后的记录
    async fn upsert(&self, id: Uuid, patch: JobPatch) -> Result<JobMetadata, StoreError>;

    /// 全部记录（按插入顺序）
    async fn list(&self) -> Result<Vec<JobMetadata>, StoreError>;
}

/// 以 JSON 数组文件（metadata_list.json）保存的元数据
pub struct JsonFileStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_all(&self) -> Result<Vec<JobMetadata>, StoreError> {
        let content = match fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(source) => {
                return Err(StoreError::Io {
                    path: self.path.clone(),
                    source,
                })
            }
        };

        if content.trim().is_empty() {
            return Ok(Vec::new());
        }

        serde_json::from_str(&content).map_err(|source| StoreError::Corrupt {
            path: self.path.clone(),
            source,
        })
    }

    /// 先写临时文件再改名，读者不会看到写了一半的文件
    async fn write_all(&self, list: &[JobMetadata]) -> Result<(), StoreError> {
        let io_err = |source: std::io::Error| StoreError::Io {
            path: self.path.clone(),
            source,
        };

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await.map_err(io_err)?;
        }

        let json = serde_json::to_string_pretty(list).map_err(|source| StoreError::Corrupt {
            path: self.path.clone(),
            source,
        })?;

        let tmp_path = self.path.with_extension("json.tmp");
        fs::write(&tmp_path, json).await.map_err(io_err)?;
        fs::rename(&tmp_path, &self.path).await.map_err(io_err)?;

        debug!("元数据已写入: {}（{} 条）", self.path.display(), list.len());
        Ok(())
    }
}

#[async_trait]
impl MetadataStore for JsonFileStore {
    async fn insert(&self, metadata: JobMetadata) -> Result<(), StoreError> {
        let _guard = self.lock.lock().await;

        // 文件损坏时从空列表重新开始，不阻塞新的上传
        let mut list = match self.read_all().await {
            Ok(list) => list,
            Err(StoreError::Corrupt { path, source }) => {
                warn!("⚠️ 元数据文件无法解析，重新创建 ({}): {}", path.display(), source);
                Vec::new()
            }
            Err(e) => return Err(e),
        };

        if list.iter().any(|m| m.id == metadata.id) {
            return Err(StoreError::DuplicateJob(metadata.id));
        }

        list.push(metadata);
        self.write_all(&list).await
    }

    async fn get(&self, id: Uuid) -> Result<Option<JobMetadata>, StoreError> {
        let _guard = self.lock.lock().await;
        Ok(self.read_all().await?.into_iter().find(|m| m.id == id))
    }

    async fn upsert(&self, id: Uuid, patch: JobPatch) -> Result<JobMetadata, StoreError> {
        let _guard = self.lock.lock().await;
        let mut list = self.read_all().await?;

        let metadata = list
            .iter_mut()
            .find(|m| m.id == id)
            .ok_or(StoreError::JobNotFound(id))?;
        metadata.apply(&patch);
        let updated = metadata.clone();

        self.write_all(&list).await?;
        Ok(updated)
    }

    async fn list(&self) -> Result<Vec<JobMetadata>, StoreError> {
        let _guard = self.lock.lock().await;
        self.read_all().await
    }
}

/// 内存中的元数据存储
#[derive(Default)]
pub struct InMemoryStore {
    inner: RwLock<InMemoryInner>,
}

#[derive(Default)]
struct InMemoryInner {
    order: Vec<Uuid>,
    jobs: HashMap<Uuid, JobMetadata>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl MetadataStore for InMemoryStore {
    async fn insert(&self, metadata: JobMetadata) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;
        if inner.jobs.contains_key(&metadata.id) {
            return Err(StoreError::DuplicateJob(metadata.id));
        }
        inner.order.push(metadata.id);
        inner.jobs.insert(metadata.id, metadata);
        Ok(())
    }

    async fn get(&self, id: Uuid) -> Result<Option<JobMetadata>, StoreError> {
        Ok(self.inner.read().await.jobs.get(&id).cloned())
    }

    async fn upsert(&self, id: Uuid, patch: JobPatch) -> Result<JobMetadata, StoreError> {
        let mut inner = self.inner.write().await;
        let metadata = inner.jobs.get_mut(&id).ok_or(StoreError::JobNotFound(id))?;
        metadata.apply(&patch);
        Ok(metadata.clone())
    }

    async fn list(&self) -> Result<Vec<JobMetadata>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner
            .order
            .iter()
            .filter_map(|id| inner.jobs.get(id).cloned())
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::JobStatus;
    use std::sync::Arc;

    fn job() -> JobMetadata {
        JobMetadata::new(Uuid::new_v4(), "paper.pdf", "tempUploads/p.pdf", "Outputs/p.json")
    }

    #[tokio::test]
    async fn test_file_store_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("metadata").join("metadata_list.json"));

        let meta = job();
        store.insert(meta.clone()).await.unwrap();

        let loaded = store.get(meta.id).await.unwrap().unwrap();
        assert_eq!(loaded, meta);

        let updated = store
            .upsert(meta.id, JobPatch::status(JobStatus::Processed))
            .await
            .unwrap();
        assert_eq!(updated.status, JobStatus::Processed);
        assert_eq!(
            store.get(meta.id).await.unwrap().unwrap().status,
            JobStatus::Processed
        );
    }

    #[tokio::test]
    async fn test_missing_file_is_empty_list() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("none.json"));
        assert!(store.list().await.unwrap().is_empty());
        assert!(store.get(Uuid::new_v4()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_upsert_unknown_job_fails() {
        let store = InMemoryStore::new();
        let err = store
            .upsert(Uuid::new_v4(), JobPatch::status(JobStatus::Failed))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::JobNotFound(_)));
    }

    #[tokio::test]
    async fn test_duplicate_insert_rejected() {
        let store = InMemoryStore::new();
        let meta = job();
        store.insert(meta.clone()).await.unwrap();
        assert!(matches!(
            store.insert(meta).await.unwrap_err(),
            StoreError::DuplicateJob(_)
        ));
    }

    #[tokio::test]
    async fn test_corrupt_file_is_recreated_on_insert() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("metadata_list.json");
        std::fs::write(&path, "{ not a list").unwrap();

        let store = JsonFileStore::new(&path);
        assert!(matches!(store.list().await.unwrap_err(), StoreError::Corrupt { .. }));

        store.insert(job()).await.unwrap();
        assert_eq!(store.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_concurrent_updates_are_not_lost() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(JsonFileStore::new(dir.path().join("metadata_list.json")));

        let jobs: Vec<JobMetadata> = (0..8).map(|_| job()).collect();
        for meta in &jobs {
            store.insert(meta.clone()).await.unwrap();
        }

        let handles: Vec<_> = jobs
            .iter()
            .map(|meta| {
                let store = store.clone();
                let id = meta.id;
                tokio::spawn(async move {
                    store.upsert(id, JobPatch::status(JobStatus::Processed)).await
                })
            })
            .collect();

        for result in futures::future::join_all(handles).await {
            result.unwrap().unwrap();
        }

        let list = store.list().await.unwrap();
        assert_eq!(list.len(), 8);
        assert!(list.iter().all(|m| m.status == JobStatus::Processed));
    }
}
