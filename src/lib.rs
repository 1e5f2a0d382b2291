//! # MCQ Extract
//!
//! 把长篇分页文档（PDF / 带换页符的文本）按页切成批次，逐批交给 LLM 抽取选择题，
//! 合并成一份不重复、连续编号的题目列表。
//!
//! ## 架构设计
//!
//! ### ① 数据层（Models）
//! - `models/` - 文档、批次、题目记录、任务元数据
//! - `models/loaders` - 文档分页器（PDF / 文本）
//!
//! ### ② 业务能力层（Services）
//! - `heuristic` - 题目起始行启发式计数
//! - `BatchBuilder` - 按页切分批次
//! - `LlmService` - LLM 调用能力
//! - `McqExtractor` - 提示词构建、响应解析、重试降级
//! - `MetadataStore` - 任务状态存储
//!
//! ### ③ 编排层（Orchestration）
//! - `orchestrator/batch_orchestrator` - 单个文档的批次编排与去重
//! - `orchestrator/job_runner` - 文档任务的后台执行与状态更新
//!
//! ## 模块结构

pub mod config;
pub mod error;
pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;

// 重新导出常用类型
pub use config::Config;
pub use error::{AppError, AppResult};
pub use models::{Document, JobMetadata, JobStatus, McqRecord};
pub use orchestrator::{BatchOrchestrator, JobRequest, JobRunner};
pub use services::{ExtractionClient, LlmService, McqExtractor};
