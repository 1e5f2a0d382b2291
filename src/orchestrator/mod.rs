//! 编排层（Orchestration Layer）
//!
//! ## 模块划分
//!
//! ### `batch_orchestrator` - 单个文档的批次编排
//! - 切分批次、跳过无题批次
//! - 串行调用抽取客户端，维护忽略窗口
//! - 合并结果并重新编号
//!
//! ### `job_runner` - 文档任务调度
//! - 登记任务状态（Processing）并在后台执行
//! - 完成后写结果文件、更新状态
//!
//! ## 层次关系
//!
//! ```text
//! job_runner (处理 Vec<Document>，每个文档一个后台任务)
//!     ↓
//! batch_orchestrator (处理 Vec<Batch>，严格串行)
//!     ↓
//! services (能力层：batch_builder / extractor / llm / metadata_store)
//! ```

pub mod batch_orchestrator;
pub mod ignore_window;
pub mod job_runner;

// 重新导出主要类型
pub use batch_orchestrator::{BatchOrchestrator, RunReport, RunStats};
pub use ignore_window::{window_size_for, IgnoreWindow};
pub use job_runner::{read_result, write_result, JobRequest, JobRunner, JobTicket};
