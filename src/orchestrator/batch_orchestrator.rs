//! 批次编排器 - 编排层
//!
//! ## 职责
//!
//! 按页序逐批调用抽取客户端，维护忽略窗口，合并结果并重新编号。
//!
//! ## 处理流程
//!
//! 1. **切分批次**：委托 `BatchBuilder`，没有批次直接返回空结果
//! 2. **跳过空批次**：启发式题目数为 0 的批次不调用模型
//! 3. **抽取**：带上忽略窗口和自定义规则调用抽取客户端，失败降级为空
//! 4. **刷新窗口**：窗口大小由第一个处理的批次确定，之后不变
//! 5. **合并编号**：按批次顺序合并，序号重排为 1..=N
//!
//! 批次之间严格串行：下一批的忽略窗口依赖上一批的输出。

use tracing::{error, info, warn};

use crate::config::Config;
use crate::models::{renumber, Document, McqRecord};
use crate::orchestrator::ignore_window::IgnoreWindow;
use crate::services::{BatchBuilder, ExtractionClient, ExtractionRequest};
use crate::utils::logging::log_batch_start;

/// 单次运行的统计
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RunStats {
    /// 批次总数
    pub total_batches: usize,
    /// 调用了模型的批次数
    pub processed: usize,
    /// 因启发式计数为 0 跳过的批次数
    pub skipped: usize,
}

/// 运行结果
#[derive(Debug, Default, Clone)]
pub struct RunReport {
    /// 合并并重新编号后的题目
    pub records: Vec<McqRecord>,
    pub stats: RunStats,
    /// 本次运行使用的忽略窗口大小（没有批次被处理时为 None）
    pub window_size: Option<usize>,
}

/// 批次编排器
pub struct BatchOrchestrator<C> {
    client: C,
    builder: BatchBuilder,
    max_questions_to_ignore: usize,
}

impl<C: ExtractionClient> BatchOrchestrator<C> {
    pub fn new(client: C, max_chars_per_batch: usize, max_questions_to_ignore: usize) -> Self {
        Self {
            client,
            builder: BatchBuilder::new(max_chars_per_batch),
            max_questions_to_ignore,
        }
    }

    pub fn from_config(client: C, config: &Config) -> Self {
        Self::new(
            client,
            config.max_chars_per_batch,
            config.max_questions_to_ignore,
        )
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    /// 处理整份文档，返回按顺序合并、重新编号后的题目
    pub async fn run(
        &self,
        document: &Document,
        pages_per_batch: usize,
        custom_instructions: &str,
    ) -> Vec<McqRecord> {
        self.run_report(document, pages_per_batch, custom_instructions)
            .await
            .records
    }

    /// 同 [`run`](Self::run)，额外返回统计信息
    pub async fn run_report(
        &self,
        document: &Document,
        pages_per_batch: usize,
        custom_instructions: &str,
    ) -> RunReport {
        info!("\n\t\t 处理文档 {}\t\t", document.source().display());
        if custom_instructions.trim().is_empty() {
            info!("使用内置抽取规则");
        } else {
            info!("使用自定义抽取规则");
        }

        let batches = self.builder.build(document, pages_per_batch);
        if batches.is_empty() {
            warn!("⚠️ 没有可处理的批次");
            return RunReport::default();
        }

        let mut stats = RunStats {
            total_batches: batches.len(),
            ..Default::default()
        };
        let mut window = IgnoreWindow::new(self.max_questions_to_ignore);
        let mut all_records = Vec::new();

        for batch in &batches {
            log_batch_start(
                batch.batch_number,
                batches.len(),
                batch.start_page,
                batch.end_page,
            );
            info!("{} 预计题目数: {}", batch, batch.heuristic_count);

            if batch.heuristic_count == 0 {
                info!("{} 未发现题目，跳过", batch);
                stats.skipped += 1;
                continue;
            }

            if self.builder.is_oversized(batch) {
                warn!(
                    "⚠️ {} 过大（{} 字符 > {}），可能被截断，建议减少每批页数",
                    batch,
                    batch.char_count,
                    self.builder.max_chars_per_batch()
                );
            }

            if !window.is_empty() {
                info!("忽略上一批的 {} 道题", window.len());
            }

            let request = ExtractionRequest {
                text: &batch.text,
                ignore_window: window.records(),
                custom_instructions,
            };

            let batch_results = match self.client.extract(&request).await {
                Ok(records) => records,
                Err(e) => {
                    error!("{} ❌ 抽取失败，本批按 0 道题处理: {}", batch, e);
                    Vec::new()
                }
            };

            window.advance(batch, &batch_results);
            stats.processed += 1;

            info!("✓ {} 抽取到 {} 道题", batch, batch_results.len());
            info!("下一批将忽略 {} 道题", window.len());

            all_records.extend(batch_results);
        }

        renumber(&mut all_records);
        info!("\n📊 共抽取 {} 道题", all_records.len());

        RunReport {
            records: all_records,
            stats,
            window_size: window.size(),
        }
    }
}
