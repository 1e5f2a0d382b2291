//! 批次构建 - 业务能力层
//!
//! 把文档按固定页数切成互不重叠的批次，并给出启发式题目数和字符数

use tracing::info;

use crate::models::{Batch, Document, Page};
use crate::services::heuristic::count_question_starts;

/// 批次构建器
#[derive(Debug, Clone)]
pub struct BatchBuilder {
    max_chars_per_batch: usize,
}

impl BatchBuilder {
    pub fn new(max_chars_per_batch: usize) -> Self {
        Self {
            max_chars_per_batch,
        }
    }

    pub fn max_chars_per_batch(&self) -> usize {
        self.max_chars_per_batch
    }

    /// 按页切分批次
    ///
    /// 每批最多 `pages_per_batch` 页（为 0 时按 1 处理），最后一批可以更短。
    /// 批次之间无重叠、无空隙，按页序覆盖全部页面。
    pub fn build(&self, document: &Document, pages_per_batch: usize) -> Vec<Batch> {
        let pages_per_batch = pages_per_batch.max(1);
        info!("📚 正在按页创建批次（每批 {} 页）...", pages_per_batch);

        let batches: Vec<Batch> = document
            .pages()
            .chunks(pages_per_batch)
            .enumerate()
            .map(|(index, pages)| {
                let batch = self.build_one(index + 1, pages);
                info!(
                    "✓ 创建批次 {}: 第 {}-{} 页（约 {} 道题，{} 字符）",
                    batch.batch_number,
                    batch.start_page,
                    batch.end_page,
                    batch.heuristic_count,
                    batch.char_count
                );
                batch
            })
            .collect();

        info!("共创建 {} 个批次", batches.len());
        batches
    }

    /// 字符数是否超过上限
    pub fn is_oversized(&self, batch: &Batch) -> bool {
        batch.char_count > self.max_chars_per_batch
    }

    fn build_one(&self, batch_number: usize, pages: &[Page]) -> Batch {
        let text = join_pages(pages);
        let start_page = pages.first().map(|p| p.number).unwrap_or(1);
        let end_page = pages.last().map(|p| p.number).unwrap_or(start_page);

        Batch {
            batch_number,
            start_page,
            end_page,
            heuristic_count: count_question_starts(&text),
            char_count: text.chars().count(),
            text,
        }
    }
}

/// 拼接页面文本，每页前插入带页码的分隔标记；空页不产生文本
fn join_pages(pages: &[Page]) -> String {
    let mut text = String::new();
    for page in pages.iter().filter(|p| !p.text.is_empty()) {
        text.push_str(&format!("\n--- Page {} ---\n", page.number));
        text.push_str(&page.text);
        text.push('\n');
    }
    text
}
