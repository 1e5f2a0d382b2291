//! 忽略窗口
//!
//! 保存上一批末尾的若干道题，随下一批一起发给模型，避免批次交界处的题目被重复抽取。
//! 窗口大小只在第一个真正调用了模型的批次上计算一次，之后整个运行期间保持不变。

use crate::models::{Batch, McqRecord};

/// 窗口大小：每页平均题数（向下取整），不超过上限
pub fn window_size_for(extracted: usize, pages_in_batch: usize, cap: usize) -> usize {
    if pages_in_batch == 0 {
        return 0;
    }
    (extracted / pages_in_batch).min(cap)
}

/// 滚动忽略窗口
#[derive(Debug, Clone)]
pub struct IgnoreWindow {
    cap: usize,
    size: Option<usize>,
    records: Vec<McqRecord>,
}

impl IgnoreWindow {
    pub fn new(cap: usize) -> Self {
        Self {
            cap,
            size: None,
            records: Vec::new(),
        }
    }

    /// 已确定的窗口大小；还没有批次被处理时为 None
    pub fn size(&self) -> Option<usize> {
        self.size
    }

    pub fn records(&self) -> &[McqRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// 用本批的输出刷新窗口：取本批最后 min(输出数, 窗口大小) 道题
    pub fn advance(&mut self, batch: &Batch, batch_results: &[McqRecord]) {
        let cap = self.cap;
        let size = *self
            .size
            .get_or_insert_with(|| window_size_for(batch_results.len(), batch.page_span(), cap));

        let keep = batch_results.len().min(size);
        self.records = batch_results[batch_results.len() - keep..].to_vec();
    }
}
