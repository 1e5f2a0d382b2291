use std::fmt::Display;

/// 页码范围批次
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Batch {
    /// 批次编号（从 1 开始）
    pub batch_number: usize,
    /// 起始页（含，从 1 开始）
    pub start_page: usize,
    /// 结束页（含）
    pub end_page: usize,
    /// 拼接后的文本（带分页标记）
    pub text: String,
    /// 启发式估计的题目数量
    pub heuristic_count: usize,
    /// 字符数
    pub char_count: usize,
}

impl Batch {
    /// 本批次覆盖的页数
    pub fn page_span(&self) -> usize {
        self.end_page + 1 - self.start_page
    }
}

impl Display for Batch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[批次 #{} 页 {}-{}]",
            self.batch_number, self.start_page, self.end_page
        )
    }
}
