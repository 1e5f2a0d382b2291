use std::path::{Path, PathBuf};

/// 文档中的单页
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    /// 页码（从 1 开始）
    pub number: usize,
    /// 抽取出的文本，可能为空
    pub text: String,
}

/// 已加载的文档，加载后不再修改
#[derive(Debug, Clone)]
pub struct Document {
    source: PathBuf,
    pages: Vec<Page>,
}

impl Document {
    /// 按顺序构建文档，页码依次为 1..=N
    pub fn from_page_texts<I, S>(source: impl Into<PathBuf>, texts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let pages = texts
            .into_iter()
            .enumerate()
            .map(|(i, text)| Page {
                number: i + 1,
                text: text.into(),
            })
            .collect();

        Self {
            source: source.into(),
            pages,
        }
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }
}
