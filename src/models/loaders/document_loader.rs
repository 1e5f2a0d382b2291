use std::path::Path;
use std::sync::Arc;

use tracing::{debug, info};

use crate::error::DocumentError;
use crate::models::document::Document;

/// 文档分页器：把文件读成逐页文本
pub trait Paginator: Send + Sync {
    fn paginate(&self, path: &Path) -> Result<Document, DocumentError>;

    fn backend_name(&self) -> &str;
}

/// PDF 分页器（pdf-extract，适用于带文字层的 PDF）
#[derive(Debug, Default, Clone, Copy)]
pub struct PdfPaginator;

impl Paginator for PdfPaginator {
    fn paginate(&self, path: &Path) -> Result<Document, DocumentError> {
        let bytes = read_source(path, |p| std::fs::read(p))?;

        let page_texts = pdf_extract::extract_text_from_mem_by_pages(&bytes).map_err(|e| {
            DocumentError::PdfParseFailed {
                path: path.to_path_buf(),
                reason: e.to_string(),
            }
        })?;

        Ok(Document::from_page_texts(path, page_texts))
    }

    fn backend_name(&self) -> &str {
        "pdf-extract"
    }
}

/// 纯文本分页器，页与页之间以换页符 `\x0c` 分隔（pdftotext 的输出格式）
#[derive(Debug, Default, Clone, Copy)]
pub struct TextPaginator;

impl Paginator for TextPaginator {
    fn paginate(&self, path: &Path) -> Result<Document, DocumentError> {
        let content = read_source(path, |p| std::fs::read_to_string(p))?;
        Ok(split_pages(path, &content))
    }

    fn backend_name(&self) -> &str {
        "text"
    }
}

/// 按扩展名选择分页器：`.txt` 走纯文本，其余按 PDF 处理
#[derive(Debug, Default, Clone, Copy)]
pub struct AutoPaginator;

impl Paginator for AutoPaginator {
    fn paginate(&self, path: &Path) -> Result<Document, DocumentError> {
        let is_text = path
            .extension()
            .and_then(|s| s.to_str())
            .map(|ext| ext.eq_ignore_ascii_case("txt"))
            .unwrap_or(false);

        if is_text {
            TextPaginator.paginate(path)
        } else {
            PdfPaginator.paginate(path)
        }
    }

    fn backend_name(&self) -> &str {
        "auto"
    }
}

/// 在阻塞线程池中加载文档
pub async fn load_document(
    paginator: Arc<dyn Paginator>,
    path: &Path,
) -> Result<Document, DocumentError> {
    let owned = path.to_path_buf();
    let backend = paginator.backend_name().to_string();
    debug!("使用 {} 分页: {}", backend, owned.display());

    let document = tokio::task::spawn_blocking(move || paginator.paginate(&owned))
        .await
        .map_err(|e| DocumentError::TaskAborted(e.to_string()))??;

    info!("📄 文档总页数: {}", document.page_count());
    Ok(document)
}

fn read_source<T>(
    path: &Path,
    read: impl FnOnce(&Path) -> std::io::Result<T>,
) -> Result<T, DocumentError> {
    if !path.is_file() {
        return Err(DocumentError::NotFound {
            path: path.to_path_buf(),
        });
    }
    read(path).map_err(|source| DocumentError::ReadFailed {
        path: path.to_path_buf(),
        source,
    })
}

fn split_pages(path: &Path, content: &str) -> Document {
    let mut pages: Vec<&str> = content.split('\x0c').collect();
    // 末尾的换页符不产生新页
    if pages.len() > 1 && pages.last().is_some_and(|p| p.trim().is_empty()) {
        pages.pop();
    }
    if content.is_empty() {
        pages.clear();
    }
    Document::from_page_texts(path, pages)
}
