pub mod batch;
pub mod document;
pub mod job;
pub mod loaders;
pub mod record;

pub use batch::Batch;
pub use document::{Document, Page};
pub use job::{JobMetadata, JobPatch, JobStatus};
pub use loaders::{load_document, AutoPaginator, Paginator, PdfPaginator, TextPaginator};
pub use record::{renumber, McqRecord};
