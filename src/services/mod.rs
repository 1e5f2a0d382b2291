pub mod batch_builder;
pub mod extractor;
pub mod heuristic;
pub mod llm_service;
pub mod metadata_store;
pub mod retry;

pub use batch_builder::BatchBuilder;
pub use extractor::{ExtractionClient, ExtractionRequest, McqExtractor};
pub use heuristic::count_question_starts;
pub use llm_service::{LlmBackend, LlmService};
pub use metadata_store::{InMemoryStore, JsonFileStore, MetadataStore};
pub use retry::{OnExhausted, RetryPolicy};
