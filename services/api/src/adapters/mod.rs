pub mod catalog_file;
pub mod client_pool;
pub mod db;
pub mod embeddings;
pub mod generation_llm;
pub mod title_llm;
pub mod vector_index;

pub use catalog_file::FileCatalogAdapter;
pub use client_pool::ClientPool;
pub use db::DbAdapter;
pub use embeddings::OpenAiEmbeddingAdapter;
pub use generation_llm::OpenAiGenerationAdapter;
pub use title_llm::OpenAiTitleAdapter;
pub use vector_index::PineconeAdapter;
