//! KnowledgeStore - embedding-backed retrieval for travel planning
//!
//! Ingests plain-text knowledge documents, splits them into overlapping
//! chunks along Japanese-markdown boundaries, embeds every chunk, and
//! answers similarity queries from an in-memory vector index.
//!
//! # Architecture
//!
//! ```text
//! knowledge_base/
//! ├── kyoto.md          one document per file
//! └── onsen-guide.md
//!        │
//!        ▼ initialize(): load -> chunk -> embed -> build index
//! KnowledgeStore
//! └── RwLock<Option<VectorIndex>>   read-mostly, rebuilt wholesale
//! ```
//!
//! # Example
//!
//! ```ignore
//! use knowledgestore::{KnowledgeStore, OpenAIEmbeddings};
//!
//! let embedder = Arc::new(OpenAIEmbeddings::new(api_key, model, base_url, timeout)?);
//! let store = KnowledgeStore::new(embedder);
//! store.initialize(Path::new("knowledge_base")).await?;
//! let hits = store.query("京都 観光 2泊3日", 3).await?;
//! ```

pub mod chunker;
pub mod document;
pub mod embedding;
mod error;
mod index;
mod store;

pub use chunker::TextChunker;
pub use document::KnowledgeDocument;
pub use embedding::{EmbeddingClient, EmbeddingError, OpenAIEmbeddings};
pub use error::StoreError;
pub use index::{RetrievalHit, VectorIndex};
pub use store::{IngestStats, KnowledgeStore, UNINITIALIZED_NOTICE};

/// Default chunk size in characters
pub const DEFAULT_CHUNK_SIZE: usize = 500;

/// Default overlap between adjacent chunks in characters
pub const DEFAULT_CHUNK_OVERLAP: usize = 50;
