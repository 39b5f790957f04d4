//! Knowledge store: ingestion pipeline and query serving

use std::path::Path;
use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::chunker::TextChunker;
use crate::document::load_documents;
use crate::embedding::EmbeddingClient;
use crate::error::StoreError;
use crate::index::{RetrievalHit, VectorIndex};

/// Sentinel content returned when querying before a successful build
pub const UNINITIALIZED_NOTICE: &str = "ナレッジベースが初期化されていません";

/// Number of chunks sent per embedding request
const EMBED_BATCH_SIZE: usize = 100;

/// Ingestion counters for operator display
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestStats {
    /// Documents loaded from the source directory
    pub document_count: usize,
    /// Chunks embedded into the index
    pub chunk_count: usize,
}

/// Embedding-backed retrieval store over a directory of documents
///
/// `initialize` runs load -> chunk -> embed -> build and swaps the new index
/// in wholesale; `query` serves reads against the current index. The index
/// sits behind an `RwLock` so a rebuild never tears a query in half.
pub struct KnowledgeStore {
    embedder: Arc<dyn EmbeddingClient>,
    chunker: TextChunker,
    index: RwLock<Option<VectorIndex>>,
}

impl KnowledgeStore {
    pub fn new(embedder: Arc<dyn EmbeddingClient>) -> Self {
        Self::with_chunker(embedder, TextChunker::default())
    }

    pub fn with_chunker(embedder: Arc<dyn EmbeddingClient>, chunker: TextChunker) -> Self {
        Self {
            embedder,
            chunker,
            index: RwLock::new(None),
        }
    }

    /// Rebuild the index from every document under `dir`
    ///
    /// An empty directory leaves the index unset and queries degrade to the
    /// uninitialized sentinel. An embedding failure propagates and keeps the
    /// previous index serving.
    pub async fn initialize(&self, dir: &Path) -> Result<IngestStats, StoreError> {
        info!(dir = %dir.display(), "Building knowledge index");
        let documents = load_documents(dir)?;

        let mut chunks: Vec<(String, String)> = Vec::new();
        for doc in &documents {
            let doc_chunks = self.chunker.split(&doc.content);
            debug!(source = %doc.source, chunk_count = doc_chunks.len(), "Chunked document");
            chunks.extend(doc_chunks.into_iter().map(|c| (c, doc.source.clone())));
        }

        if chunks.is_empty() {
            warn!(dir = %dir.display(), "No indexable content found, index left unset");
            *self.index.write().await = None;
            return Ok(IngestStats {
                document_count: documents.len(),
                chunk_count: 0,
            });
        }

        let mut embeddings = Vec::with_capacity(chunks.len());
        for batch in chunks.chunks(EMBED_BATCH_SIZE) {
            let texts: Vec<String> = batch.iter().map(|(content, _)| content.clone()).collect();
            embeddings.extend(self.embedder.embed(&texts).await?);
        }

        let stats = IngestStats {
            document_count: documents.len(),
            chunk_count: chunks.len(),
        };
        *self.index.write().await = Some(VectorIndex::build(chunks, embeddings));
        info!(
            document_count = stats.document_count,
            chunk_count = stats.chunk_count,
            "Knowledge index built"
        );
        Ok(stats)
    }

    /// Query the index, returning at most `top_k` hits by descending
    /// similarity
    ///
    /// The unset-index check runs before the query text is embedded, so an
    /// empty knowledge base never touches the embedding backend at query
    /// time.
    pub async fn query(&self, text: &str, top_k: usize) -> Result<Vec<RetrievalHit>, StoreError> {
        debug!(%text, top_k, "Querying knowledge index");
        let guard = self.index.read().await;
        let Some(index) = guard.as_ref() else {
            debug!("Index unset, returning uninitialized sentinel");
            return Ok(vec![RetrievalHit {
                content: UNINITIALIZED_NOTICE.to_string(),
                source: String::new(),
                similarity_score: 0.0,
            }]);
        };

        let mut vectors = self.embedder.embed(&[text.to_string()]).await?;
        let query_vec = vectors.pop().unwrap_or_default();
        Ok(index.search(&query_vec, top_k))
    }
}
