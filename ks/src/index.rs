//! In-memory vector index with cosine-similarity search

use serde::Serialize;
use tracing::debug;

/// One indexed chunk with its embedding
#[derive(Debug, Clone)]
struct IndexEntry {
    content: String,
    source: String,
    embedding: Vec<f32>,
}

/// A scored retrieval result
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RetrievalHit {
    /// Chunk text
    pub content: String,
    /// File name the chunk came from
    pub source: String,
    /// Cosine similarity against the query, higher is more relevant
    pub similarity_score: f32,
}

/// Immutable nearest-neighbor index over embedded chunks
///
/// Built once per ingestion and replaced wholesale on rebuild. Search is a
/// linear scan, which holds up fine at knowledge-base scale.
#[derive(Debug, Default)]
pub struct VectorIndex {
    entries: Vec<IndexEntry>,
}

impl VectorIndex {
    /// Build from chunk (content, source) pairs and their embeddings, in
    /// matching order
    pub fn build(chunks: Vec<(String, String)>, embeddings: Vec<Vec<f32>>) -> Self {
        debug!(chunk_count = chunks.len(), "Building vector index");
        let entries = chunks
            .into_iter()
            .zip(embeddings)
            .map(|((content, source), embedding)| IndexEntry {
                content,
                source,
                embedding,
            })
            .collect();
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Return the `top_k` most similar entries, descending by score, with
    /// insertion order as the tie-break
    pub fn search(&self, query: &[f32], top_k: usize) -> Vec<RetrievalHit> {
        debug!(top_k, entries = self.entries.len(), "Searching vector index");
        let mut scored: Vec<(usize, f32)> = self
            .entries
            .iter()
            .enumerate()
            .map(|(i, entry)| (i, cosine_similarity(query, &entry.embedding)))
            .collect();
        scored.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));
        scored.truncate(top_k);

        scored
            .into_iter()
            .map(|(i, score)| {
                let entry = &self.entries[i];
                RetrievalHit {
                    content: entry.content.clone(),
                    source: entry.source.clone(),
                    similarity_score: score,
                }
            })
            .collect()
    }
}

fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b = b.iter().map(|y| y * y).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cosine_similarity_identical_vectors() {
        let score = cosine_similarity(&[0.5, 0.5, 0.0], &[0.5, 0.5, 0.0]);
        assert!((score - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_cosine_similarity_orthogonal_vectors() {
        let score = cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]);
        assert!(score.abs() < 1e-6);
    }

    #[test]
    fn test_cosine_similarity_zero_norm_guard() {
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 2.0]), 0.0);
        assert_eq!(cosine_similarity(&[1.0, 2.0], &[0.0, 0.0]), 0.0);
    }

    #[test]
    fn test_search_orders_by_similarity() {
        let index = VectorIndex::build(
            vec![
                ("庭園".to_string(), "a.md".to_string()),
                ("寺院".to_string(), "b.md".to_string()),
                ("温泉".to_string(), "c.md".to_string()),
            ],
            vec![vec![0.0, 1.0], vec![1.0, 0.0], vec![0.7, 0.7]],
        );

        let hits = index.search(&[1.0, 0.0], 2);

        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].content, "寺院");
        assert_eq!(hits[0].source, "b.md");
        assert!((hits[0].similarity_score - 1.0).abs() < 1e-6);
        assert_eq!(hits[1].content, "温泉");
    }

    #[test]
    fn test_search_breaks_ties_by_insertion_order() {
        let index = VectorIndex::build(
            vec![
                ("先に入れた".to_string(), "a.md".to_string()),
                ("後に入れた".to_string(), "b.md".to_string()),
            ],
            vec![vec![1.0, 0.0], vec![1.0, 0.0]],
        );

        let hits = index.search(&[1.0, 0.0], 2);

        assert_eq!(hits[0].content, "先に入れた");
        assert_eq!(hits[1].content, "後に入れた");
    }

    #[test]
    fn test_search_caps_at_top_k_and_handles_overshoot() {
        let index = VectorIndex::build(
            vec![("唯一".to_string(), "a.md".to_string())],
            vec![vec![1.0]],
        );

        assert!(index.search(&[1.0], 0).is_empty());
        assert_eq!(index.search(&[1.0], 5).len(), 1);
    }
}
