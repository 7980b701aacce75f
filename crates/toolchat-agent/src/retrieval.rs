//! In-memory semantic search over embedded documents.
//!
//! Documents are embedded once through the Model Client; a query is embedded the
//! same way and ranked against them by cosine similarity.

use std::sync::Arc;

use tracing::debug;

use toolchat_core::ModelError;
use toolchat_providers::traits::LlmProvider;

/// A piece of text plus where it came from.
#[derive(Clone, Debug, PartialEq)]
pub struct Document {
    pub content: String,
    pub source: String,
}

impl Document {
    pub fn new(content: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            source: source.into(),
        }
    }
}

/// A ranked search result.
#[derive(Clone, Debug, PartialEq)]
pub struct SearchHit {
    pub document: Document,
    pub score: f32,
}

pub struct MemoryIndex {
    provider: Arc<dyn LlmProvider>,
    model: String,
    entries: Vec<(Document, Vec<f32>)>,
}

impl MemoryIndex {
    /// Embed `documents` in one request and keep them in memory.
    pub async fn build(
        provider: Arc<dyn LlmProvider>,
        model: impl Into<String>,
        documents: Vec<Document>,
    ) -> Result<Self, ModelError> {
        let model = model.into();
        let texts: Vec<String> = documents.iter().map(|d| d.content.clone()).collect();
        let vectors = provider.embed(&texts, &model).await?;
        if vectors.len() != documents.len() {
            return Err(ModelError::Protocol(format!(
                "expected {} embeddings, got {}",
                documents.len(),
                vectors.len()
            )));
        }
        debug!(documents = documents.len(), model = %model, "index built");

        Ok(Self {
            provider,
            model,
            entries: documents.into_iter().zip(vectors).collect(),
        })
    }

    /// The `k` documents most similar to `query`, best first.
    pub async fn search(&self, query: &str, k: usize) -> Result<Vec<SearchHit>, ModelError> {
        let query_vector = self
            .provider
            .embed(&[query.to_string()], &self.model)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| ModelError::Protocol("no embedding returned for query".into()))?;

        let mut hits: Vec<SearchHit> = self
            .entries
            .iter()
            .map(|(document, vector)| SearchHit {
                document: document.clone(),
                score: cosine_similarity(&query_vector, vector),
            })
            .collect();
        hits.sort_by(|a, b| b.score.total_cmp(&a.score));
        hits.truncate(k);
        Ok(hits)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Cosine of the angle between two vectors. Zero for mismatched or zero-length input.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

/// Split `text` on `separator` and pack the pieces into chunks of at most
/// `chunk_size` characters. Consecutive chunks share up to `overlap` characters of
/// trailing pieces. A single piece longer than `chunk_size` becomes its own chunk.
pub fn split_text(text: &str, separator: &str, chunk_size: usize, overlap: usize) -> Vec<String> {
    let sep_len = separator.chars().count();
    let mut chunks = Vec::new();
    let mut current: Vec<&str> = Vec::new();
    let mut current_len = 0;

    for piece in text.split(separator).map(str::trim).filter(|p| !p.is_empty()) {
        let piece_len = piece.chars().count();

        if !current.is_empty() && current_len + sep_len + piece_len > chunk_size {
            chunks.push(current.join(separator));
            while !current.is_empty()
                && (current_len > overlap || current_len + sep_len + piece_len > chunk_size)
            {
                let front_len = current.remove(0).chars().count();
                current_len = if current.is_empty() {
                    0
                } else {
                    current_len - front_len - sep_len
                };
            }
        }

        current_len = if current.is_empty() {
            piece_len
        } else {
            current_len + sep_len + piece_len
        };
        current.push(piece);
    }

    if !current.is_empty() {
        chunks.push(current.join(separator));
    }
    chunks
}
