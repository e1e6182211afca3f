//! Sentence embeddings for the search and policy pipelines.
//!
//! [`Embedder`] abstracts the sentence-embedding model so retrieval logic
//! can be exercised with a deterministic implementation in tests. The
//! production implementation is [`BertEmbedder`], a BERT encoder running
//! locally on Candle.

pub mod bert;

pub use bert::BertEmbedder;

use thiserror::Error;

/// Errors raised while loading the model or encoding text.
#[derive(Debug, Error)]
pub enum EmbeddingError {
    /// Model files could not be fetched from the Hugging Face Hub.
    #[error("failed to fetch model files: {0}")]
    Fetch(String),

    /// Model files exist but could not be loaded.
    #[error("failed to load model: {0}")]
    Load(String),

    /// Input text could not be tokenized.
    #[error("tokenization failed: {0}")]
    Tokenize(String),

    /// The forward pass failed.
    #[error("inference failed: {0}")]
    Inference(#[from] candle_core::Error),
}

/// A sentence-embedding model.
///
/// Implementations must be deterministic - the same text always maps to the
/// same vector - and every vector must have exactly [`Embedder::dimension`]
/// entries. Queries and corpus documents must go through the same
/// implementation for similarities to be meaningful.
pub trait Embedder: Send + Sync {
    /// Embed a single text.
    ///
    /// # Errors
    ///
    /// Returns `EmbeddingError` if tokenization or inference fails. The
    /// failure propagates to the caller as a request failure - it is never
    /// swallowed here.
    fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError>;

    /// Embed a batch of texts, preserving input order.
    ///
    /// # Errors
    ///
    /// Returns `EmbeddingError` if tokenization or inference fails.
    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError>;

    /// Length of the vectors produced by this model.
    fn dimension(&self) -> usize;
}
