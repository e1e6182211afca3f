//! Policy Q&A over the SAC document.
//!
//! At startup the policy document is chunked into passages and each passage
//! is embedded, mirroring how the catalog corpus is indexed. Per request,
//! the customer's topic is embedded, the closest passages are retrieved,
//! and the language model grounds its answer in those excerpts.

pub mod chunker;

pub use chunker::chunk_document;

use std::path::Path;

use thiserror::Error;
use tracing::instrument;

use crate::embedding::{Embedder, EmbeddingError};
use crate::search::cosine_similarity;

/// How many passages ground each answer.
const RETRIEVAL_TOP_K: usize = 4;

/// Errors raised while building or querying the policy pipeline.
#[derive(Debug, Error)]
pub enum PolicyError {
    #[error("failed to read policy document {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("policy document has no content")]
    EmptyDocument,
    #[error("embedding error: {0}")]
    Embedding(#[from] EmbeddingError),
    #[error("passage/embedding length mismatch: {passages} passages, {vectors} vectors")]
    Misaligned { passages: usize, vectors: usize },
}

/// Retrieval state for the policy document.
///
/// Immutable after construction; passages and vectors are positionally
/// aligned, same as the catalog index.
pub struct PolicyQa {
    passages: Vec<String>,
    embeddings: Vec<Vec<f32>>,
}

impl PolicyQa {
    /// Chunk and embed a policy document.
    ///
    /// # Errors
    ///
    /// Returns `PolicyError::EmptyDocument` if chunking produces nothing,
    /// or `PolicyError::Embedding` if the passages cannot be encoded.
    pub fn build(embedder: &dyn Embedder, document: &str) -> Result<Self, PolicyError> {
        let passages = chunk_document(document);
        if passages.is_empty() {
            return Err(PolicyError::EmptyDocument);
        }

        let embeddings = embedder.embed_batch(&passages)?;
        if passages.len() != embeddings.len() {
            return Err(PolicyError::Misaligned {
                passages: passages.len(),
                vectors: embeddings.len(),
            });
        }

        Ok(Self {
            passages,
            embeddings,
        })
    }

    /// Load the document from disk, then chunk and embed it.
    ///
    /// # Errors
    ///
    /// Returns `PolicyError::Io` if the file cannot be read, plus every
    /// error [`PolicyQa::build`] can return.
    pub fn from_file(embedder: &dyn Embedder, path: &Path) -> Result<Self, PolicyError> {
        let document = std::fs::read_to_string(path).map_err(|source| PolicyError::Io {
            path: path.display().to_string(),
            source,
        })?;

        Self::build(embedder, &document)
    }

    /// Number of passages in the pipeline.
    #[must_use]
    pub fn len(&self) -> usize {
        self.passages.len()
    }

    /// Whether the pipeline holds no passages.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.passages.is_empty()
    }

    /// The passages most similar to the topic, best first.
    ///
    /// # Errors
    ///
    /// Returns `PolicyError::Embedding` if the topic cannot be encoded.
    #[instrument(skip(self, embedder))]
    pub fn retrieve(
        &self,
        embedder: &dyn Embedder,
        topic: &str,
    ) -> Result<Vec<&str>, PolicyError> {
        let topic_vector = embedder.embed(topic)?;

        let mut scored: Vec<(usize, f32)> = self
            .embeddings
            .iter()
            .map(|vector| cosine_similarity(&topic_vector, vector))
            .enumerate()
            .collect();

        scored.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));
        scored.truncate(RETRIEVAL_TOP_K);

        Ok(scored
            .into_iter()
            .filter_map(|(i, _)| self.passages.get(i).map(String::as_str))
            .collect())
    }
}

/// Build the grounded SAC prompt for the language model.
#[must_use]
pub fn build_prompt(topic: &str, passages: &[&str]) -> (String, String) {
    let system = "Você é um atendente experiente do SAC da Jacarandá. \
                  Responda com base nas políticas da empresa."
        .to_owned();

    let mut user = String::from("Trechos relevantes das políticas de SAC:\n");
    for passage in passages {
        user.push_str("\n---\n");
        user.push_str(passage);
    }
    user.push_str(&format!(
        "\n---\n\nCliente quer saber sobre: '{topic}'\n\
         Responda em português, citando apenas o que as políticas cobrem."
    ));

    (system, user)
}
