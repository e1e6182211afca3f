//! Semantic product search over the in-memory catalog.
//!
//! The index holds one embedding vector per product, positionally aligned
//! with the catalog: index `i` of one always describes index `i` of the
//! other. A query is embedded with the same model, scored by cosine
//! similarity against every product vector, and the best matches above a
//! relevance threshold are rendered as a customer-facing text block.

mod indexer;

use jacaranda_core::Product;
use tracing::instrument;

use crate::embedding::{Embedder, EmbeddingError};

pub use indexer::{BuildError, build_index};

/// Fixed reply when nothing scores above the relevance threshold.
pub const NO_RESULTS_MESSAGE: &str = "❌ Nenhum produto encontrado.";

/// Search parameters.
///
/// The defaults are tunable, not load-bearing: 5 results and a 0.4 cosine
/// floor keep replies short without dropping obvious matches.
#[derive(Debug, Clone)]
pub struct SearchParams {
    /// Maximum number of results to return.
    pub top_k: usize,
    /// Results at or below this cosine similarity are dropped.
    pub min_score: f32,
}

impl Default for SearchParams {
    fn default() -> Self {
        Self {
            top_k: 5,
            min_score: 0.4,
        }
    }
}

/// A product matched by a query.
#[derive(Debug, Clone)]
pub struct ScoredProduct {
    pub product: Product,
    pub score: f32,
}

/// Errors raised by index construction or search.
#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    #[error("embedding error: {0}")]
    Embedding(#[from] EmbeddingError),
    #[error("index error: {0}")]
    Index(String),
}

/// The catalog embedding index.
///
/// Immutable after construction: products and vectors are computed once at
/// startup and shared read-only across requests. Searching has no side
/// effects - the reply is a pure function of (query, corpus, index).
pub struct CatalogIndex {
    products: Vec<Product>,
    embeddings: Vec<Vec<f32>>,
}

impl CatalogIndex {
    /// Build an index from products and their embeddings.
    ///
    /// # Errors
    ///
    /// Returns `SearchError::Index` if the two sequences differ in length.
    pub fn new(products: Vec<Product>, embeddings: Vec<Vec<f32>>) -> Result<Self, SearchError> {
        if products.len() != embeddings.len() {
            return Err(SearchError::Index(format!(
                "corpus/embedding length mismatch: {} products, {} vectors",
                products.len(),
                embeddings.len()
            )));
        }

        Ok(Self {
            products,
            embeddings,
        })
    }

    /// Number of products in the index.
    #[must_use]
    pub fn len(&self) -> usize {
        self.products.len()
    }

    /// Whether the index holds no products.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    /// Search the catalog.
    ///
    /// Embeds the query with the same model used for the corpus, scores it
    /// against every product vector, and returns at most `params.top_k`
    /// results with similarity strictly greater than `params.min_score`, in
    /// descending similarity order. Equal scores keep catalog order, so
    /// results are deterministic.
    ///
    /// # Errors
    ///
    /// Returns `SearchError::Embedding` if the query cannot be encoded.
    #[instrument(skip(self, embedder))]
    pub fn search(
        &self,
        embedder: &dyn Embedder,
        query: &str,
        params: &SearchParams,
    ) -> Result<Vec<ScoredProduct>, SearchError> {
        let query_vector = embedder.embed(query)?;

        let mut scored: Vec<(usize, f32)> = self
            .embeddings
            .iter()
            .map(|vector| cosine_similarity(&query_vector, vector))
            .enumerate()
            .collect();

        // Descending score; ties keep the original catalog position.
        scored.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));
        scored.truncate(params.top_k);

        Ok(scored
            .into_iter()
            .filter(|&(_, score)| score > params.min_score)
            .filter_map(|(i, score)| {
                self.products
                    .get(i)
                    .map(|product| ScoredProduct {
                        product: product.clone(),
                        score,
                    })
            })
            .collect())
    }
}

/// Cosine similarity between two vectors.
///
/// Returns 0.0 when either vector has zero norm, so degenerate inputs rank
/// below any real match instead of poisoning the sort with NaN.
#[must_use]
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        0.0
    } else {
        dot / (norm_a * norm_b)
    }
}

/// Render matched products as the reply text, one block per product, in the
/// order given (descending similarity). An empty slice renders the fixed
/// no-results message.
#[must_use]
pub fn render_results(results: &[ScoredProduct]) -> String {
    if results.is_empty() {
        return NO_RESULTS_MESSAGE.to_owned();
    }

    let mut reply = String::new();
    for ScoredProduct { product, .. } in results {
        reply.push_str(&format!(
            "\n🛍️ *{}*\n💲 {}\n📄 {}\n🖼️ {}\n",
            product.title,
            product.display_price(),
            product.description,
            product.image,
        ));
    }

    reply.trim().to_owned()
}
