//! Startup construction of the catalog embedding index.
//!
//! Runs once, before the server accepts traffic, so the corpus and its
//! index stay aligned for the whole process lifetime. A restart is the only
//! way the embeddings are ever recomputed.

use std::path::Path;

use tracing::info;

use super::{CatalogIndex, SearchError};
use crate::catalog::{self, CatalogError};
use crate::embedding::Embedder;

/// Errors raised while building the index at startup.
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    #[error(transparent)]
    Search(#[from] SearchError),
}

/// Load the catalog file and embed every product.
///
/// Blocking: encodes the whole corpus in one pass. The server wraps this in
/// `spawn_blocking` at startup.
///
/// # Errors
///
/// Returns `BuildError` if the catalog cannot be loaded or the corpus
/// cannot be embedded.
pub fn build_index(embedder: &dyn Embedder, path: &Path) -> Result<CatalogIndex, BuildError> {
    let products = catalog::load_products(path)?;
    info!(count = products.len(), "Loaded product catalog");

    let texts: Vec<String> = products.iter().map(catalog::document_text).collect();
    let embeddings = embedder.embed_batch(&texts).map_err(SearchError::from)?;

    let index = CatalogIndex::new(products, embeddings)?;
    info!(count = index.len(), "Catalog embedding index built");

    Ok(index)
}
