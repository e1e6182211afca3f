//! Product catalog loaded from a static JSON file at startup.
//!
//! The catalog is the corpus for semantic search: each product contributes
//! one text document (title + description) that is embedded once at startup
//! and never recomputed during the process lifetime.

use std::path::Path;

use jacaranda_core::Product;
use thiserror::Error;

/// Errors that can occur while loading the product catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to read catalog file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse catalog file {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Load the product catalog from a JSON file.
///
/// The file holds a JSON array of product records. Products are immutable
/// after load; a product's identity is its position in the returned vector.
///
/// # Errors
///
/// Returns `CatalogError` if the file cannot be read or parsed. Both are
/// startup failures - there is no fallback catalog.
pub fn load_products(path: &Path) -> Result<Vec<Product>, CatalogError> {
    let contents = std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
        path: path.display().to_string(),
        source,
    })?;

    serde_json::from_str(&contents).map_err(|source| CatalogError::Parse {
        path: path.display().to_string(),
        source,
    })
}

/// Build the text document embedded for a product.
///
/// Title and description concatenated with a single space, matching the
/// text the catalog embeddings are computed from.
#[must_use]
pub fn document_text(product: &Product) -> String {
    format!("{} {}", product.title, product.description)
}
