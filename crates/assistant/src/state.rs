//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::SqlitePool;

use crate::config::AssistantConfig;
use crate::embedding::Embedder;
use crate::llm::ChatModel;
use crate::policy::PolicyQa;
use crate::search::{CatalogIndex, SearchParams};

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc`. Everything inside is
/// immutable after startup: handlers read the catalog index and policy
/// passages concurrently, and only the SQLite pool serializes writes.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: AssistantConfig,
    pool: SqlitePool,
    embedder: Arc<dyn Embedder>,
    catalog: Arc<CatalogIndex>,
    policy: Arc<PolicyQa>,
    chat_model: Arc<dyn ChatModel>,
    search_params: SearchParams,
}

impl AppState {
    /// Create a new application state.
    #[must_use]
    pub fn new(
        config: AssistantConfig,
        pool: SqlitePool,
        embedder: Arc<dyn Embedder>,
        catalog: Arc<CatalogIndex>,
        policy: Arc<PolicyQa>,
        chat_model: Arc<dyn ChatModel>,
    ) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                embedder,
                catalog,
                policy,
                chat_model,
                search_params: SearchParams::default(),
            }),
        }
    }

    /// Get a reference to the assistant configuration.
    #[must_use]
    pub fn config(&self) -> &AssistantConfig {
        &self.inner.config
    }

    /// Get a reference to the database connection pool.
    #[must_use]
    pub fn pool(&self) -> &SqlitePool {
        &self.inner.pool
    }

    /// Get a reference to the sentence-embedding model.
    #[must_use]
    pub fn embedder(&self) -> &Arc<dyn Embedder> {
        &self.inner.embedder
    }

    /// Get a reference to the catalog embedding index.
    #[must_use]
    pub fn catalog(&self) -> &Arc<CatalogIndex> {
        &self.inner.catalog
    }

    /// Get a reference to the policy Q&A pipeline.
    #[must_use]
    pub fn policy(&self) -> &Arc<PolicyQa> {
        &self.inner.policy
    }

    /// Get a reference to the chat language model.
    #[must_use]
    pub fn chat_model(&self) -> &Arc<dyn ChatModel> {
        &self.inner.chat_model
    }

    /// Get the catalog search parameters.
    #[must_use]
    pub fn search_params(&self) -> &SearchParams {
        &self.inner.search_params
    }
}
