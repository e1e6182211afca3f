//! HTTP route handlers for the assistant API.
//!
//! # Route Structure
//!
//! ```text
//! POST /mensagem     - Route a customer message to a pipeline and log it
//! GET  /historico    - Interaction log, newest first
//! GET  /health       - Liveness check (registered in main)
//! GET  /health/ready - Readiness check with DB ping (registered in main)
//! ```

pub mod history;
pub mod messages;

use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

/// Create all routes for the assistant API.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/mensagem", post(messages::send))
        .route("/historico", get(history::list))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::path::PathBuf;
    use std::sync::Arc;
    use std::time::Duration;

    use axum::body::Body;
    use axum::http::{Request, StatusCode, header};
    use rust_decimal::Decimal;
    use secrecy::SecretString;
    use serde_json::{Value, json};
    use tower::ServiceExt;

    use jacaranda_core::Product;

    use super::*;
    use crate::config::{AssistantConfig, EmbeddingConfig, LlmConfig};
    use crate::db::{self, InteractionRepository};
    use crate::embedding::{Embedder, EmbeddingError};
    use crate::llm::{ChatModel, LlmError};
    use crate::policy::PolicyQa;
    use crate::search::{CatalogIndex, NO_RESULTS_MESSAGE};
    use crate::state::AppState;

    /// Deterministic embedder: known keywords map onto fixed axes.
    struct KeywordEmbedder;

    impl Embedder for KeywordEmbedder {
        fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
            let text = text.to_lowercase();
            Ok(if text.contains("coat") || text.contains("jacket") {
                vec![1.0, 0.0, 0.0, 0.0]
            } else if text.contains("dress") {
                vec![0.0, 1.0, 0.0, 0.0]
            } else if text.contains("troca") {
                vec![0.0, 0.0, 1.0, 0.0]
            } else {
                vec![0.0, 0.0, 0.0, 1.0]
            })
        }

        fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
            texts.iter().map(|text| self.embed(text)).collect()
        }

        fn dimension(&self) -> usize {
            4
        }
    }

    /// Chat model that answers with a fixed SAC reply.
    struct CannedModel;

    #[async_trait::async_trait]
    impl ChatModel for CannedModel {
        async fn complete(&self, _system: &str, _user: &str) -> Result<String, LlmError> {
            Ok("Conforme as políticas, trocas podem ser feitas em até 30 dias.".to_owned())
        }
    }

    fn test_config() -> AssistantConfig {
        AssistantConfig {
            database_url: SecretString::from("sqlite::memory:"),
            host: "127.0.0.1".parse().unwrap(),
            port: 8000,
            catalog_path: PathBuf::from("data/products.json"),
            policy_doc_path: PathBuf::from("data/policies.md"),
            embedding: EmbeddingConfig {
                model_id: "test-model".to_owned(),
                revision: "main".to_owned(),
            },
            llm: LlmConfig {
                api_base: "http://localhost:9".to_owned(),
                api_key: SecretString::from("test-key"),
                model: "test".to_owned(),
                timeout: Duration::from_secs(1),
            },
            sentry_dsn: None,
        }
    }

    async fn test_state() -> AppState {
        let pool = db::tests::test_pool().await;

        let embedder: Arc<dyn Embedder> = Arc::new(KeywordEmbedder);
        let products = vec![
            Product {
                title: "Blue Jacket".to_owned(),
                description: "warm coat for cold days".to_owned(),
                price: Decimal::new(19990, 2),
                image: "https://cdn.example.com/blue-jacket.jpg".to_owned(),
            },
            Product {
                title: "Summer Dress".to_owned(),
                description: "light and fresh".to_owned(),
                price: Decimal::new(8950, 2),
                image: "https://cdn.example.com/summer-dress.jpg".to_owned(),
            },
        ];
        let texts: Vec<String> = products.iter().map(crate::catalog::document_text).collect();
        let embeddings = embedder.embed_batch(&texts).unwrap();
        let catalog = CatalogIndex::new(products, embeddings).unwrap();

        let policy = PolicyQa::build(
            embedder.as_ref(),
            "## Trocas\n\nTrocas podem ser feitas em até 30 dias corridos da compra.",
        )
        .unwrap();

        AppState::new(
            test_config(),
            pool,
            embedder,
            Arc::new(catalog),
            Arc::new(policy),
            Arc::new(CannedModel),
        )
    }

    fn app(state: AppState) -> Router {
        routes().with_state(state)
    }

    fn post_message(kind: &str, text: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/mensagem")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(
                json!({"type": kind, "text": text}).to_string(),
            ))
            .unwrap()
    }

    async fn body_json(response: axum::response::Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    async fn log_count(state: &AppState) -> usize {
        InteractionRepository::new(state.pool())
            .list()
            .await
            .unwrap()
            .len()
    }

    #[tokio::test]
    async fn test_catalog_message_returns_products_and_logs() {
        let state = test_state().await;

        let response = app(state.clone()).oneshot(post_message("catalog", "warm coat")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await;
        let reply = body["response"].as_str().unwrap();
        assert!(reply.contains("Blue Jacket"));
        assert!(reply.contains("R$ 199.90"));

        assert_eq!(log_count(&state).await, 1);
    }

    #[tokio::test]
    async fn test_catalog_miss_returns_no_results_message() {
        let state = test_state().await;

        let response = app(state.clone()).oneshot(post_message("catalog", "sunglasses")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await;
        assert_eq!(body["response"], NO_RESULTS_MESSAGE);

        // A retrieval miss is a successful request; it is logged.
        assert_eq!(log_count(&state).await, 1);
    }

    #[tokio::test]
    async fn test_policy_message_returns_grounded_answer() {
        let state = test_state().await;

        let response = app(state.clone()).oneshot(post_message("policy", "como funciona a troca?")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await;
        assert!(body["response"].as_str().unwrap().contains("30 dias"));

        assert_eq!(log_count(&state).await, 1);
    }

    #[tokio::test]
    async fn test_invalid_type_is_rejected_and_not_logged() {
        let state = test_state().await;

        let response = app(state.clone()).oneshot(post_message("sac", "qualquer coisa")).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = body_json(response).await;
        assert!(body["error"].as_str().unwrap().contains("Invalid type"));

        assert_eq!(log_count(&state).await, 0);
    }

    #[tokio::test]
    async fn test_empty_text_is_rejected() {
        let state = test_state().await;

        let response = app(state.clone()).oneshot(post_message("catalog", "   ")).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        assert_eq!(log_count(&state).await, 0);
    }

    #[tokio::test]
    async fn test_history_is_newest_first() {
        let state = test_state().await;

        let first = app(state.clone()).oneshot(post_message("catalog", "warm coat")).await.unwrap();
        assert_eq!(first.status(), StatusCode::OK);
        let second = app(state.clone()).oneshot(post_message("policy", "troca")).await.unwrap();
        assert_eq!(second.status(), StatusCode::OK);

        let response = app(state.clone())
            .oneshot(Request::builder().uri("/historico").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await;
        let entries = body.as_array().unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0]["user"], "troca");
        assert_eq!(entries[1]["user"], "warm coat");
        assert!(entries[0]["id"].as_i64().unwrap() > entries[1]["id"].as_i64().unwrap());
    }
}
