//! Message routing: dispatch a customer message to a pipeline and log it.

use std::sync::Arc;

use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::db::InteractionRepository;
use crate::error::{AppError, Result};
use crate::policy;
use crate::search;
use crate::state::AppState;

/// Longest message text processed; anything beyond is trimmed.
const MAX_TEXT_CHARS: usize = 2_000;

/// Incoming customer message.
#[derive(Debug, Deserialize)]
pub struct MessageRequest {
    /// Pipeline selector: "catalog" or "policy".
    #[serde(rename = "type")]
    pub kind: String,
    /// The customer's message text.
    pub text: String,
}

/// Successful reply.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub response: String,
}

/// The two pipelines a message can be routed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MessageKind {
    Catalog,
    Policy,
}

impl MessageKind {
    /// Parse the wire tag. Unknown tags are rejected before any pipeline
    /// runs or anything is logged.
    fn parse(tag: &str) -> Option<Self> {
        match tag {
            "catalog" => Some(Self::Catalog),
            "policy" => Some(Self::Policy),
            _ => None,
        }
    }
}

/// Handle `POST /mensagem`.
///
/// Dispatches by the `type` tag, appends exactly one interaction record on
/// success, and returns the pipeline's reply. An invalid tag fails before
/// any pipeline is invoked and is not logged.
#[instrument(skip(state, request))]
pub async fn send(
    State(state): State<AppState>,
    Json(request): Json<MessageRequest>,
) -> Result<Json<MessageResponse>> {
    let kind = MessageKind::parse(&request.kind)
        .ok_or_else(|| AppError::InvalidMessageType(request.kind.clone()))?;

    let text = normalize_text(&request.text)?;

    let response = match kind {
        MessageKind::Catalog => catalog_reply(&state, text.clone()).await?,
        MessageKind::Policy => policy_reply(&state, &text).await?,
    };

    InteractionRepository::new(state.pool())
        .append(&text, &response)
        .await?;

    Ok(Json(MessageResponse { response }))
}

/// Reject empty input; trim surrounding whitespace and excessive length.
fn normalize_text(text: &str) -> Result<String> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(AppError::BadRequest("text must not be empty".to_owned()));
    }

    Ok(trimmed.chars().take(MAX_TEXT_CHARS).collect())
}

/// Catalog pipeline: semantic search rendered as a product list.
///
/// Encoding the query is CPU-bound, so it runs on the blocking pool.
async fn catalog_reply(state: &AppState, query: String) -> Result<String> {
    let embedder = Arc::clone(state.embedder());
    let index = Arc::clone(state.catalog());
    let params = state.search_params().clone();

    let results =
        tokio::task::spawn_blocking(move || index.search(embedder.as_ref(), &query, &params))
            .await
            .map_err(|e| AppError::Internal(format!("search task failed: {e}")))??;

    Ok(search::render_results(&results))
}

/// Policy pipeline: retrieve grounding passages, then ask the model.
async fn policy_reply(state: &AppState, topic: &str) -> Result<String> {
    let embedder = Arc::clone(state.embedder());
    let policy = Arc::clone(state.policy());
    let owned_topic = topic.to_owned();

    let passages: Vec<String> = tokio::task::spawn_blocking(move || {
        policy.retrieve(embedder.as_ref(), &owned_topic).map(|found| {
            found
                .into_iter()
                .map(str::to_owned)
                .collect::<Vec<String>>()
        })
    })
    .await
    .map_err(|e| AppError::Internal(format!("retrieval task failed: {e}")))??;

    let refs: Vec<&str> = passages.iter().map(String::as_str).collect();
    let (system, user) = policy::build_prompt(topic, &refs);

    Ok(state.chat_model().complete(&system, &user).await?)
}
