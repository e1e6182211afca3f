//! Interaction log route handler.

use axum::{Json, extract::State};
use serde::Serialize;
use tracing::instrument;

use crate::db::InteractionRepository;
use crate::error::Result;
use crate::models::Interaction;
use crate::state::AppState;

/// One interaction log entry as returned by `GET /historico`.
#[derive(Debug, Serialize)]
pub struct HistoryEntry {
    pub id: i64,
    /// `YYYY-MM-DD HH:MM:SS` (UTC)
    pub timestamp: String,
    /// What the customer sent.
    pub user: String,
    /// What the assistant replied.
    pub agent: String,
}

impl From<Interaction> for HistoryEntry {
    fn from(interaction: Interaction) -> Self {
        Self {
            id: interaction.id.as_i64(),
            timestamp: interaction.timestamp,
            user: interaction.user_prompt,
            agent: interaction.agent_response,
        }
    }
}

/// Handle `GET /historico`: the full interaction log, newest first.
///
/// A read failure surfaces as a failed response rather than partial data.
#[instrument(skip(state))]
pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<HistoryEntry>>> {
    let interactions = InteractionRepository::new(state.pool()).list().await?;

    Ok(Json(interactions.into_iter().map(Into::into).collect()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use jacaranda_core::InteractionId;

    use super::*;

    #[test]
    fn test_history_entry_field_names() {
        let entry = HistoryEntry::from(Interaction {
            id: InteractionId::new(1),
            timestamp: "2026-08-06 12:00:00".to_owned(),
            user_prompt: "tem casaco azul?".to_owned(),
            agent_response: "temos sim".to_owned(),
        });

        let value = serde_json::to_value(&entry).unwrap();
        assert_eq!(value["id"], 1);
        assert_eq!(value["timestamp"], "2026-08-06 12:00:00");
        assert_eq!(value["user"], "tem casaco azul?");
        assert_eq!(value["agent"], "temos sim");
    }
}
