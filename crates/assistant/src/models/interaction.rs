//! Interaction log domain types.
//!
//! These types represent validated domain objects separate from the
//! database row types in `db::interactions`.

use jacaranda_core::InteractionId;

/// One handled message: what the customer sent and what the assistant
/// replied, with a server-assigned id and timestamp.
///
/// Append-only - never updated or deleted after creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Interaction {
    /// Unique, monotonically increasing record id.
    pub id: InteractionId,
    /// Stored as `YYYY-MM-DD HH:MM:SS` (UTC, second precision).
    pub timestamp: String,
    /// The customer's message text.
    pub user_prompt: String,
    /// The assistant's reply.
    pub agent_response: String,
}
