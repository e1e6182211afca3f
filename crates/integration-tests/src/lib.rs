//! End-to-end tests for the Jacarandá assistant API.
//!
//! # Running Tests
//!
//! ```bash
//! # Start the assistant (downloads the embedding model on first run)
//! cargo run -p jacaranda-assistant
//!
//! # Run end-to-end tests against it
//! cargo test -p jacaranda-integration-tests -- --ignored
//! ```
//!
//! The tests talk to a running server over HTTP. Configure the base URL
//! with `ASSISTANT_BASE_URL` (default: `http://localhost:8000`).

/// Base URL for the assistant API (configurable via environment).
#[must_use]
pub fn assistant_base_url() -> String {
    std::env::var("ASSISTANT_BASE_URL").unwrap_or_else(|_| "http://localhost:8000".to_owned())
}
