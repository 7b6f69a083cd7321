//! API request handlers.

/// Agent catalog, insights and summaries.
pub mod agents;
/// Chat message processing and title generation.
pub mod chat;
/// Liveness endpoints for both services.
pub mod health;
/// Provider cascade status.
pub mod providers;
/// DevTel AI workflow endpoints.
pub mod workflows;
