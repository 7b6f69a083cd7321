//! Client for the backend's agent bridge
//!
//! Every tool the agents use is a thin call through [`BackendClient`]. Writes
//! are never performed directly; they are filed as proposals that a human
//! approves in the product UI.

/// HTTP client, request scope and retry policy.
pub mod client;

pub use client::{BackendClient, ProposalDraft, RequestScope, RetryPolicy};
