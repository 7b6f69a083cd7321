//! Service-to-service authentication
//!
//! The workflow endpoints are called by the DevTel backend only. Each call
//! carries the shared `SERVICE_TOKEN` in the `X-Service-Token` header; there
//! are no user sessions.
//!
//! ```ignore
//! let protected = Router::new()
//!     .route("/workflows/prioritize", post(handler))
//!     .layer(middleware::from_fn_with_state(state.clone(), require_service_token));
//! ```

/// Axum middleware checking the shared service token.
pub mod middleware;

pub use middleware::{require_service_token, SERVICE_TOKEN_HEADER};
