use crate::types::AppError;
use crate::AppState;
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

pub const SERVICE_TOKEN_HEADER: &str = "X-Service-Token";

/// Reject requests whose `X-Service-Token` is missing or wrong
pub async fn require_service_token(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = req
        .headers()
        .get(SERVICE_TOKEN_HEADER)
        .and_then(|h| h.to_str().ok());

    if !token_matches(token, &state.settings.service_token) {
        tracing::warn!(path = %req.uri().path(), "Rejected request with invalid service token");
        return Err(AppError::Auth("Invalid service token".to_string()));
    }

    Ok(next.run(req).await)
}

fn token_matches(presented: Option<&str>, expected: &str) -> bool {
    match presented {
        Some(token) => !expected.is_empty() && token == expected,
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_matches() {
        assert!(token_matches(Some("dev-token"), "dev-token"));
        assert!(!token_matches(Some("nope"), "dev-token"));
        assert!(!token_matches(None, "dev-token"));
        assert!(!token_matches(Some(""), ""));
    }
}
