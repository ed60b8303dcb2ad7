use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};
use std::collections::HashSet;

use crate::error::WebError;

/// Bearer-token guard for write endpoints. Reads are public.
pub async fn require_auth(
    State(api_keys): State<ApiKeys>,
    req: Request,
    next: Next,
) -> Result<Response, WebError> {
    let token = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "));

    match token {
        Some(token) if api_keys.is_valid(token) => Ok(next.run(req).await),
        _ => {
            tracing::warn!("Invalid API key attempt");
            Err(WebError::Unauthorized)
        }
    }
}

#[derive(Clone)]
pub struct ApiKeys {
    keys: HashSet<String>,
}

impl ApiKeys {
    pub fn from_comma_separated(keys_str: &str) -> Self {
        let keys = keys_str
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect();

        Self { keys }
    }

    pub fn is_valid(&self, key: &str) -> bool {
        self.keys.contains(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keys_parsed_and_trimmed() {
        let keys = ApiKeys::from_comma_separated("alpha, beta ,,  gamma");

        assert!(keys.is_valid("alpha"));
        assert!(keys.is_valid("beta"));
        assert!(keys.is_valid("gamma"));
        assert!(!keys.is_valid(""));
        assert!(!keys.is_valid("delta"));
    }

    #[test]
    fn test_empty_configuration_rejects_everything() {
        let keys = ApiKeys::from_comma_separated("");

        assert!(!keys.is_valid(""));
        assert!(!keys.is_valid("anything"));
    }
}
