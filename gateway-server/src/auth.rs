//! Authentication middleware.
//!
//! Resolves the bearer token of every request into a [`Caller`] and stores it
//! in the request extensions. A missing or unknown token yields an anonymous
//! caller; it is up to each operation to refuse anonymous writes.

use axum::extract::{Request, State};
use axum::http::header::AUTHORIZATION;
use axum::middleware::Next;
use axum::response::Response;
use sha2::{Digest, Sha256};
use std::collections::HashMap;

use crate::api::error::{ApiError, ApiResult};
use crate::config::ApiToken;
use crate::state::AppState;

/// An authenticated identity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub username: String,
}

/// Who is performing a request
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Caller(Option<Principal>);

impl Caller {
    pub fn anonymous() -> Self {
        Self(None)
    }

    pub fn authenticated(username: impl Into<String>) -> Self {
        Self(Some(Principal {
            username: username.into(),
        }))
    }

    pub fn principal(&self) -> Option<&Principal> {
        self.0.as_ref()
    }

    /// The principal, or Forbidden when the caller is anonymous.
    pub fn require_principal(&self) -> ApiResult<&Principal> {
        self.0.as_ref().ok_or(ApiError::Forbidden)
    }
}

/// Lookup table from token hash to username
///
/// Only SHA-256 digests of the configured tokens are kept in memory.
#[derive(Debug, Clone, Default)]
pub struct TokenTable {
    by_hash: HashMap<String, String>,
}

impl TokenTable {
    pub fn new(tokens: &[ApiToken]) -> Self {
        let by_hash = tokens
            .iter()
            .map(|t| (hash_token(&t.token), t.username.clone()))
            .collect();
        Self { by_hash }
    }

    /// Resolve a raw bearer token to the caller it identifies.
    pub fn resolve(&self, token: &str) -> Caller {
        match self.by_hash.get(&hash_token(token)) {
            Some(username) => Caller::authenticated(username.clone()),
            None => Caller::anonymous(),
        }
    }

    pub fn len(&self) -> usize {
        self.by_hash.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_hash.is_empty()
    }
}

/// Hash a token for lookup.
fn hash_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    hex::encode(hasher.finalize())
}

/// Extract bearer token from Authorization header.
/// The "Bearer" scheme is matched case-insensitively.
fn extract_bearer_token(req: &Request) -> Option<&str> {
    req.headers()
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| {
            let (scheme, token) = v.split_at_checked(7)?;
            scheme
                .eq_ignore_ascii_case("bearer ")
                .then(|| token.trim())
        })
}

/// Attach the resolved [`Caller`] to the request.
pub async fn auth_middleware(State(state): State<AppState>, mut req: Request, next: Next) -> Response {
    let caller = match extract_bearer_token(&req) {
        Some(token) => {
            let caller = state.tokens.resolve(token);
            if caller.principal().is_none() {
                tracing::debug!("Unknown bearer token, treating request as anonymous");
            }
            caller
        }
        None => Caller::anonymous(),
    };

    req.extensions_mut().insert(caller);
    next.run(req).await
}
