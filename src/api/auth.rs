//! Bearer token authentication and role checks

use super::response::ApiError;
use super::state::AppState;
use crate::config::{AuthConfig, Role};
use crate::domain::{Result, WardlineError};
use async_trait::async_trait;
use axum::extract::{Request, State};
use axum::http::{header, HeaderMap};
use axum::middleware::Next;
use axum::response::Response;
use secrecy::ExposeSecret;

/// The authenticated caller of a request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub name: String,
    pub role: Role,
}

impl Principal {
    /// Caller used for every request when authentication is disabled
    pub fn anonymous() -> Self {
        Self {
            name: "anonymous".to_string(),
            role: Role::Admin,
        }
    }

    /// Check that the caller holds one of `allowed`; admin always passes
    ///
    /// # Errors
    ///
    /// Returns `Forbidden` naming the caller's role otherwise.
    pub fn require(&self, allowed: &[Role]) -> Result<()> {
        if self.role == Role::Admin || allowed.contains(&self.role) {
            return Ok(());
        }
        tracing::warn!(caller = %self.name, role = %self.role, "Role not permitted");
        Err(WardlineError::Forbidden(format!(
            "role '{}' may not perform this operation",
            self.role
        )))
    }
}

/// Resolves a bearer token to a caller
#[async_trait]
pub trait TokenValidator: Send + Sync {
    /// `None` when the token is not recognised
    async fn validate(&self, token: &str) -> Option<Principal>;
}

/// Token table loaded from `[[auth.tokens]]`
pub struct StaticTokenValidator {
    tokens: Vec<(crate::config::SecretString, Principal)>,
}

impl StaticTokenValidator {
    pub fn from_config(config: &AuthConfig) -> Self {
        let tokens = config
            .tokens
            .iter()
            .map(|t| {
                (
                    t.token.clone(),
                    Principal {
                        name: t.name.clone(),
                        role: t.role,
                    },
                )
            })
            .collect();
        Self { tokens }
    }
}

#[async_trait]
impl TokenValidator for StaticTokenValidator {
    async fn validate(&self, token: &str) -> Option<Principal> {
        self.tokens
            .iter()
            .find(|(secret, _)| secret.expose_secret().as_str() == token)
            .map(|(_, principal)| principal.clone())
    }
}

/// Token from an `Authorization: Bearer <token>` header
fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}

/// Middleware that attaches a [`Principal`] to the request or rejects it with 401
pub async fn authenticate(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> std::result::Result<Response, ApiError> {
    let principal = match &state.validator {
        None => Principal::anonymous(),
        Some(validator) => {
            let token = bearer_token(request.headers())
                .map(str::to_owned)
                .ok_or_else(|| WardlineError::Unauthorized("missing bearer token".to_string()))?;
            let path = request.uri().path().to_owned();
            validator.validate(&token).await.ok_or_else(|| {
                tracing::warn!(%path, "Rejected unknown token");
                WardlineError::Unauthorized("invalid token".to_string())
            })?
        }
    };

    tracing::debug!(caller = %principal.name, role = %principal.role, "Authenticated");
    request.extensions_mut().insert(principal);
    Ok(next.run(request).await)
}
