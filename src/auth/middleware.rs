use axum::{
    async_trait,
    extract::{FromRequestParts, Request, State},
    http::{header::AUTHORIZATION, request::Parts},
    middleware::Next,
    response::Response,
};

use super::Principal;
use crate::{error::AppError, AppState};

pub const BEARER_PREFIX: &str = "Bearer ";

/// Resolves an `Authorization: Bearer` header into a [`Principal`] stored in
/// the request extensions. Requests without a usable token pass through
/// unauthenticated; handlers that need an identity reject them.
pub async fn bearer_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let token = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix(BEARER_PREFIX))
        .map(str::to_owned);

    if let Some(token) = token {
        match state.tokens.verify(&token) {
            Ok(claims) => {
                request
                    .extensions_mut()
                    .insert(Principal::new(claims.sub, vec![claims.role]));
            }
            Err(e) => tracing::debug!("rejected bearer token: {}", e),
        }
    }

    next.run(request).await
}

#[async_trait]
impl<S> FromRequestParts<S> for Principal
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Principal>()
            .cloned()
            .ok_or(AppError::Unauthenticated)
    }
}
