//! Bearer-token authentication

use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts, HeaderMap},
};

use super::error::ApiError;
use super::{run_blocking, SharedState};
use crate::users::{AuthError, User};

/// The user behind a request's `Authorization: Bearer <token>` header
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub user: User,
    pub token: String,
}

/// Token from an `Authorization: Bearer <token>` header
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    let token = token.trim();
    if scheme.eq_ignore_ascii_case("bearer") && !token.is_empty() {
        Some(token)
    } else {
        None
    }
}

impl FromRequestParts<SharedState> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &SharedState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(&parts.headers)
            .ok_or(AuthError::Unauthenticated)?
            .to_string();

        let tracker = state.tracker.clone();
        let lookup = token.clone();
        let user = run_blocking(move || tracker.authenticate(&lookup)).await?;

        Ok(CurrentUser { user, token })
    }
}
