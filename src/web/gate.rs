//! Bearer-token gate for protected routes.
//!
//! ```ignore
//! async fn handler(Authenticated { token, .. }: Authenticated<UserOnly>) -> impl IntoResponse {
//!     // token.kind is guaranteed to be TokenKind::User
//! }
//! ```

use std::future::Future;
use std::marker::PhantomData;

use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};

use crate::app::AppState;
use crate::auth::{AuthToken, TokenKind};
use crate::web::error::ApiError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateRejection {
    /// No token, or one that does not resolve.
    Unauthenticated,
    /// Valid token of a kind the route does not accept.
    Forbidden,
}

pub fn admit(resolved: Option<AuthToken>, allowed: &[TokenKind]) -> Result<AuthToken, GateRejection> {
    let token = resolved.ok_or(GateRejection::Unauthenticated)?;
    if allowed.contains(&token.kind) {
        Ok(token)
    } else {
        Err(GateRejection::Forbidden)
    }
}

/// Token kinds a route accepts.
pub trait TokenPolicy {
    const ALLOWED: &'static [TokenKind];
}

pub struct UserOnly;
pub struct AppOnly;
pub struct AnyToken;

impl TokenPolicy for UserOnly {
    const ALLOWED: &'static [TokenKind] = &[TokenKind::User];
}

impl TokenPolicy for AppOnly {
    const ALLOWED: &'static [TokenKind] = &[TokenKind::App];
}

impl TokenPolicy for AnyToken {
    const ALLOWED: &'static [TokenKind] = &[TokenKind::User, TokenKind::App];
}

pub struct Authenticated<P: TokenPolicy = AnyToken> {
    pub token: AuthToken,
    _policy: PhantomData<fn() -> P>,
}

impl<P: TokenPolicy> FromRequestParts<AppState> for Authenticated<P> {
    type Rejection = ApiError;

    fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> impl Future<Output = Result<Self, Self::Rejection>> + Send {
        let bearer = bearer_token(parts).map(str::to_string);
        let tokens = state.tokens.clone();
        async move {
            let resolved = match bearer {
                Some(bearer) => tokens.resolve(&bearer).await?,
                None => None,
            };
            let token = admit(resolved, P::ALLOWED).inspect_err(|rejection| {
                tracing::debug!(?rejection, "request rejected at gate");
            })?;
            Ok(Authenticated {
                token,
                _policy: PhantomData,
            })
        }
    }
}

pub fn bearer_token(parts: &Parts) -> Option<&str> {
    parts
        .headers
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
}
