use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header, request::Parts, HeaderMap},
};
use tracing::warn;

use crate::{
    error::AppError,
    state::AppState,
    users::{errors::UserError, repo_types::User},
};

pub const REMEMBER_COOKIE: &str = "remember_token";

/// Value of the remember cookie, if the request carries a non-empty one.
pub fn remember_cookie(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == REMEMBER_COOKIE)
        .map(|(_, value)| value.to_string())
        .filter(|value| !value.is_empty())
}

/// `Set-Cookie` value handing `token` to the browser.
pub fn remember_set_cookie(token: &str, secure: bool) -> String {
    let mut cookie = format!("{REMEMBER_COOKIE}={token}; Path=/; HttpOnly; SameSite=Lax");
    if secure {
        cookie.push_str("; Secure");
    }
    cookie
}

/// Resolves the remember cookie to the signed-in user.
pub struct CurrentUser(pub User);

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = remember_cookie(&parts.headers).ok_or(AppError::Unauthenticated)?;

        match state.users.by_remember(&token).await {
            Ok(user) => Ok(CurrentUser(user)),
            Err(UserError::NotFound) => {
                warn!("unknown remember token");
                Err(AppError::Unauthenticated)
            }
            Err(e) => Err(e.into()),
        }
    }
}
