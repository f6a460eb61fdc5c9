use std::convert::Infallible;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::error::AppError;
use crate::middleware::csrf::CsrfToken;
use crate::models::User;

/// The signed-in user, placed in request extensions by
/// [`crate::middleware::session::set_user`].
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

impl<S: Send + Sync> FromRequestParts<S> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<CurrentUser>()
            .cloned()
            .ok_or_else(|| AppError::Unauthorized("You must be signed in".to_string()))
    }
}

/// Per-request values every page template needs: the CSRF token for forms
/// and the optional signed-in user for the navigation bar.
#[derive(Debug, Clone, Default)]
pub struct PageContext {
    pub csrf_token: String,
    pub user: Option<User>,
}

impl<S: Send + Sync> FromRequestParts<S> for PageContext {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let csrf_token = parts
            .extensions
            .get::<CsrfToken>()
            .map(|t| t.0.clone())
            .unwrap_or_default();
        let user = parts.extensions.get::<CurrentUser>().map(|u| u.0.clone());
        Ok(PageContext { csrf_token, user })
    }
}
