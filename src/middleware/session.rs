use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::{IntoResponse, Redirect, Response};
use axum_extra::extract::CookieJar;
use axum_extra::extract::cookie::{Cookie, SameSite};

use crate::auth::extractor::CurrentUser;
use crate::auth::sessions;
use crate::state::SharedState;

pub const SESSION_COOKIE: &str = "session";

/// Attach the signed-in user (if any) to the request. A missing, stale or
/// unreadable session simply leaves the request anonymous.
pub async fn set_user(
    State(state): State<SharedState>,
    jar: CookieJar,
    mut req: Request,
    next: Next,
) -> Response {
    if let Some(cookie) = jar.get(SESSION_COOKIE) {
        match sessions::user(&state.pool, cookie.value()).await {
            Ok(Some(user)) => {
                req.extensions_mut().insert(CurrentUser(user));
            }
            Ok(None) => {}
            Err(e) => tracing::warn!("Session lookup failed: {e}"),
        }
    }
    next.run(req).await
}

/// Redirect anonymous requests to the sign-in page.
pub async fn require_user(req: Request, next: Next) -> Response {
    if req.extensions().get::<CurrentUser>().is_none() {
        return Redirect::to("/signin").into_response();
    }
    next.run(req).await
}

pub fn session_cookie(token: &str, secure: bool) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, token.to_string()))
        .path("/")
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Lax)
        .build()
}

pub fn clear_session_cookie() -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, ""))
        .path("/")
        .max_age(time::Duration::ZERO)
        .build()
}
