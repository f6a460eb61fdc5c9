//! Double-submit CSRF protection.
//!
//! Each client holds a random token in a private (encrypted, authenticated)
//! cookie. Unsafe requests must echo it back in the `csrf_token` form field
//! or the `X-CSRF-Token` header.

use axum::body::Body;
use axum::extract::{Request, State};
use axum::http::{HeaderMap, Method, StatusCode, header};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum_extra::extract::PrivateCookieJar;
use axum_extra::extract::cookie::{Cookie, SameSite};
use bytes::Bytes;

use crate::auth::token;
use crate::crypto::constant_time_eq;
use crate::state::SharedState;

pub const CSRF_COOKIE: &str = "csrf";
pub const CSRF_FIELD: &str = "csrf_token";
pub const CSRF_HEADER: &str = "x-csrf-token";

const TOKEN_BYTES: usize = 32;

/// The CSRF token for the current client, available to handlers through
/// request extensions.
#[derive(Debug, Clone)]
pub struct CsrfToken(pub String);

pub async fn protect(State(state): State<SharedState>, mut req: Request, next: Next) -> Response {
    let jar = PrivateCookieJar::from_headers(req.headers(), state.cookie_key.clone());
    let existing = jar
        .get(CSRF_COOKIE)
        .map(|c| c.value().to_string())
        .filter(|v| !v.is_empty());

    if !is_safe(req.method()) {
        let (parts, body) = req.into_parts();
        let bytes = match axum::body::to_bytes(body, state.config.max_body_size).await {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::debug!("Failed to buffer request body: {e}");
                return (StatusCode::PAYLOAD_TOO_LARGE, "Request body too large").into_response();
            }
        };

        let submitted = submitted_token(&parts.headers, &bytes)
            .await
            .unwrap_or_default();

        let valid = match &existing {
            Some(expected) => !submitted.is_empty() && constant_time_eq(expected, &submitted),
            None => false,
        };
        if !valid {
            tracing::warn!(method = %parts.method, path = %parts.uri.path(), "CSRF token rejected");
            return (StatusCode::FORBIDDEN, "Forbidden - CSRF token invalid").into_response();
        }

        req = Request::from_parts(parts, Body::from(bytes));
    }

    let csrf_token = existing
        .clone()
        .unwrap_or_else(|| token::random_string(TOKEN_BYTES));
    req.extensions_mut().insert(CsrfToken(csrf_token.clone()));

    let response = next.run(req).await;

    if existing.is_some() {
        return response;
    }

    let cookie = Cookie::build((CSRF_COOKIE, csrf_token))
        .path("/")
        .http_only(true)
        .secure(state.config.csrf.secure)
        .same_site(SameSite::Lax)
        .max_age(time::Duration::hours(12))
        .build();
    (jar.add(cookie), response).into_response()
}

fn is_safe(method: &Method) -> bool {
    matches!(
        *method,
        Method::GET | Method::HEAD | Method::OPTIONS | Method::TRACE
    )
}

/// Pull the submitted token from the header, or failing that the form body.
async fn submitted_token(headers: &HeaderMap, body: &Bytes) -> Option<String> {
    if let Some(value) = headers.get(CSRF_HEADER).and_then(|v| v.to_str().ok()) {
        return Some(value.to_string());
    }

    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();

    if content_type.starts_with("application/x-www-form-urlencoded") {
        form_urlencoded::parse(body)
            .find(|(k, _)| k == CSRF_FIELD)
            .map(|(_, v)| v.into_owned())
    } else if content_type.starts_with("multipart/form-data") {
        multipart_field(content_type, body.clone(), CSRF_FIELD).await
    } else {
        None
    }
}

async fn multipart_field(content_type: &str, body: Bytes, name: &str) -> Option<String> {
    let boundary = multer::parse_boundary(content_type).ok()?;
    let stream = futures_util::stream::once(async move { Ok::<_, std::io::Error>(body) });
    let mut multipart = multer::Multipart::new(stream, boundary);

    while let Ok(Some(field)) = multipart.next_field().await {
        if field.name() == Some(name) {
            return field.text().await.ok();
        }
    }
    None
}
