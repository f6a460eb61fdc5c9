pub mod auth;
pub mod config;
pub mod crypto;
pub mod db;
pub mod email;
pub mod error;
pub mod images;
pub mod middleware;
pub mod models;
pub mod rate_limit;
pub mod routes;
pub mod state;
pub mod views;
pub mod worker;

use std::sync::Arc;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::http::{HeaderName, HeaderValue};
use sqlx::PgPool;
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::crypto::derive_cookie_key;
use crate::email::EmailService;
use crate::images::ImageStore;
use crate::middleware::{csrf, session};
use crate::rate_limit::LoginRateLimiter;
use crate::state::{AppState, SharedState};

pub fn build_app(pool: PgPool, config: Config) -> (Router, SharedState) {
    let state: SharedState = Arc::new(AppState {
        pool,
        cookie_key: derive_cookie_key(&config.csrf.key),
        email: EmailService::from_config(config.smtp.as_ref()),
        images: ImageStore::new(config.images_dir.clone()),
        login_limiter: LoginRateLimiter::default(),
        config,
    });

    let max_body_size = state.config.max_body_size;

    // Layers run bottom-up: CSRF check first, then the session user lookup.
    let app = Router::new()
        .merge(routes::public_routes())
        .merge(routes::protected_routes())
        .fallback(views::pages::not_found)
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            session::set_user,
        ))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            csrf::protect,
        ))
        .layer(DefaultBodyLimit::max(max_body_size))
        .layer(SetResponseHeaderLayer::overriding(
            HeaderName::from_static("x-content-type-options"),
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            HeaderName::from_static("x-frame-options"),
            HeaderValue::from_static("DENY"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            HeaderName::from_static("referrer-policy"),
            HeaderValue::from_static("strict-origin-when-cross-origin"),
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(state.clone());

    (app, state)
}
