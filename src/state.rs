use std::sync::Arc;

use axum_extra::extract::cookie::Key;
use sqlx::PgPool;

use crate::config::Config;
use crate::email::EmailService;
use crate::images::ImageStore;
use crate::rate_limit::LoginRateLimiter;

pub type SharedState = Arc<AppState>;

pub struct AppState {
    pub pool: PgPool,
    pub config: Config,
    pub cookie_key: Key,
    pub email: EmailService,
    pub images: ImageStore,
    pub login_limiter: LoginRateLimiter,
}
