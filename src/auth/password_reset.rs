use chrono::{Duration, Utc};
use sqlx::PgPool;

use crate::auth::{accounts, token};
use crate::db;
use crate::error::AppError;
use crate::models::{PasswordReset, User};

pub const BYTES_PER_TOKEN: usize = 32;

/// Issue a reset token for the account owning `email`. Returns `None` when no
/// such account exists. Any earlier token for the same user stops working.
pub async fn create(
    pool: &PgPool,
    email: &str,
    ttl: Duration,
) -> Result<Option<PasswordReset>, AppError> {
    let Some(user) = accounts::find_by_email(pool, email).await? else {
        return Ok(None);
    };

    let new = token::new_token(BYTES_PER_TOKEN);
    let expires_at = Utc::now() + ttl;

    let mut reset = db::password_resets::upsert(pool, user.id, &new.token_hash, expires_at).await?;
    reset.token = new.token;
    Ok(Some(reset))
}

/// Redeem a reset token. The token is single-use: it is gone after this call
/// whether or not it had expired.
pub async fn consume(pool: &PgPool, reset_token: &str) -> Result<User, AppError> {
    let (reset, user) = db::password_resets::take_by_hash(pool, &token::hash(reset_token))
        .await?
        .ok_or_else(|| AppError::BadRequest("Invalid or expired reset token".to_string()))?;

    if reset.is_expired(Utc::now()) {
        tracing::info!(user_id = %user.id, "Rejected expired password reset token");
        return Err(AppError::BadRequest(
            "Invalid or expired reset token".to_string(),
        ));
    }

    Ok(user)
}
