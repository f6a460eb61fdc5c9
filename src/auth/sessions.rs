use sqlx::PgPool;
use uuid::Uuid;

use crate::auth::token;
use crate::db;
use crate::error::AppError;
use crate::models::{Session, User};

/// Bytes of entropy in each session token.
pub const BYTES_PER_TOKEN: usize = 32;

/// Start (or rotate) the session for `user_id`. The returned session is the
/// only place the plaintext token ever exists server-side.
pub async fn create(pool: &PgPool, user_id: Uuid) -> Result<Session, AppError> {
    let new = token::new_token(BYTES_PER_TOKEN);
    let mut session = db::sessions::upsert(pool, user_id, &new.token_hash).await?;
    session.token = new.token;
    Ok(session)
}

/// Resolve the user owning a plaintext session token.
pub async fn user(pool: &PgPool, session_token: &str) -> Result<Option<User>, AppError> {
    Ok(db::sessions::find_user_by_hash(pool, &token::hash(session_token)).await?)
}

pub async fn delete(pool: &PgPool, session_token: &str) -> Result<(), AppError> {
    Ok(db::sessions::delete_by_hash(pool, &token::hash(session_token)).await?)
}

/// Sign the user out everywhere.
pub async fn delete_all_for_user(pool: &PgPool, user_id: Uuid) -> Result<(), AppError> {
    Ok(db::sessions::delete_all_for_user(pool, user_id).await?)
}
