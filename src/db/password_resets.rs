use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::{PasswordReset, User};

/// One active reset per user: a new request replaces the previous token.
pub async fn upsert(
    pool: &PgPool,
    user_id: Uuid,
    token_hash: &str,
    expires_at: DateTime<Utc>,
) -> Result<PasswordReset, sqlx::Error> {
    sqlx::query_as::<_, PasswordReset>(
        "INSERT INTO password_resets (user_id, token_hash, expires_at)
         VALUES ($1, $2, $3)
         ON CONFLICT (user_id) DO UPDATE
            SET token_hash = EXCLUDED.token_hash,
                expires_at = EXCLUDED.expires_at,
                created_at = now()
         RETURNING *",
    )
    .bind(user_id)
    .bind(token_hash)
    .bind(expires_at)
    .fetch_one(pool)
    .await
}

/// Atomically remove the reset row matching `token_hash` and return it with its user.
pub async fn take_by_hash(
    pool: &PgPool,
    token_hash: &str,
) -> Result<Option<(PasswordReset, User)>, sqlx::Error> {
    let mut tx = pool.begin().await?;

    let reset = sqlx::query_as::<_, PasswordReset>(
        "DELETE FROM password_resets WHERE token_hash = $1 RETURNING *",
    )
    .bind(token_hash)
    .fetch_optional(&mut *tx)
    .await?;

    let Some(reset) = reset else {
        tx.rollback().await?;
        return Ok(None);
    };

    let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
        .bind(reset.user_id)
        .fetch_one(&mut *tx)
        .await?;

    tx.commit().await?;
    Ok(Some((reset, user)))
}

pub async fn delete_expired(pool: &PgPool) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM password_resets WHERE expires_at <= now()")
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}
