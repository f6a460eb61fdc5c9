use chrono::{DateTime, Utc};
use uuid::Uuid;

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Session {
    pub id: Uuid,
    pub user_id: Uuid,
    /// Plaintext token. Only populated right after creation; never stored.
    #[sqlx(skip)]
    pub token: String,
    pub token_hash: String,
    pub created_at: DateTime<Utc>,
}
