use sqlx::PgPool;
use uuid::Uuid;

use crate::models::Gallery;

pub async fn create(pool: &PgPool, user_id: Uuid, title: &str) -> Result<Gallery, sqlx::Error> {
    sqlx::query_as::<_, Gallery>(
        "INSERT INTO galleries (user_id, title) VALUES ($1, $2) RETURNING *",
    )
    .bind(user_id)
    .bind(title)
    .fetch_one(pool)
    .await
}

pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Gallery>, sqlx::Error> {
    sqlx::query_as::<_, Gallery>("SELECT * FROM galleries WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn list_by_user(pool: &PgPool, user_id: Uuid) -> Result<Vec<Gallery>, sqlx::Error> {
    sqlx::query_as::<_, Gallery>(
        "SELECT * FROM galleries WHERE user_id = $1 ORDER BY created_at DESC",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await
}

pub async fn update_title(pool: &PgPool, id: Uuid, title: &str) -> Result<Gallery, sqlx::Error> {
    sqlx::query_as::<_, Gallery>(
        "UPDATE galleries SET title = $2, updated_at = now() WHERE id = $1 RETURNING *",
    )
    .bind(id)
    .bind(title)
    .fetch_one(pool)
    .await
}

pub async fn delete(pool: &PgPool, id: Uuid) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM galleries WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(())
}
