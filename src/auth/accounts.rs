use std::sync::LazyLock;

use regex::Regex;
use sqlx::PgPool;
use uuid::Uuid;

use crate::auth::password;
use crate::db;
use crate::error::AppError;
use crate::models::User;

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("valid email regex"));

pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

pub fn validate_email(email: &str) -> Result<(), AppError> {
    if email.is_empty() || email.len() > 254 || !EMAIL_RE.is_match(email) {
        return Err(AppError::BadRequest(
            "Please enter a valid email address".to_string(),
        ));
    }
    Ok(())
}

/// Register a new user. Email is stored lowercased.
pub async fn create(pool: &PgPool, email: &str, pw: &str) -> Result<User, AppError> {
    let email = normalize_email(email);
    validate_email(&email)?;
    password::validate(pw).map_err(AppError::BadRequest)?;

    let pw_hash = password::hash(pw).map_err(AppError::Internal)?;

    db::users::create(pool, &email, &pw_hash)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
                AppError::Conflict("That email address is already taken".to_string())
            }
            _ => AppError::Database(e),
        })
}

/// Check an email/password pair. Unknown emails and wrong passwords are
/// indistinguishable to the caller.
pub async fn authenticate(pool: &PgPool, email: &str, pw: &str) -> Result<User, AppError> {
    let user = find_by_email(pool, email)
        .await?
        .ok_or_else(invalid_credentials)?;

    let valid = password::verify(pw, &user.password_hash).map_err(AppError::Internal)?;
    if !valid {
        return Err(invalid_credentials());
    }

    Ok(user)
}

pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<User>, AppError> {
    Ok(db::users::find_by_email(pool, &normalize_email(email)).await?)
}

pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<User>, AppError> {
    Ok(db::users::find_by_id(pool, id).await?)
}

pub async fn update_password(pool: &PgPool, user_id: Uuid, pw: &str) -> Result<(), AppError> {
    password::validate(pw).map_err(AppError::BadRequest)?;
    let pw_hash = password::hash(pw).map_err(AppError::Internal)?;
    db::users::update_password(pool, user_id, &pw_hash).await?;
    Ok(())
}

fn invalid_credentials() -> AppError {
    AppError::Unauthorized("Invalid email or password".to_string())
}
