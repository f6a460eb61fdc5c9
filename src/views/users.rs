use askama::Template;
use axum::extract::{Query, State};
use axum::response::Html;
use serde::Deserialize;

use crate::auth::extractor::{CurrentUser, PageContext};
use crate::db;
use crate::error::AppError;
use crate::state::SharedState;
use crate::views::render;

#[derive(Template)]
#[template(path = "users/signup.html")]
pub struct SignupTemplate {
    pub page: PageContext,
    pub email: String,
    pub error: Option<String>,
}

#[derive(Template)]
#[template(path = "users/signin.html")]
pub struct SigninTemplate {
    pub page: PageContext,
    pub email: String,
    pub error: Option<String>,
}

#[derive(Template)]
#[template(path = "users/forgot_password.html")]
pub struct ForgotPasswordTemplate {
    pub page: PageContext,
    pub email: String,
    pub error: Option<String>,
}

#[derive(Template)]
#[template(path = "users/check_your_email.html")]
pub struct CheckYourEmailTemplate {
    pub page: PageContext,
    pub email: String,
}

#[derive(Template)]
#[template(path = "users/reset_password.html")]
pub struct ResetPasswordTemplate {
    pub page: PageContext,
    pub token: String,
    pub error: Option<String>,
}

#[derive(Template)]
#[template(path = "users/me.html")]
struct CurrentUserTemplate {
    page: PageContext,
    email: String,
    member_since: String,
    gallery_count: usize,
}

#[derive(Deserialize)]
pub struct EmailQuery {
    pub email: Option<String>,
}

#[derive(Deserialize)]
pub struct TokenQuery {
    pub token: Option<String>,
}

pub async fn signup_page(
    page: PageContext,
    Query(q): Query<EmailQuery>,
) -> Result<Html<String>, AppError> {
    render(&SignupTemplate {
        page,
        email: q.email.unwrap_or_default(),
        error: None,
    })
}

pub async fn signin_page(
    page: PageContext,
    Query(q): Query<EmailQuery>,
) -> Result<Html<String>, AppError> {
    render(&SigninTemplate {
        page,
        email: q.email.unwrap_or_default(),
        error: None,
    })
}

pub async fn forgot_password_page(
    page: PageContext,
    Query(q): Query<EmailQuery>,
) -> Result<Html<String>, AppError> {
    render(&ForgotPasswordTemplate {
        page,
        email: q.email.unwrap_or_default(),
        error: None,
    })
}

pub async fn reset_password_page(
    page: PageContext,
    Query(q): Query<TokenQuery>,
) -> Result<Html<String>, AppError> {
    render(&ResetPasswordTemplate {
        page,
        token: q.token.unwrap_or_default(),
        error: None,
    })
}

pub async fn current_user(
    State(state): State<SharedState>,
    CurrentUser(user): CurrentUser,
    page: PageContext,
) -> Result<Html<String>, AppError> {
    let galleries = db::galleries::list_by_user(&state.pool, user.id).await?;

    render(&CurrentUserTemplate {
        page,
        email: user.email,
        member_since: user.created_at.format("%Y-%m-%d").to_string(),
        gallery_count: galleries.len(),
    })
}
