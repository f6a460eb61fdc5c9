use axum::Form;
use axum::extract::State;
use axum::response::{IntoResponse, Redirect, Response};
use axum_extra::extract::CookieJar;
use chrono::Duration;
use serde::Deserialize;

use crate::auth::extractor::PageContext;
use crate::auth::{accounts, password, password_reset, sessions};
use crate::error::AppError;
use crate::middleware::session::{SESSION_COOKIE, clear_session_cookie, session_cookie};
use crate::models::User;
use crate::state::SharedState;
use crate::views::render;
use crate::views::users::{
    CheckYourEmailTemplate, ForgotPasswordTemplate, ResetPasswordTemplate, SigninTemplate,
    SignupTemplate,
};

#[derive(Deserialize)]
pub struct CredentialsForm {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Deserialize)]
pub struct EmailForm {
    #[serde(default)]
    pub email: String,
}

#[derive(Deserialize)]
pub struct ResetPasswordForm {
    #[serde(default)]
    pub token: String,
    #[serde(default)]
    pub password: String,
}

/// Start a session for `user` and send the browser to their account page.
async fn sign_in_as(state: &SharedState, jar: CookieJar, user: &User) -> Result<Response, AppError> {
    let session = sessions::create(&state.pool, user.id).await?;
    let jar = jar.add(session_cookie(&session.token, state.config.csrf.secure));
    Ok((jar, Redirect::to("/users/me")).into_response())
}

/// Re-render a form with the error's user-facing message, or bail out with the
/// error itself when it is not something the user can fix.
fn form_error<T, F>(err: AppError, make: F) -> Result<Response, AppError>
where
    T: askama::Template,
    F: FnOnce(String) -> T,
{
    let Some(message) = err.public_message().map(str::to_string) else {
        return Err(err);
    };
    Ok((err.status(), render(&make(message))?).into_response())
}

pub async fn create(
    State(state): State<SharedState>,
    jar: CookieJar,
    page: PageContext,
    Form(form): Form<CredentialsForm>,
) -> Result<Response, AppError> {
    let user = match accounts::create(&state.pool, &form.email, &form.password).await {
        Ok(user) => user,
        Err(e) => {
            return form_error(e, |error| SignupTemplate {
                page,
                email: form.email.clone(),
                error: Some(error),
            });
        }
    };

    tracing::info!(user_id = %user.id, "User signed up");
    sign_in_as(&state, jar, &user).await
}

pub async fn process_signin(
    State(state): State<SharedState>,
    jar: CookieJar,
    page: PageContext,
    Form(form): Form<CredentialsForm>,
) -> Result<Response, AppError> {
    let email = accounts::normalize_email(&form.email);

    if state.login_limiter.check(&email).is_err() {
        return form_error(
            AppError::RateLimited(
                "Too many sign-in attempts. Please try again later.".to_string(),
            ),
            |error| SigninTemplate {
                page,
                email: form.email.clone(),
                error: Some(error),
            },
        );
    }

    let user = match accounts::authenticate(&state.pool, &email, &form.password).await {
        Ok(user) => user,
        Err(e) => {
            if matches!(e, AppError::Unauthorized(_)) {
                state.login_limiter.record_failure(&email);
            }
            return form_error(e, |error| SigninTemplate {
                page,
                email: form.email.clone(),
                error: Some(error),
            });
        }
    };

    state.login_limiter.clear(&email);
    sign_in_as(&state, jar, &user).await
}

pub async fn process_signout(
    State(state): State<SharedState>,
    jar: CookieJar,
) -> Result<Response, AppError> {
    let Some(cookie) = jar.get(SESSION_COOKIE) else {
        return Ok(Redirect::to("/signin").into_response());
    };

    sessions::delete(&state.pool, cookie.value()).await?;
    let jar = jar.add(clear_session_cookie());
    Ok((jar, Redirect::to("/signin")).into_response())
}

pub async fn process_forgot_password(
    State(state): State<SharedState>,
    page: PageContext,
    Form(form): Form<EmailForm>,
) -> Result<Response, AppError> {
    let email = accounts::normalize_email(&form.email);
    if let Err(e) = accounts::validate_email(&email) {
        return form_error(e, |error| ForgotPasswordTemplate {
            page,
            email: form.email.clone(),
            error: Some(error),
        });
    }

    // The response never reveals whether the address has an account.
    let bg_state = state.clone();
    let bg_email = email.clone();
    tokio::spawn(async move {
        if let Err(e) = send_reset_email(&bg_state, &bg_email).await {
            tracing::error!("Failed to send password reset email: {e}");
        }
    });

    Ok(render(&CheckYourEmailTemplate { page, email })?.into_response())
}

async fn send_reset_email(state: &SharedState, email: &str) -> Result<(), AppError> {
    let ttl = Duration::minutes(state.config.reset_ttl_minutes);
    let Some(reset) = password_reset::create(&state.pool, email, ttl).await? else {
        tracing::info!("Password reset requested for unknown email");
        return Ok(());
    };

    let reset_url = reset_url(&state.config.base_url, &reset.token);
    state
        .email
        .forgot_password(email, &reset_url)
        .await
        .map_err(AppError::Internal)
}

pub fn reset_url(base_url: &str, token: &str) -> String {
    let query = form_urlencoded::Serializer::new(String::new())
        .append_pair("token", token)
        .finish();
    format!("{base_url}/reset-pw?{query}")
}

pub async fn process_reset_password(
    State(state): State<SharedState>,
    jar: CookieJar,
    page: PageContext,
    Form(form): Form<ResetPasswordForm>,
) -> Result<Response, AppError> {
    let rerender = |page: PageContext, token: String| {
        move |error: String| ResetPasswordTemplate {
            page,
            token,
            error: Some(error),
        }
    };

    // Validate before consuming so a typo does not burn the token.
    if let Err(msg) = password::validate(&form.password) {
        return form_error(AppError::BadRequest(msg), rerender(page, form.token));
    }

    let user = match password_reset::consume(&state.pool, &form.token).await {
        Ok(user) => user,
        Err(e) => return form_error(e, rerender(page, String::new())),
    };

    accounts::update_password(&state.pool, user.id, &form.password).await?;
    sessions::delete_all_for_user(&state.pool, user.id).await?;
    tracing::info!(user_id = %user.id, "Password reset completed");

    sign_in_as(&state, jar, &user).await
}
