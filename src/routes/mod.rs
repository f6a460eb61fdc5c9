pub mod galleries;
pub mod users;

use axum::Router;
use axum::routing::{get, post};

use crate::middleware::session::require_user;
use crate::state::SharedState;
use crate::views;

/// Pages and form actions open to anonymous visitors.
pub fn public_routes() -> Router<SharedState> {
    Router::new()
        // Static pages
        .route("/", get(views::pages::home))
        .route("/contact", get(views::pages::contact))
        .route("/faq", get(views::pages::faq))
        // Accounts
        .route("/signup", get(views::users::signup_page))
        .route("/users", post(users::create))
        .route(
            "/signin",
            get(views::users::signin_page).post(users::process_signin),
        )
        .route("/signout", post(users::process_signout))
        .route(
            "/forgot-pw",
            get(views::users::forgot_password_page).post(users::process_forgot_password),
        )
        .route(
            "/reset-pw",
            get(views::users::reset_password_page).post(users::process_reset_password),
        )
        // Public gallery views
        .route("/galleries/{id}", get(views::galleries::show))
        .route("/galleries/{id}/images/{filename}", get(galleries::image))
}

/// Everything that needs a signed-in user.
pub fn protected_routes() -> Router<SharedState> {
    Router::new()
        .route("/users/me", get(views::users::current_user))
        .route(
            "/galleries",
            get(views::galleries::index).post(galleries::create),
        )
        .route("/galleries/new", get(views::galleries::new_page))
        .route("/galleries/{id}/edit", get(views::galleries::edit))
        .route("/galleries/{id}", post(galleries::update))
        .route("/galleries/{id}/delete", post(galleries::delete))
        .route("/galleries/{id}/images", post(galleries::upload_images))
        .route(
            "/galleries/{id}/images/{filename}/delete",
            post(galleries::delete_image),
        )
        .route_layer(axum::middleware::from_fn(require_user))
}
