pub mod galleries;
pub mod pages;
pub mod users;

use askama::Template;
use axum::response::Html;

use crate::error::AppError;

/// Execute a compiled template into an HTML response.
pub fn render<T: Template>(template: &T) -> Result<Html<String>, AppError> {
    Ok(Html(template.render()?))
}
