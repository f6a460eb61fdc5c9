use axum::Form;
use axum::body::Body;
use axum::extract::{Multipart, Path, Request, State};
use axum::response::{IntoResponse, Redirect, Response};
use serde::Deserialize;
use tower::ServiceExt;
use tower_http::services::ServeFile;
use uuid::Uuid;

use crate::auth::extractor::{CurrentUser, PageContext};
use crate::db;
use crate::error::AppError;
use crate::images;
use crate::state::SharedState;
use crate::views::galleries::{
    EditGalleryTemplate, NewGalleryTemplate, find_gallery, image_views, parse_gallery_id,
};
use crate::views::render;

/// Form field carrying uploaded files.
pub const IMAGES_FIELD: &str = "images";

const MAX_TITLE_LEN: usize = 200;

#[derive(Deserialize)]
pub struct GalleryForm {
    #[serde(default)]
    pub title: String,
}

fn validate_title(title: &str) -> Result<String, AppError> {
    let title = title.trim();
    if title.is_empty() {
        return Err(AppError::BadRequest("Title is required".to_string()));
    }
    if title.chars().count() > MAX_TITLE_LEN {
        return Err(AppError::BadRequest(format!(
            "Title must be at most {MAX_TITLE_LEN} characters"
        )));
    }
    Ok(title.to_string())
}

fn edit_url(id: Uuid) -> String {
    format!("/galleries/{id}/edit")
}

pub async fn create(
    State(state): State<SharedState>,
    CurrentUser(user): CurrentUser,
    page: PageContext,
    Form(form): Form<GalleryForm>,
) -> Result<Response, AppError> {
    let title = match validate_title(&form.title) {
        Ok(title) => title,
        Err(e) => {
            let status = e.status();
            let html = render(&NewGalleryTemplate {
                page,
                title: form.title,
                error: e.public_message().map(str::to_string),
            })?;
            return Ok((status, html).into_response());
        }
    };

    let gallery = db::galleries::create(&state.pool, user.id, &title).await?;
    tracing::info!(gallery_id = %gallery.id, user_id = %user.id, "Gallery created");

    Ok(Redirect::to(&edit_url(gallery.id)).into_response())
}

pub async fn update(
    State(state): State<SharedState>,
    CurrentUser(user): CurrentUser,
    page: PageContext,
    Path(id): Path<String>,
    Form(form): Form<GalleryForm>,
) -> Result<Response, AppError> {
    let gallery = find_gallery(&state, &id).await?;
    gallery.require_owner(user.id)?;

    let title = match validate_title(&form.title) {
        Ok(title) => title,
        Err(e) => {
            let status = e.status();
            let images = image_views(&state, gallery.id).await?;
            let html = render(&EditGalleryTemplate {
                page,
                gallery,
                images,
                error: e.public_message().map(str::to_string),
            })?;
            return Ok((status, html).into_response());
        }
    };

    db::galleries::update_title(&state.pool, gallery.id, &title).await?;
    Ok(Redirect::to(&edit_url(gallery.id)).into_response())
}

pub async fn delete(
    State(state): State<SharedState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
) -> Result<Redirect, AppError> {
    let gallery = find_gallery(&state, &id).await?;
    gallery.require_owner(user.id)?;

    db::galleries::delete(&state.pool, gallery.id).await?;
    state.images.delete_gallery(gallery.id).await?;
    tracing::info!(gallery_id = %gallery.id, user_id = %user.id, "Gallery deleted");

    Ok(Redirect::to("/galleries"))
}

pub async fn image(
    State(state): State<SharedState>,
    Path((id, filename)): Path<(String, String)>,
    req: Request,
) -> Result<Response, AppError> {
    let image = state.images.image(parse_gallery_id(&id)?, &filename).await?;

    let response = ServeFile::new(&image.path)
        .oneshot(req)
        .await
        .map_err(|e| AppError::Internal(format!("Failed to serve image: {e}")))?;
    Ok(response.map(Body::new))
}

pub async fn upload_images(
    State(state): State<SharedState>,
    CurrentUser(user): CurrentUser,
    page: PageContext,
    Path(id): Path<String>,
    mut multipart: Multipart,
) -> Result<Response, AppError> {
    let gallery = find_gallery(&state, &id).await?;
    gallery.require_owner(user.id)?;

    // Read and check every file first so a bad one leaves nothing behind.
    let mut uploads = Vec::new();
    let mut rejected = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("Invalid upload: {e}")))?
    {
        if field.name() != Some(IMAGES_FIELD) {
            continue;
        }
        // Browsers send an empty part when no file was picked.
        let filename = match field.file_name() {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => continue,
        };
        let contents = field
            .bytes()
            .await
            .map_err(|e| AppError::BadRequest(format!("Invalid upload: {e}")))?;
        if contents.is_empty() {
            continue;
        }

        if let Err(e) = images::validate_upload(&filename, &contents) {
            rejected = Some(e);
            break;
        }
        uploads.push((filename, contents));
    }

    if let Some(e) = rejected {
        let status = e.status();
        let images = image_views(&state, gallery.id).await?;
        let html = render(&EditGalleryTemplate {
            page,
            gallery,
            images,
            error: e.public_message().map(str::to_string),
        })?;
        return Ok((status, html).into_response());
    }

    for (filename, contents) in uploads {
        state
            .images
            .create_image(gallery.id, &filename, &contents)
            .await?;
    }

    Ok(Redirect::to(&edit_url(gallery.id)).into_response())
}

pub async fn delete_image(
    State(state): State<SharedState>,
    CurrentUser(user): CurrentUser,
    Path((id, filename)): Path<(String, String)>,
) -> Result<Redirect, AppError> {
    let gallery = find_gallery(&state, &id).await?;
    gallery.require_owner(user.id)?;

    state.images.delete_image(gallery.id, &filename).await?;
    Ok(Redirect::to(&edit_url(gallery.id)))
}
