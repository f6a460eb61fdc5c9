use askama::Template;
use axum::extract::{Path, State};
use axum::response::Html;
use uuid::Uuid;

use crate::auth::extractor::{CurrentUser, PageContext};
use crate::db;
use crate::error::AppError;
use crate::images::Image;
use crate::models::Gallery;
use crate::state::SharedState;
use crate::views::render;

#[derive(Template)]
#[template(path = "galleries/index.html")]
struct IndexTemplate {
    page: PageContext,
    galleries: Vec<GalleryRow>,
}

struct GalleryRow {
    id: String,
    title: String,
    created_at: String,
}

#[derive(Template)]
#[template(path = "galleries/new.html")]
pub struct NewGalleryTemplate {
    pub page: PageContext,
    pub title: String,
    pub error: Option<String>,
}

#[derive(Template)]
#[template(path = "galleries/edit.html")]
pub struct EditGalleryTemplate {
    pub page: PageContext,
    pub gallery: Gallery,
    pub images: Vec<ImageView>,
    pub error: Option<String>,
}

#[derive(Template)]
#[template(path = "galleries/show.html")]
struct ShowGalleryTemplate {
    page: PageContext,
    gallery: Gallery,
    images: Vec<ImageView>,
}

pub struct ImageView {
    pub filename: String,
    pub url: String,
}

impl From<Image> for ImageView {
    fn from(image: Image) -> Self {
        Self {
            url: format!("/galleries/{}/images/{}", image.gallery_id, image.filename),
            filename: image.filename,
        }
    }
}

fn gallery_not_found() -> AppError {
    AppError::NotFound("Gallery not found".to_string())
}

/// Parse a gallery id taken from the URL. Anything that is not a UUID names
/// no gallery.
pub fn parse_gallery_id(raw: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw).map_err(|_| gallery_not_found())
}

pub async fn find_gallery(state: &SharedState, raw_id: &str) -> Result<Gallery, AppError> {
    let id = parse_gallery_id(raw_id)?;
    db::galleries::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(gallery_not_found)
}

pub async fn image_views(state: &SharedState, gallery_id: Uuid) -> Result<Vec<ImageView>, AppError> {
    Ok(state
        .images
        .images(gallery_id)
        .await?
        .into_iter()
        .map(ImageView::from)
        .collect())
}

pub async fn index(
    State(state): State<SharedState>,
    CurrentUser(user): CurrentUser,
    page: PageContext,
) -> Result<Html<String>, AppError> {
    let galleries = db::galleries::list_by_user(&state.pool, user.id)
        .await?
        .into_iter()
        .map(|g| GalleryRow {
            id: g.id.to_string(),
            title: g.title,
            created_at: g.created_at.format("%Y-%m-%d").to_string(),
        })
        .collect();

    render(&IndexTemplate { page, galleries })
}

pub async fn new_page(page: PageContext) -> Result<Html<String>, AppError> {
    render(&NewGalleryTemplate {
        page,
        title: String::new(),
        error: None,
    })
}

pub async fn edit(
    State(state): State<SharedState>,
    CurrentUser(user): CurrentUser,
    page: PageContext,
    Path(id): Path<String>,
) -> Result<Html<String>, AppError> {
    let gallery = find_gallery(&state, &id).await?;
    gallery.require_owner(user.id)?;
    let images = image_views(&state, gallery.id).await?;

    render(&EditGalleryTemplate {
        page,
        gallery,
        images,
        error: None,
    })
}

pub async fn show(
    State(state): State<SharedState>,
    page: PageContext,
    Path(id): Path<String>,
) -> Result<Html<String>, AppError> {
    let gallery = find_gallery(&state, &id).await?;
    let images = image_views(&state, gallery.id).await?;

    render(&ShowGalleryTemplate {
        page,
        gallery,
        images,
    })
}
