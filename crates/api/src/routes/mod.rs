//! HTTP route handlers.

pub mod admin_users;
pub mod auth;
pub mod banners;
pub mod cart;
pub mod categories;
pub mod driver;
pub mod health;
pub mod manager;
pub mod orders;
pub mod products;
pub mod restaurants;
pub mod settings;
pub mod team;

use axum::{
    body::Bytes,
    extract::{multipart::MultipartError, Multipart},
    http::StatusCode,
};

use crate::app::AppState;
use crate::error::ApiError;
use crate::services::MediaError;

/// Multipart field carrying uploaded images.
const IMAGE_FIELD: &str = "image";

/// An image pulled out of a multipart body.
#[derive(Debug)]
pub(crate) struct UploadedImage {
    pub content_type: String,
    pub bytes: Bytes,
}

fn multipart_error(err: MultipartError) -> ApiError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ApiError::PayloadTooLarge(err.body_text())
    } else {
        ApiError::Validation(err.body_text())
    }
}

/// Reads the `image` field, skipping any other parts.
pub(crate) async fn read_image(mut multipart: Multipart) -> Result<UploadedImage, ApiError> {
    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() != Some(IMAGE_FIELD) {
            continue;
        }

        let content_type = field
            .content_type()
            .map(str::to_string)
            .or_else(|| {
                field
                    .file_name()
                    .and_then(|name| mime_guess::from_path(name).first_raw())
                    .map(str::to_string)
            })
            .unwrap_or_else(|| "application/octet-stream".to_string());
        let bytes = field.bytes().await.map_err(multipart_error)?;
        if bytes.is_empty() {
            return Err(MediaError::Missing.into());
        }

        return Ok(UploadedImage {
            content_type,
            bytes,
        });
    }

    Err(MediaError::Missing.into())
}

/// Reads and stores an uploaded image, returning its media-relative path.
pub(crate) async fn store_image(
    state: &AppState,
    folder: &str,
    multipart: Multipart,
) -> Result<String, ApiError> {
    let image = read_image(multipart).await?;
    let path = state
        .media
        .store(folder, &image.content_type, image.bytes)
        .await?;
    Ok(path)
}
