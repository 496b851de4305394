//! JSON body extractor whose rejections use the API error format.

use axum::extract::FromRequest;

use crate::error::ApiError;

/// Like `axum::Json`, but malformed or mistyped bodies (including unknown
/// enum values such as an order status) are reported as 400 `validation_error`.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct AppJson<T>(pub T);
