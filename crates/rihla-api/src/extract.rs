//! JSON request bodies that reject with the API error shape.

use axum::extract::FromRequest;

use crate::error::ApiError;

/// `axum::Json` whose rejection is a 400 `validation_error` body instead of
/// axum's plain-text response.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct JsonBody<T>(pub T);
