//! Request extractors that report rejections through [`Error`], so a malformed body,
//! query string or form comes back as `{"error": ...}` JSON like every other failure.

use axum::extract::{FromRequest, FromRequestParts};

use crate::error::Error;

/// JSON request body.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(Error))]
pub struct JsonBody<T>(pub T);

/// Deserialized query string.
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(Error))]
pub struct QueryParams<T>(pub T);
