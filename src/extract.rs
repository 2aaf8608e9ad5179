//! Extractors that report rejections as [Error] so clients always get an
//! [ErrorResponse](crate::error::ErrorResponse) body.

use axum::extract::{FromRequest, FromRequestParts};

use crate::Error;

/// A JSON request body. A body that cannot be parsed is rejected with
/// [Error::InvalidRequest].
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(Error))]
pub struct AppJson<T>(pub T);

/// A path parameter. A parameter that cannot be parsed, e.g. "abc" for an
/// integer ID, is rejected with [Error::InvalidRequest].
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(Error))]
pub struct AppPath<T>(pub T);
