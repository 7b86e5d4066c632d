//! Request extractors answering with [`AppError`] on malformed input
//!
//! Drop-in replacements for `Json`, `Path` and `Query` on the input side.
//! Responses still use `axum::Json`.

use axum::extract::{FromRequest, FromRequestParts};

use crate::utils::AppError;

/// JSON body; missing fields and bad values become 400 with the error envelope
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct AppJson<T>(pub T);

#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(AppError))]
pub struct AppPath<T>(pub T);

#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(AppError))]
pub struct AppQuery<T>(pub T);
