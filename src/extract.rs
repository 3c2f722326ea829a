//! Request extractors whose rejections render as `ApiError` JSON bodies
//! instead of axum's plain-text defaults.

use crate::errors::ApiError;
use axum::extract::{FromRequest, FromRequestParts, Json, Path, Query};

#[derive(Debug, FromRequestParts)]
#[from_request(via(Query), rejection(ApiError))]
pub struct ApiQuery<T>(pub T);

#[derive(Debug, FromRequestParts)]
#[from_request(via(Path), rejection(ApiError))]
pub struct ApiPath<T>(pub T);

#[derive(Debug, FromRequest)]
#[from_request(via(Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);
