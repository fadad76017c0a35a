// ABOUTME: Authentication context for API requests
// ABOUTME: Reads the tenant and user identity forwarded by the upstream gateway

use axum::{
    extract::FromRequestParts,
    http::{request::Parts, HeaderMap},
    response::{IntoResponse, Response},
};

use crate::error::ApiError;

pub const TENANT_HEADER: &str = "x-tenant-id";
pub const USER_HEADER: &str = "x-user-id";

/// Current authenticated user
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CurrentUser {
    pub tenant_id: i64,
    pub user_id: i64,
}

impl CurrentUser {
    fn from_headers(headers: &HeaderMap) -> Result<Self, ApiError> {
        Ok(Self {
            tenant_id: id_header(headers, TENANT_HEADER)?,
            user_id: id_header(headers, USER_HEADER)?,
        })
    }
}

fn id_header(headers: &HeaderMap, name: &str) -> Result<i64, ApiError> {
    let raw = headers
        .get(name)
        .ok_or_else(|| ApiError::Unauthorized(format!("missing {} header", name)))?;

    raw.to_str()
        .ok()
        .and_then(|value| value.trim().parse::<i64>().ok())
        .filter(|id| *id > 0)
        .ok_or_else(|| ApiError::Unauthorized(format!("malformed {} header", name)))
}

impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Self::from_headers(&parts.headers).map_err(IntoResponse::into_response)
    }
}
