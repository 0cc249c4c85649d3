//! Per-request identity, carried via axum request extensions rather than
//! threaded through every handler signature. `auth_middleware` is the only
//! place that constructs a [`RequestContext`]; everything downstream just
//! pulls it out of the extension.

pub mod auth;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::StatusCode;

/// The authenticated caller for one request. `owner` is what gets written
/// into `metadata.owner` on every resource this request creates, and what
/// scoped list/search/write operations filter by.
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub owner: String,
    pub raw_token: Option<String>,
    pub is_system: bool,
}

impl RequestContext {
    pub fn system() -> Self {
        Self {
            owner: crate::domain::SYSTEM_OWNER.to_string(),
            raw_token: None,
            is_system: true,
        }
    }

    pub fn user(owner: impl Into<String>, raw_token: Option<String>) -> Self {
        Self {
            owner: owner.into(),
            raw_token,
            is_system: false,
        }
    }
}

/// Lets handlers take `ctx: RequestContext` as an extractor argument instead
/// of reaching into `request.extensions()` themselves.
#[async_trait::async_trait]
impl<S> FromRequestParts<S> for RequestContext
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, &'static str);

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<RequestContext>()
            .cloned()
            .ok_or((StatusCode::INTERNAL_SERVER_ERROR, "request context missing"))
    }
}
