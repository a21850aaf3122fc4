//! # Viewer Extraction
//!
//! Session handling terminates upstream; requests arrive with the
//! authenticated user id in the `x-user-id` header. No header means an
//! anonymous viewer. A header that fails to parse is rejected outright
//! rather than silently demoted to anonymous.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::error::ApiError;

pub const VIEWER_HEADER: &str = "x-user-id";

/// The authenticated viewer, if any.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewer(pub Option<i64>);

impl Viewer {
    /// Unwraps the viewer or rejects with 401 using `action` in the
    /// message, e.g. "submit" or "comment".
    pub fn require(self, action: &str) -> Result<i64, ApiError> {
        self.0
            .ok_or_else(|| ApiError::Unauthorized(format!("sign in to {action}")))
    }
}

impl<S> FromRequestParts<S> for Viewer
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let Some(raw) = parts.headers.get(VIEWER_HEADER) else {
            return Ok(Viewer(None));
        };
        let id = raw
            .to_str()
            .ok()
            .and_then(|value| value.trim().parse::<i64>().ok())
            .ok_or_else(|| ApiError::Unauthorized("malformed x-user-id header".to_string()))?;
        Ok(Viewer(Some(id)))
    }
}
