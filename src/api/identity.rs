//! Caller identity extraction.
//!
//! Authentication is handled in front of this service (reverse proxy /
//! session layer); the authenticated user id arrives in the `x-user-id`
//! header and is trusted as-is.

use axum::{async_trait, extract::FromRequestParts, http::request::Parts};

use super::error::ApiError;

pub const USER_ID_HEADER: &str = "x-user-id";

/// The authenticated user's id.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub String);

#[async_trait]
impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user_id = parts
            .headers
            .get(USER_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .ok_or_else(|| ApiError::unauthorized("Missing x-user-id header"))?;

        Ok(CurrentUser(user_id.to_string()))
    }
}
