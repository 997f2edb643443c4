use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use mint_core::models::normalize_identity;
use mint_core::Error;

use crate::error::ApiError;

/// Header set by the authenticating proxy in front of this service.
pub const IDENTITY_HEADER: &str = "x-authenticated-identity";

/// The caller's verified identity, normalized. Trusted as given.
#[derive(Debug, Clone)]
pub struct Identity(pub String);

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for Identity {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let raw = parts
            .headers
            .get(IDENTITY_HEADER)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| Error::InvalidInput(format!("missing {} header", IDENTITY_HEADER)))?;
        Ok(Identity(normalize_identity(raw)?))
    }
}
