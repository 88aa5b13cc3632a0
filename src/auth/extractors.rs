use std::convert::Infallible;

use axum::{async_trait, extract::FromRequestParts, http::request::Parts};

/// Raw token from the `Bearer` request header, if one was sent.
///
/// The token travels in a header literally named `Bearer`, not in
/// `Authorization`. An empty header counts as absent; any other value,
/// including non-ASCII bytes, is handed on to token verification.
pub struct BearerToken(pub Option<String>);

pub const BEARER_HEADER: &str = "bearer";

#[async_trait]
impl<S> FromRequestParts<S> for BearerToken
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(BEARER_HEADER)
            .map(|h| String::from_utf8_lossy(h.as_bytes()).trim().to_owned())
            .filter(|t| !t.is_empty());
        Ok(BearerToken(token))
    }
}
