//! Request extractors.

use std::convert::Infallible;
use std::net::SocketAddr;

use axum::extract::{ConnectInfo, FromRequestParts};
use axum::http::request::Parts;
use turtle_core::RequestOrigin;

/// Header set by reverse proxies with the original client address.
const FORWARDED_FOR: &str = "x-forwarded-for";

/// The transport-level origin of a request.
///
/// Never rejects: identity is only resolved once an update actually needs
/// it, so help and reset requests work without a usable address.
#[derive(Debug, Clone)]
pub struct ClientOrigin(pub RequestOrigin);

impl<S> FromRequestParts<S> for ClientOrigin
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let forwarded_for = parts
            .headers
            .get(FORWARDED_FOR)
            .and_then(|value| value.to_str().ok())
            .map(ToOwned::to_owned);
        let peer = parts
            .extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| *addr);

        Ok(Self(RequestOrigin {
            forwarded_for,
            peer,
        }))
    }
}
