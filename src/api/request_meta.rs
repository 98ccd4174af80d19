//! Request metadata extractor feeding the vote audit log.

use std::convert::Infallible;
use std::net::SocketAddr;

use axum::extract::{ConnectInfo, FromRequestParts, OriginalUri};
use axum::http::header::USER_AGENT;
use axum::http::request::Parts;

use crate::domain::VoteAudit;

const FORWARDED_FOR: &str = "x-forwarded-for";

/// Who sent a request and where it was addressed.
///
/// Never rejects: every field the request does not carry is simply absent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestMeta {
    /// First `X-Forwarded-For` hop, else the socket peer address.
    pub address: Option<String>,
    /// `User-Agent` header.
    pub agent: Option<String>,
    /// Path and query as the client sent them, before any nesting.
    pub path: String,
}

impl RequestMeta {
    /// Converts the metadata into an audit record.
    #[must_use]
    pub fn into_audit(self) -> VoteAudit {
        VoteAudit {
            requester_address: self.address,
            requester_agent: self.agent,
            request_path: self.path,
        }
    }
}

impl<S: Send + Sync> FromRequestParts<S> for RequestMeta {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let forwarded = parts
            .headers
            .get(FORWARDED_FOR)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(',').next())
            .map(str::trim)
            .filter(|hop| !hop.is_empty())
            .map(str::to_string);

        let address = forwarded.or_else(|| {
            parts
                .extensions
                .get::<ConnectInfo<SocketAddr>>()
                .map(|ConnectInfo(peer)| peer.ip().to_string())
        });

        let agent = parts
            .headers
            .get(USER_AGENT)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        let uri = parts
            .extensions
            .get::<OriginalUri>()
            .map_or(&parts.uri, |OriginalUri(uri)| uri);
        let path = uri
            .path_and_query()
            .map_or_else(|| uri.path().to_string(), |pq| pq.as_str().to_string());

        Ok(Self {
            address,
            agent,
            path,
        })
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use axum::http::Request;

    async fn extract(request: Request<()>) -> RequestMeta {
        let (mut parts, ()) = request.into_parts();
        let Ok(meta) = RequestMeta::from_request_parts(&mut parts, &()).await;
        meta
    }

    #[tokio::test]
    async fn forwarded_header_wins_over_peer() {
        let mut request = Request::builder()
            .uri("/api/v1/votes?src=web")
            .header(FORWARDED_FOR, "203.0.113.9, 10.0.0.1")
            .header(USER_AGENT, "curl/8.0")
            .body(())
            .unwrap_or_default();
        let peer: SocketAddr = ([127, 0, 0, 1], 4000).into();
        request.extensions_mut().insert(ConnectInfo(peer));

        let meta = extract(request).await;
        assert_eq!(meta.address.as_deref(), Some("203.0.113.9"));
        assert_eq!(meta.agent.as_deref(), Some("curl/8.0"));
        assert_eq!(meta.path, "/api/v1/votes?src=web");
    }

    #[tokio::test]
    async fn peer_address_is_the_fallback() {
        let mut request = Request::builder().uri("/votes").body(()).unwrap_or_default();
        let peer: SocketAddr = ([192, 168, 1, 7], 5555).into();
        request.extensions_mut().insert(ConnectInfo(peer));

        let meta = extract(request).await;
        assert_eq!(meta.address.as_deref(), Some("192.168.1.7"));
        assert!(meta.agent.is_none());
    }

    #[tokio::test]
    async fn nested_route_reports_original_path() {
        let mut request = Request::builder().uri("/votes").body(()).unwrap_or_default();
        let original: axum::http::Uri = "/api/v1/votes".parse().unwrap_or_default();
        request.extensions_mut().insert(OriginalUri(original));

        let meta = extract(request).await;
        assert_eq!(meta.path, "/api/v1/votes");
        assert!(meta.address.is_none());
    }
}
