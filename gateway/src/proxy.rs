use axum::body::{to_bytes, Body};
use axum::http::{HeaderMap, HeaderName, Request, StatusCode};
use axum::response::{IntoResponse, Response};
use common_auth::error::ErrorBody;
use thiserror::Error;
use tracing::warn;

/// Cap on buffered request/response bodies while proxying.
const MAX_BODY_BYTES: usize = 2 * 1024 * 1024;

// Connection-scoped headers that must not travel to the upstream (or back).
const HOP_BY_HOP: &[&str] = &[
    "host",
    "connection",
    "keep-alive",
    "proxy-authenticate",
    "proxy-authorization",
    "te",
    "trailers",
    "transfer-encoding",
    "upgrade",
    "content-length",
];

fn is_hop_by_hop(name: &HeaderName) -> bool {
    HOP_BY_HOP.contains(&name.as_str())
}

#[derive(Debug, Error)]
pub enum ProxyError {
    #[error("no upstream mapped for this path")]
    NoUpstream,
    #[error("failed to read request body: {0}")]
    BodyRead(String),
    #[error("upstream request failed: {0}")]
    Upstream(#[from] reqwest::Error),
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            ProxyError::NoUpstream => (
                StatusCode::NOT_FOUND,
                "NO_ROUTE",
                "No upstream service for this path".to_string(),
            ),
            ProxyError::BodyRead(detail) => (
                StatusCode::BAD_REQUEST,
                "BAD_BODY",
                format!("Unable to read request body: {detail}"),
            ),
            ProxyError::Upstream(err) => {
                warn!(error = %err, "upstream request failed");
                (
                    StatusCode::BAD_GATEWAY,
                    "UPSTREAM",
                    "Upstream service unavailable".to_string(),
                )
            }
        };
        ErrorBody::new(status, code, message).into_response()
    }
}

/// Forward an allowed request to `upstream` unchanged. The Authorization
/// header travels through untouched; only hop-by-hop headers are stripped.
pub async fn forward(
    client: &reqwest::Client,
    upstream: &str,
    request: Request<Body>,
) -> Result<Response, ProxyError> {
    let (parts, body) = request.into_parts();
    let payload = to_bytes(body, MAX_BODY_BYTES)
        .await
        .map_err(|err| ProxyError::BodyRead(err.to_string()))?;

    let mut url = format!("{}{}", upstream.trim_end_matches('/'), parts.uri.path());
    if let Some(query) = parts.uri.query() {
        url.push('?');
        url.push_str(query);
    }

    let mut outbound = client.request(parts.method.clone(), &url);
    for (name, value) in &parts.headers {
        if !is_hop_by_hop(name) {
            outbound = outbound.header(name, value);
        }
    }

    let upstream_response = outbound.body(payload).send().await?;

    let status = upstream_response.status();
    let mut headers = HeaderMap::new();
    for (name, value) in upstream_response.headers() {
        if !is_hop_by_hop(name) {
            headers.insert(name.clone(), value.clone());
        }
    }
    let body = upstream_response.bytes().await?;

    Ok((status, headers, body).into_response())
}
