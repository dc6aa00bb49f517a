use axum::{
    body::Body,
    extract::Request,
    http::HeaderValue,
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

/// HTTP header name for request ID
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Request id carried through request extensions and echoed on responses
#[derive(Clone, Copy, Debug)]
pub struct RequestId(Uuid);

impl RequestId {
    fn from_headers(request: &Request) -> Option<Self> {
        request
            .headers()
            .get(REQUEST_ID_HEADER)?
            .to_str()
            .ok()?
            .parse::<Uuid>()
            .ok()
            .map(Self)
    }
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// Attaches an id to every request, reusing a valid caller-supplied
/// `x-request-id` header and generating a fresh UUID v4 otherwise.
pub async fn propagate_request_id(mut request: Request, next: Next) -> Response {
    let request_id =
        RequestId::from_headers(&request).unwrap_or_else(|| RequestId(Uuid::new_v4()));

    request.extensions_mut().insert(request_id);

    let mut response = next.run(request).await;

    if let Ok(value) = HeaderValue::from_str(&request_id.to_string()) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }

    response
}

/// Span factory for the HTTP trace layer; tags spans with the request id.
pub fn trace_span(request: &Request<Body>) -> tracing::Span {
    let request_id = request
        .extensions()
        .get::<RequestId>()
        .map(|id| id.to_string())
        .unwrap_or_else(|| "unknown".to_string());

    tracing::info_span!(
        "http_request",
        method = %request.method(),
        uri = %request.uri(),
        request_id = %request_id,
    )
}
