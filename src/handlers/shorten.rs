use crate::{
    error::{JsonError, LinkError},
    models::CreateLinkRequest,
    AppState,
};
use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use std::sync::Arc;

/// POST /shorten
///
/// Body: `{"url": "..."}`. Responds `201` with `{shortCode, shortUrl, longUrl}`.
pub async fn shorten(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let req: CreateLinkRequest = match serde_json::from_slice(&body) {
        Ok(req) => req,
        Err(_) => {
            return JsonError(StatusCode::BAD_REQUEST, "invalid JSON body".into()).into_response()
        }
    };

    let base_url = match &state.config.base_url {
        Some(url) => url.clone(),
        None => infer_base_url(&headers),
    };

    match state.allocator.allocate(&req.url, &base_url).await {
        Ok(allocation) => (StatusCode::CREATED, Json(allocation)).into_response(),
        Err(e) => error_response(e),
    }
}

fn error_response(err: LinkError) -> Response {
    let status = err.status();
    let message = match &err {
        LinkError::Validation(msg) => msg.clone(),
        LinkError::Exhausted => err.to_string(),
        LinkError::CodeGen(e) => {
            tracing::error!("Short code generation failed: {:?}", e);
            "failed to generate short code".into()
        }
        LinkError::Store(e) => {
            tracing::error!("Failed to store short url: {:?}", e);
            "failed to store short url".into()
        }
        // Not produced by allocation.
        LinkError::NotFound | LinkError::CorruptRecord(_) => err.to_string(),
    };
    JsonError(status, message).into_response()
}

/// Reconstruct the public origin from proxy headers: `x-forwarded-proto`
/// (default "https") plus `host`. Empty when the host is unknown, which
/// yields a path-only short URL.
fn infer_base_url(headers: &HeaderMap) -> String {
    let header = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
    };

    let proto = header("x-forwarded-proto").unwrap_or("https");
    match header("host") {
        Some(host) => format!("{proto}://{host}"),
        None => String::new(),
    }
}
