use crate::{error::LinkError, AppState};
use axum::{
    extract::{Path, State},
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use std::sync::Arc;

/// GET /:code
///
/// 1. Consistent lookup of the short code.
/// 2. Validate the stored URL.
/// 3. The resolver spawns the hit-counter update; the response does not
///    wait for it.
/// 4. Return a 302 redirect with `cache-control: no-store` so every visit
///    reaches the server and gets counted.
pub async fn redirect(State(state): State<Arc<AppState>>, code: Option<Path<String>>) -> Response {
    let code = code.map(|Path(c)| c).unwrap_or_default();
    if code.is_empty() {
        return (StatusCode::BAD_REQUEST, "missing shortenCode").into_response();
    }

    // The visit handle is dropped: the counter update stays detached.
    let long_url = match state.resolver.resolve(&code).await {
        Ok(resolution) => resolution.long_url,
        Err(e) => return error_response(&code, e),
    };

    // The resolver already rejects URLs that are not valid header values.
    let location = match HeaderValue::try_from(long_url.as_str()) {
        Ok(v) => v,
        Err(_) => return error_response(&code, LinkError::CorruptRecord(code.clone())),
    };

    (
        StatusCode::FOUND,
        [
            (header::LOCATION, location),
            (header::CACHE_CONTROL, HeaderValue::from_static("no-store")),
        ],
    )
        .into_response()
}

fn error_response(code: &str, err: LinkError) -> Response {
    let body = match &err {
        LinkError::Validation(_) => "missing shortenCode",
        LinkError::NotFound => "not found",
        LinkError::CorruptRecord(_) => {
            tracing::error!("Short code '{}' has an invalid stored url", code);
            "invalid stored url"
        }
        LinkError::Store(e) => {
            tracing::error!("DB error looking up short code '{}': {:?}", code, e);
            "failed to load short url"
        }
        // Not produced by resolution.
        LinkError::Exhausted | LinkError::CodeGen(_) => "internal error",
    };
    (err.status(), body).into_response()
}
