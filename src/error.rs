use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

/// Failure to produce a candidate short code.
#[derive(Debug, thiserror::Error)]
pub enum CodeError {
    #[error("invalid code length")]
    InvalidLength,

    #[error("random source unavailable: {0}")]
    RandomSourceUnavailable(String),
}

/// Errors reported by a [`crate::store::LinkStore`] implementation.
///
/// `AlreadyExists` is the conditional-insert signal and must stay a distinct
/// variant: the allocator retries on it and on nothing else.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("short code already exists")]
    AlreadyExists,

    #[error("short code not found")]
    NotFound,

    #[error("store call timed out")]
    Timeout,

    #[error("undecodable stored record: {0}")]
    Corrupt(String),

    #[error("database error: {0}")]
    Backend(#[from] sqlx::Error),
}

/// Outcome of the create/resolve operations as seen by the request layer.
#[derive(Debug, thiserror::Error)]
pub enum LinkError {
    /// Client input was malformed. The message is surfaced verbatim.
    #[error("{0}")]
    Validation(String),

    #[error("could not allocate a unique short code")]
    Exhausted,

    #[error("not found")]
    NotFound,

    /// The stored URL no longer satisfies the record invariants.
    #[error("invalid stored url for '{0}'")]
    CorruptRecord(String),

    #[error("failed to generate short code: {0}")]
    CodeGen(#[from] CodeError),

    #[error("store error: {0}")]
    Store(StoreError),
}

impl LinkError {
    pub fn status(&self) -> StatusCode {
        match self {
            LinkError::Validation(_) => StatusCode::BAD_REQUEST,
            LinkError::Exhausted => StatusCode::SERVICE_UNAVAILABLE,
            LinkError::NotFound => StatusCode::NOT_FOUND,
            LinkError::CorruptRecord(_) | LinkError::CodeGen(_) | LinkError::Store(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl From<StoreError> for LinkError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound => LinkError::NotFound,
            other => LinkError::Store(other),
        }
    }
}

/// JSON error body used by the create endpoint: `{"error": "..."}`.
pub struct JsonError(pub StatusCode, pub String);

impl IntoResponse for JsonError {
    fn into_response(self) -> Response {
        (self.0, Json(json!({ "error": self.1 }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_from_store_is_not_a_fault() {
        let err = LinkError::from(StoreError::NotFound);
        assert!(matches!(err, LinkError::NotFound));
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn store_faults_map_to_server_error() {
        let err = LinkError::from(StoreError::Timeout);
        assert!(matches!(err, LinkError::Store(StoreError::Timeout)));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn exhaustion_is_retryable() {
        assert_eq!(LinkError::Exhausted.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn corrupt_record_is_server_fault() {
        let err = LinkError::CorruptRecord("abc".into());
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
