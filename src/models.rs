use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A short-code mapping: the only persisted record.
///
/// Everything except `hits` and `last_visited` is fixed at creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Link {
    pub short_code: String,
    pub long_url: String,
    pub created_at: DateTime<Utc>,
    pub hits: i64,
    pub last_visited: Option<DateTime<Utc>>,
}

impl Link {
    /// A fresh, never-visited record.
    pub fn new(short_code: impl Into<String>, long_url: impl Into<String>) -> Self {
        Self {
            short_code: short_code.into(),
            long_url: long_url.into(),
            created_at: Utc::now(),
            hits: 0,
            last_visited: None,
        }
    }
}

/// Body of `POST /shorten`.
#[derive(Debug, Deserialize)]
pub struct CreateLinkRequest {
    #[serde(default)]
    pub url: String,
}

/// Successful result of an allocation; also the `201` response body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Allocation {
    pub short_code: String,
    pub short_url: String,
    pub long_url: String,
}
