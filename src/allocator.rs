use crate::{
    codegen,
    error::{LinkError, StoreError},
    models::{Allocation, Link},
    store::{self, LinkStore},
    url_check,
};
use std::{sync::Arc, time::Duration};

/// Creates new short-code mappings.
///
/// Uniqueness comes solely from the store's conditional insert: a fresh code
/// is generated and inserted, and on a collision another fresh code is tried,
/// up to `max_attempts` times. There is no separate existence check.
#[derive(Clone)]
pub struct Allocator {
    store: Arc<dyn LinkStore>,
    code_length: usize,
    max_attempts: u32,
    store_timeout: Duration,
}

impl Allocator {
    pub fn new(
        store: Arc<dyn LinkStore>,
        code_length: usize,
        max_attempts: u32,
        store_timeout: Duration,
    ) -> Self {
        Self {
            store,
            code_length,
            max_attempts,
            store_timeout,
        }
    }

    /// Validate `long_url` and bind it to a newly allocated short code.
    /// `base_url` must not have a trailing slash.
    pub async fn allocate(&self, long_url: &str, base_url: &str) -> Result<Allocation, LinkError> {
        let long_url = url_check::canonicalize(long_url).map_err(LinkError::Validation)?;

        for attempt in 1..=self.max_attempts {
            let code = codegen::generate(self.code_length)?;
            let link = Link::new(code, long_url.as_str());

            match store::bounded(self.store_timeout, self.store.insert_if_absent(&link)).await {
                Ok(()) => {
                    tracing::info!(
                        short_code = %link.short_code,
                        attempt,
                        "allocated short code"
                    );
                    return Ok(Allocation {
                        short_url: format!("{}/{}", base_url, link.short_code),
                        short_code: link.short_code,
                        long_url,
                    });
                }
                Err(StoreError::AlreadyExists) => {
                    tracing::debug!(short_code = %link.short_code, attempt, "short code collision");
                    continue;
                }
                Err(e) => return Err(LinkError::Store(e)),
            }
        }

        tracing::warn!(
            attempts = self.max_attempts,
            "could not allocate a unique short code"
        );
        Err(LinkError::Exhausted)
    }
}
