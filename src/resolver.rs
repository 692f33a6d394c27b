use crate::{
    error::LinkError,
    store::{self, LinkStore},
    url_check,
};
use std::{sync::Arc, time::Duration};
use tokio::task::JoinHandle;

/// A resolved short code.
#[derive(Debug)]
pub struct Resolution {
    pub long_url: String,
    /// Handle to the detached visit-counter update. Dropping it does not
    /// cancel the update; awaiting it only reports that the task finished,
    /// never whether the update succeeded.
    pub visit: JoinHandle<()>,
}

/// Looks up short codes and records visits.
#[derive(Clone)]
pub struct Resolver {
    store: Arc<dyn LinkStore>,
    store_timeout: Duration,
}

impl Resolver {
    pub fn new(store: Arc<dyn LinkStore>, store_timeout: Duration) -> Self {
        Self {
            store,
            store_timeout,
        }
    }

    /// Resolve `code` to its stored URL.
    ///
    /// The lookup is a consistent read. The hit counter update runs as a
    /// separate task after the URL has been validated and cannot change the
    /// result of this call.
    pub async fn resolve(&self, code: &str) -> Result<Resolution, LinkError> {
        if code.is_empty() {
            return Err(LinkError::Validation("missing short code".into()));
        }

        let link = store::bounded(self.store_timeout, self.store.get_consistent(code)).await?;

        if !url_check::is_valid_stored(&link.long_url) {
            tracing::error!(short_code = %code, "stored url failed validation");
            return Err(LinkError::CorruptRecord(code.to_owned()));
        }

        let visit = self.record_visit(code);

        Ok(Resolution {
            long_url: link.long_url,
            visit,
        })
    }

    /// Fire-and-forget `increment_hit_and_touch`.
    ///
    /// Failures here are intentionally unobservable to the caller: they are
    /// logged and dropped, never retried. Keep this off the request's await
    /// path; the redirect must not wait on or fail because of telemetry.
    fn record_visit(&self, code: &str) -> JoinHandle<()> {
        let store = Arc::clone(&self.store);
        let limit = self.store_timeout;
        let code = code.to_owned();

        tokio::spawn(async move {
            if let Err(e) = store::bounded(limit, store.increment_hit_and_touch(&code)).await {
                tracing::warn!(short_code = %code, error = %e, "visit counter update dropped");
            }
        })
    }
}
