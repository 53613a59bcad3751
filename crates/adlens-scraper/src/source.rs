use std::future::Future;

use adlens_core::{Platform, ScrapeBatch};
use chrono::{DateTime, Utc};

use crate::error::ScraperError;

/// One upstream ad archive that can be scraped per target identifier.
///
/// Implementations hide the platform's response shape and activity rules
/// behind a [`ScrapeBatch`], so the ingestion pipeline persists every
/// platform the same way.
pub trait AdSource: Send + Sync {
    fn platform(&self) -> Platform;

    /// Fetches and normalizes everything the archive reports for `target_id`.
    ///
    /// `now` is the scrape time used for any time-relative rule.
    fn fetch_batch(
        &self,
        target_id: &str,
        now: DateTime<Utc>,
    ) -> impl Future<Output = Result<ScrapeBatch, ScraperError>> + Send;
}
