// src/pipeline/fetch.rs

//! Rate-limited page traversal and per-location aggregation.
//!
//! One logical thread of control: pages of one location are fetched in
//! sequence with a blocking delay between requests, locations in
//! config order. The delay is the sole throttle against the portals'
//! implicit rate limits.

use std::time::Duration;

use chrono::NaiveDate;

use crate::models::{ListingRecord, Location};
use crate::sources::SourceAdapter;
use crate::storage::{raw_key, ObjectStore};
use crate::utils::http::Transport;

/// Body archived in place of a failed page response.
pub const FAILURE_SENTINEL: &str = "\"INVALID REQUEST\"";

/// Counters and collected records for one source's acquisition run.
#[derive(Debug, Default)]
pub struct FetchOutcome {
    /// All records, tagged with their location identifier, in
    /// encounter order (location order, then page order).
    pub records: Vec<ListingRecord>,
    pub locations: usize,
    pub pages_fetched: usize,
    pub page_failures: usize,
    pub archive_failures: usize,
}

/// Rate-limited paginator over one source.
pub struct Paginator<'a> {
    transport: &'a dyn Transport,
    /// Raw archive sink plus the run date; `None` disables archival.
    archive: Option<(&'a dyn ObjectStore, NaiveDate)>,
    delay: Duration,
}

impl<'a> Paginator<'a> {
    pub fn new(
        transport: &'a dyn Transport,
        archive: Option<(&'a dyn ObjectStore, NaiveDate)>,
        delay: Duration,
    ) -> Self {
        Self {
            transport,
            archive,
            delay,
        }
    }

    /// Fetch every page for every configured location. A failure never
    /// crosses a location boundary; each location contributes whatever
    /// pages it could.
    pub async fn fetch_source(
        &self,
        adapter: &dyn SourceAdapter,
        locations: &[Location],
    ) -> FetchOutcome {
        let mut outcome = FetchOutcome::default();
        for location in locations {
            outcome.locations += 1;
            let mut records = self.fetch_location(adapter, location, &mut outcome).await;
            for record in &mut records {
                record.search_location = location.name.clone();
            }
            outcome.records.extend(records);
        }
        outcome
    }

    /// Traverse one location's pages until the cursor is exhausted.
    async fn fetch_location(
        &self,
        adapter: &dyn SourceAdapter,
        location: &Location,
        outcome: &mut FetchOutcome,
    ) -> Vec<ListingRecord> {
        log::info!("making request: {} ({})", location.name, adapter.name());

        let mut cursor = adapter.first_cursor();
        let mut collected = Vec::new();
        let mut total: Option<u64> = None;
        let mut first = true;

        loop {
            if !first {
                tokio::time::sleep(self.delay).await;
            }
            first = false;

            let params = adapter.page_params(&location.value, &cursor);
            let body = match self.transport.get(adapter.endpoint(), &params).await {
                Ok((200, body)) => body,
                Ok((status, _)) => {
                    log::warn!(
                        "{}: {} page {} returned status {}",
                        adapter.name(),
                        location.name,
                        cursor.value(),
                        status
                    );
                    outcome.page_failures += 1;
                    FAILURE_SENTINEL.to_string()
                }
                Err(e) => {
                    log::warn!(
                        "{}: {} page {} transport failure: {}",
                        adapter.name(),
                        location.name,
                        cursor.value(),
                        e
                    );
                    outcome.page_failures += 1;
                    FAILURE_SENTINEL.to_string()
                }
            };

            // Archive verbatim before any parse attempt, so a parse
            // failure never loses the raw artifact.
            self.archive_page(adapter.name(), &location.name, cursor.value(), &body, outcome)
                .await;
            outcome.pages_fetched += 1;

            match adapter.parse_page(&body) {
                Ok(page) => {
                    if page.total.is_some() {
                        total = page.total;
                    }
                    collected.extend(page.records);
                }
                Err(e) => {
                    log::debug!(
                        "{}: {} page {} yielded no records: {}",
                        adapter.name(),
                        location.name,
                        cursor.value(),
                        e
                    );
                }
            }

            match cursor.next(total.unwrap_or(0)) {
                Some(next) => cursor = next,
                None => break,
            }
        }

        if let Some(expected) = total {
            if expected as usize != collected.len() {
                log::warn!(
                    "{}: {} collected {} of {} reported results",
                    adapter.name(),
                    location.name,
                    collected.len(),
                    expected
                );
            }
        }

        collected
    }

    /// Best-effort raw archival; a storage error costs nothing but the
    /// artifact.
    async fn archive_page(
        &self,
        source: &str,
        location: &str,
        page: u32,
        body: &str,
        outcome: &mut FetchOutcome,
    ) {
        let Some((store, date)) = self.archive else {
            return;
        };
        let key = raw_key(source, date, location, page);
        if let Err(e) = store.put(&key, body.as_bytes(), "application/json").await {
            log::warn!("Raw archival failed for {}: {}", key, e);
            outcome.archive_failures += 1;
        }
    }
}
