// src/sources/mod.rs

//! Listing source adapters.
//!
//! Each portal differs in endpoint, parameter names, pagination cursor
//! semantics, and response envelope shape. Adapters are stateless; all
//! cursor state lives in the paginator's [`PageCursor`].

pub mod rightmove;
pub mod zoopla;

use std::collections::BTreeMap;

use crate::error::Result;
use crate::models::ListingRecord;

pub use rightmove::RightmoveAdapter;
pub use zoopla::ZooplaAdapter;

/// Pagination cursor, convention-agnostic from the paginator's view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageCursor {
    /// 1-based page number, fixed page size (Zoopla).
    PageNumber { page: u32, page_size: u32 },

    /// Result offset, fixed step (Rightmove). The first request is
    /// offset 0; follow-up offsets begin at `2 * step` and advance by
    /// `step`, so results `step..2*step` are never requested.
    Offset { index: u32, step: u32 },
}

impl PageCursor {
    /// Raw cursor value, used as the page component of raw archive keys.
    pub fn value(&self) -> u32 {
        match *self {
            PageCursor::PageNumber { page, .. } => page,
            PageCursor::Offset { index, .. } => index,
        }
    }

    /// Cursor for the page after this one, or `None` when the reported
    /// total is exhausted.
    pub fn next(&self, total: u64) -> Option<PageCursor> {
        match *self {
            PageCursor::PageNumber { page, page_size } => {
                let covered = u64::from(page) * u64::from(page_size);
                (covered < total).then_some(PageCursor::PageNumber {
                    page: page + 1,
                    page_size,
                })
            }
            PageCursor::Offset { index, step } => {
                let next = if index == 0 { 2 * step } else { index + step };
                (u64::from(next) < total).then_some(PageCursor::Offset { index: next, step })
            }
        }
    }
}

/// One parsed page of results.
#[derive(Debug, Default)]
pub struct ParsedPage {
    /// Listing records in page order, translated to canonical form.
    pub records: Vec<ListingRecord>,

    /// Source-reported total result count for the whole search, when
    /// the envelope carries one.
    pub total: Option<u64>,
}

/// Capability contract one listing portal implements.
pub trait SourceAdapter: Send + Sync {
    /// Source name, used in archive keys and logs.
    fn name(&self) -> &'static str;

    /// Fixed search endpoint URL.
    fn endpoint(&self) -> &'static str;

    /// Cursor for a location's first page.
    fn first_cursor(&self) -> PageCursor;

    /// Build the full query parameter set for one page request. Returns
    /// a fresh set each call; nothing is mutated between pages.
    fn page_params(&self, location_value: &str, cursor: &PageCursor) -> Vec<(String, String)>;

    /// Parse a raw page body into records plus the reported total.
    fn parse_page(&self, body: &str) -> Result<ParsedPage>;
}

/// Construct the adapter for a configured source name.
pub fn build_adapter(
    name: &str,
    base_params: BTreeMap<String, String>,
) -> Result<Box<dyn SourceAdapter>> {
    match name {
        "zoopla" => {
            let api_key = crate::config::zoopla_api_key()?;
            Ok(Box::new(ZooplaAdapter::new(base_params, api_key)))
        }
        "rightmove" => Ok(Box::new(RightmoveAdapter::new(base_params))),
        other => Err(crate::error::AppError::config(format!(
            "Unknown source: {other}"
        ))),
    }
}
