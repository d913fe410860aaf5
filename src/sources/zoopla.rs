// src/sources/zoopla.rs

//! Zoopla listings API adapter.
//!
//! Page-number pagination: 1-based `page_number` parameter, 100 results
//! per page. The API key travels as a query parameter.

use std::collections::BTreeMap;

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::error::Result;
use crate::models::{id_from_value, ListingRecord};
use crate::sources::{PageCursor, ParsedPage, SourceAdapter};

const ENDPOINT: &str = "https://api.zoopla.co.uk/api/v1/property_listings.js";
const PAGE_SIZE: u32 = 100;

/// Adapter for the Zoopla property listings API.
pub struct ZooplaAdapter {
    base_params: BTreeMap<String, String>,
    api_key: String,
}

impl ZooplaAdapter {
    pub fn new(base_params: BTreeMap<String, String>, api_key: String) -> Self {
        Self {
            base_params,
            api_key,
        }
    }
}

/// Response envelope for one page.
#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(default)]
    listing: Vec<RawListing>,

    #[serde(default)]
    result_count: Option<u64>,
}

/// One raw Zoopla listing. The payload is flat; everything except the
/// identifier rides through as-is.
#[derive(Debug, Deserialize)]
struct RawListing {
    #[serde(default)]
    listing_id: Option<Value>,

    #[serde(flatten)]
    extra: Map<String, Value>,
}

impl From<RawListing> for ListingRecord {
    fn from(raw: RawListing) -> Self {
        ListingRecord {
            id: id_from_value(raw.listing_id.as_ref()),
            extra: raw.extra,
            ..ListingRecord::default()
        }
    }
}

impl SourceAdapter for ZooplaAdapter {
    fn name(&self) -> &'static str {
        "zoopla"
    }

    fn endpoint(&self) -> &'static str {
        ENDPOINT
    }

    fn first_cursor(&self) -> PageCursor {
        PageCursor::PageNumber {
            page: 1,
            page_size: PAGE_SIZE,
        }
    }

    fn page_params(&self, location_value: &str, cursor: &PageCursor) -> Vec<(String, String)> {
        let mut params: Vec<(String, String)> = self
            .base_params
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        params.push(("api_key".into(), self.api_key.clone()));
        params.push(("area".into(), location_value.to_string()));
        // The first page is implicit; the cursor only appears from page 2.
        if cursor.value() > 1 {
            params.push(("page_number".into(), cursor.value().to_string()));
        }
        params
    }

    fn parse_page(&self, body: &str) -> Result<ParsedPage> {
        let envelope: Envelope = serde_json::from_str(body)
            .map_err(|e| crate::error::AppError::parse(format!("zoopla envelope: {e}")))?;
        Ok(ParsedPage {
            records: envelope.listing.into_iter().map(ListingRecord::from).collect(),
            total: envelope.result_count,
        })
    }
}
