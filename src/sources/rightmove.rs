// src/sources/rightmove.rs

//! Rightmove search API adapter.
//!
//! Offset pagination: `index` parameter, 24 results per page, first
//! page implicit at offset 0. The envelope's `resultCount` arrives as
//! either a number or a formatted string ("1,234").

use std::collections::BTreeMap;

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::error::Result;
use crate::models::{id_from_value, ListingRecord, PriceDetail, PropertyImages};
use crate::sources::{PageCursor, ParsedPage, SourceAdapter};

const ENDPOINT: &str = "https://www.rightmove.co.uk/api/_search";
const PAGE_STEP: u32 = 24;

/// Adapter for the Rightmove search API.
pub struct RightmoveAdapter {
    base_params: BTreeMap<String, String>,
}

impl RightmoveAdapter {
    pub fn new(base_params: BTreeMap<String, String>) -> Self {
        Self { base_params }
    }
}

/// Response envelope for one page.
#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(default)]
    properties: Vec<RawProperty>,

    #[serde(rename = "resultCount", default)]
    result_count: Option<Value>,
}

/// One raw Rightmove property. Nested objects the normalizer cares
/// about are pulled out here; remaining scalars flatten into `extra`.
#[derive(Debug, Deserialize)]
struct RawProperty {
    #[serde(default)]
    id: Option<Value>,

    #[serde(default)]
    location: Option<Map<String, Value>>,

    #[serde(rename = "listingUpdate", default)]
    listing_update: Option<Map<String, Value>>,

    #[serde(default)]
    price: Option<PriceDetail>,

    #[serde(rename = "addedOrReduced", default)]
    added_or_reduced: Option<String>,

    #[serde(rename = "firstVisibleDate", default)]
    first_visible_date: Option<String>,

    #[serde(default)]
    customer: Option<Map<String, Value>>,

    #[serde(rename = "propertyImages", default)]
    property_images: Option<PropertyImages>,

    #[serde(flatten)]
    extra: Map<String, Value>,
}

impl From<RawProperty> for ListingRecord {
    fn from(raw: RawProperty) -> Self {
        ListingRecord {
            id: id_from_value(raw.id.as_ref()),
            search_location: String::new(),
            location: raw.location.unwrap_or_default(),
            listing_update: raw.listing_update.unwrap_or_default(),
            price: raw.price,
            added_or_reduced: raw.added_or_reduced,
            first_visible_date: raw.first_visible_date,
            customer: raw.customer.unwrap_or_default(),
            property_images: raw.property_images.unwrap_or_default(),
            extra: raw.extra,
        }
    }
}

/// Coerce the reported total to a count.
fn total_from_value(value: Option<&Value>) -> Option<u64> {
    match value {
        Some(Value::Number(n)) => n.as_u64(),
        Some(Value::String(s)) => s.replace(',', "").parse().ok(),
        _ => None,
    }
}

impl SourceAdapter for RightmoveAdapter {
    fn name(&self) -> &'static str {
        "rightmove"
    }

    fn endpoint(&self) -> &'static str {
        ENDPOINT
    }

    fn first_cursor(&self) -> PageCursor {
        PageCursor::Offset {
            index: 0,
            step: PAGE_STEP,
        }
    }

    fn page_params(&self, location_value: &str, cursor: &PageCursor) -> Vec<(String, String)> {
        let mut params: Vec<(String, String)> = self
            .base_params
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        params.push(("locationIdentifier".into(), location_value.to_string()));
        // Offset 0 is the implicit first page.
        if cursor.value() > 0 {
            params.push(("index".into(), cursor.value().to_string()));
        }
        params
    }

    fn parse_page(&self, body: &str) -> Result<ParsedPage> {
        let envelope: Envelope = serde_json::from_str(body)
            .map_err(|e| crate::error::AppError::parse(format!("rightmove envelope: {e}")))?;
        Ok(ParsedPage {
            total: total_from_value(envelope.result_count.as_ref()),
            records: envelope
                .properties
                .into_iter()
                .map(ListingRecord::from)
                .collect(),
        })
    }
}
