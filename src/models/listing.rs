//! Canonical listing record.
//!
//! Each source adapter translates its raw payload into `ListingRecord`
//! at the parse boundary, so nothing downstream touches source-specific
//! field names. Substructures the normalizer hoists are typed; scalars
//! that vary by source ride in `extra`.

use serde_json::{Map, Value};

/// One property listing in canonical form, tagged with the search
/// location it was fetched for.
#[derive(Debug, Clone, Default)]
pub struct ListingRecord {
    /// Listing identifier. Rows without one are dropped (and counted)
    /// during normalization.
    pub id: Option<String>,

    /// Location identifier of the configured search area; set by the
    /// aggregator at ingestion.
    pub search_location: String,

    /// Nested `location` object (lat/long etc.), hoisted to top level
    /// by the normalizer. Empty when the source has no such object.
    pub location: Map<String, Value>,

    /// Nested `listingUpdate` object (reason + timestamp).
    pub listing_update: Map<String, Value>,

    /// Nested price detail.
    pub price: Option<PriceDetail>,

    /// Combined "Added on ..." / "Reduced on ..." display string.
    pub added_or_reduced: Option<String>,

    /// First-visible timestamp, `YYYY-MM-DDThh:mm:ssZ`.
    pub first_visible_date: Option<String>,

    /// Nested `customer` (estate agent) object.
    pub customer: Map<String, Value>,

    /// Nested image list.
    pub property_images: PropertyImages,

    /// Remaining scalar fields, source-varying.
    pub extra: Map<String, Value>,
}

/// Price detail; only the currency and amount survive normalization.
#[derive(Debug, Clone, serde::Deserialize)]
pub struct PriceDetail {
    #[serde(rename = "currencyCode", default)]
    pub currency_code: Option<String>,

    #[serde(default)]
    pub amount: Option<Value>,
}

/// Nested `propertyImages` object.
#[derive(Debug, Clone, Default, serde::Deserialize)]
pub struct PropertyImages {
    #[serde(default)]
    pub images: Vec<ImageEntry>,
}

/// One entry of the nested image list.
#[derive(Debug, Clone, serde::Deserialize)]
pub struct ImageEntry {
    #[serde(rename = "srcUrl", default)]
    pub src_url: Option<String>,
}

/// Render a listing identifier from a raw JSON value. Sources disagree
/// on whether ids are numbers or strings.
pub fn id_from_value(value: Option<&Value>) -> Option<String> {
    match value {
        Some(Value::String(s)) if !s.is_empty() => Some(s.clone()),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    }
}
