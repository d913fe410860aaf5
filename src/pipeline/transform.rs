// src/pipeline/transform.rs

//! Whole-dataset normalization.
//!
//! Runs once after all acquisition completes: nested per-listing
//! substructures are hoisted into a flat primary relation, and agent
//! and image data split off into side relations keyed by listing id.
//! A malformed field degrades to an empty cell; only a missing listing
//! identifier drops a row.

use chrono::{NaiveDate, NaiveDateTime};
use serde_json::Value;

use crate::models::{ListingRecord, Table};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";
const DAY_MONTH_YEAR_FORMAT: &str = "%d/%m/%Y";

/// The three output relations plus normalization counters.
#[derive(Debug, Default)]
pub struct NormalizedData {
    pub property_details: Table,
    pub estate_agent_details: Table,
    pub property_images: Table,

    /// Rows dropped for lacking a listing identifier. Zero under valid
    /// input; surfaced in the run summary either way.
    pub dropped_missing_id: usize,
}

/// Normalize the aggregated dataset into flat relations.
pub fn normalize(records: &[ListingRecord]) -> NormalizedData {
    let mut data = NormalizedData::default();

    for record in records {
        let Some(id) = record.id.clone() else {
            data.dropped_missing_id += 1;
            continue;
        };

        data.property_details.push_row(primary_row(&id, record));

        if !record.customer.is_empty() {
            let mut row = vec![("id".to_string(), id.clone())];
            for (key, value) in &record.customer {
                row.push((key.clone(), scalar(value)));
            }
            data.estate_agent_details.push_row(row);
        }

        let urls: Vec<&str> = record
            .property_images
            .images
            .iter()
            .filter_map(|image| image.src_url.as_deref())
            .collect();
        data.property_images.push_row(vec![
            ("id".to_string(), id),
            (
                "images".to_string(),
                serde_json::to_string(&urls).unwrap_or_else(|_| "[]".to_string()),
            ),
        ]);
    }

    if data.dropped_missing_id > 0 {
        log::warn!(
            "Dropped {} records without a listing identifier",
            data.dropped_missing_id
        );
    }

    data
}

/// Build one primary-relation row: scalar passthrough fields, hoisted
/// nested objects, and the derived added/reduced split.
fn primary_row(id: &str, record: &ListingRecord) -> Vec<(String, String)> {
    let mut row = vec![
        ("id".to_string(), id.to_string()),
        (
            "potential_location".to_string(),
            record.search_location.clone(),
        ),
    ];

    for (key, value) in &record.extra {
        // productLabel carries no data worth keeping flat.
        if key == "productLabel" {
            continue;
        }
        row.push((key.clone(), scalar(value)));
    }

    for (key, value) in &record.location {
        row.push((key.clone(), scalar(value)));
    }

    for (key, value) in &record.listing_update {
        if key == "listingUpdateDate" {
            row.push((key.clone(), reformat_timestamp(value)));
        } else {
            row.push((key.clone(), scalar(value)));
        }
    }

    if let Some(price) = &record.price {
        row.push((
            "currencyCode".to_string(),
            price.currency_code.clone().unwrap_or_default(),
        ));
        row.push((
            "amount".to_string(),
            price.amount.as_ref().map(scalar).unwrap_or_default(),
        ));
    }

    let (added_reduced, added_reduced_date) = split_added_or_reduced(record.added_or_reduced.as_deref());
    row.push(("addedReduced".to_string(), added_reduced));
    row.push(("addedReducedDate".to_string(), added_reduced_date));

    row.push((
        "firstVisibleDate".to_string(),
        record
            .first_visible_date
            .as_deref()
            .and_then(parse_timestamp)
            .map(|ts| ts.format(TIMESTAMP_FORMAT).to_string())
            .unwrap_or_default(),
    ));

    row
}

/// Split the combined display string on the literal `" on "` token.
/// The right part parses as a `DD/MM/YYYY` date; a missing token or an
/// unparseable date leaves the date empty.
fn split_added_or_reduced(raw: Option<&str>) -> (String, String) {
    let Some(raw) = raw else {
        return (String::new(), String::new());
    };
    match raw.split_once(" on ") {
        Some((status, date)) => {
            let parsed = NaiveDate::parse_from_str(date, DAY_MONTH_YEAR_FORMAT)
                .map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_else(|e| {
                    log::debug!("Unparseable addedOrReduced date {date:?}: {e}");
                    String::new()
                });
            (status.to_string(), parsed)
        }
        None => (raw.to_string(), String::new()),
    }
}

fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(raw, TIMESTAMP_FORMAT)
        .inspect_err(|e| log::debug!("Unparseable timestamp {raw:?}: {e}"))
        .ok()
}

/// Re-render a nested timestamp value through the expected pattern, so
/// malformed values degrade to empty instead of leaking through.
fn reformat_timestamp(value: &Value) -> String {
    value
        .as_str()
        .and_then(parse_timestamp)
        .map(|ts| ts.format(TIMESTAMP_FORMAT).to_string())
        .unwrap_or_default()
}

/// Render a JSON scalar as a cell value. Non-scalar leftovers keep
/// their JSON encoding.
fn scalar(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::{json, Map};

    use super::*;
    use crate::models::{ImageEntry, PriceDetail, PropertyImages};

    fn object(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    fn sample_record() -> ListingRecord {
        ListingRecord {
            id: Some("101".to_string()),
            search_location: "oxford".to_string(),
            location: object(json!({"latitude": 51.75, "longitude": -1.26})),
            listing_update: object(json!({
                "listingUpdateReason": "price_reduced",
                "listingUpdateDate": "2021-04-12T09:30:00Z"
            })),
            price: Some(PriceDetail {
                currency_code: Some("GBP".to_string()),
                amount: Some(json!(325000)),
            }),
            added_or_reduced: Some("Reduced on 12/04/2021".to_string()),
            first_visible_date: Some("2021-03-01T08:00:00Z".to_string()),
            customer: object(json!({"branchDisplayName": "Acme, Oxford"})),
            property_images: PropertyImages {
                images: vec![
                    ImageEntry {
                        src_url: Some("a.jpg".to_string()),
                    },
                    ImageEntry {
                        src_url: Some("b.jpg".to_string()),
                    },
                ],
            },
            extra: object(json!({
                "bedrooms": 3,
                "summary": "A fine house",
                "productLabel": {"productLabelText": ""}
            })),
        }
    }

    #[test]
    fn one_primary_row_per_record_with_id() {
        let mut no_id = sample_record();
        no_id.id = None;
        let records = vec![sample_record(), no_id, sample_record()];

        let data = normalize(&records);
        assert_eq!(data.property_details.len(), 2);
        assert_eq!(data.dropped_missing_id, 1);
    }

    #[test]
    fn nested_objects_are_hoisted() {
        let data = normalize(&[sample_record()]);
        let t = &data.property_details;

        assert_eq!(t.cell(0, "id"), Some("101"));
        assert_eq!(t.cell(0, "potential_location"), Some("oxford"));
        assert_eq!(t.cell(0, "latitude"), Some("51.75"));
        assert_eq!(t.cell(0, "listingUpdateReason"), Some("price_reduced"));
        assert_eq!(t.cell(0, "listingUpdateDate"), Some("2021-04-12T09:30:00Z"));
        assert_eq!(t.cell(0, "currencyCode"), Some("GBP"));
        assert_eq!(t.cell(0, "amount"), Some("325000"));
        assert_eq!(t.cell(0, "firstVisibleDate"), Some("2021-03-01T08:00:00Z"));
        assert_eq!(t.cell(0, "bedrooms"), Some("3"));
        // Dropped nested-object columns never reach the relation.
        assert!(!t.columns().contains(&"productLabel".to_string()));
        assert!(!t.columns().contains(&"location".to_string()));
        assert!(!t.columns().contains(&"customer".to_string()));
    }

    #[test]
    fn added_or_reduced_splits_on_token() {
        let data = normalize(&[sample_record()]);
        let t = &data.property_details;
        assert_eq!(t.cell(0, "addedReduced"), Some("Reduced"));
        assert_eq!(t.cell(0, "addedReducedDate"), Some("2021-04-12"));
    }

    #[test]
    fn added_or_reduced_without_token_has_null_date() {
        let mut record = sample_record();
        record.added_or_reduced = Some("Added today".to_string());

        let data = normalize(&[record]);
        let t = &data.property_details;
        assert_eq!(t.cell(0, "addedReduced"), Some("Added today"));
        assert_eq!(t.cell(0, "addedReducedDate"), Some(""));
    }

    #[test]
    fn malformed_dates_degrade_to_empty_cells() {
        let mut record = sample_record();
        record.first_visible_date = Some("not-a-date".to_string());
        record.listing_update = object(json!({"listingUpdateDate": "12/04/2021"}));
        record.added_or_reduced = Some("Reduced on someday".to_string());

        let data = normalize(&[record]);
        let t = &data.property_details;
        assert_eq!(t.cell(0, "firstVisibleDate"), Some(""));
        assert_eq!(t.cell(0, "listingUpdateDate"), Some(""));
        assert_eq!(t.cell(0, "addedReduced"), Some("Reduced"));
        assert_eq!(t.cell(0, "addedReducedDate"), Some(""));
    }

    #[test]
    fn agent_rows_keyed_by_listing_id() {
        let mut without_agent = sample_record();
        without_agent.id = Some("102".to_string());
        without_agent.customer = Map::new();

        let data = normalize(&[sample_record(), without_agent]);
        let t = &data.estate_agent_details;
        assert_eq!(t.len(), 1);
        assert_eq!(t.cell(0, "id"), Some("101"));
        assert_eq!(t.cell(0, "branchDisplayName"), Some("Acme, Oxford"));
    }

    #[test]
    fn image_rows_present_even_when_empty() {
        let mut no_images = sample_record();
        no_images.id = Some("102".to_string());
        no_images.property_images = PropertyImages::default();

        let data = normalize(&[sample_record(), no_images]);
        let t = &data.property_images;
        assert_eq!(t.len(), 2);
        assert_eq!(t.cell(0, "images"), Some(r#"["a.jpg","b.jpg"]"#));
        assert_eq!(t.cell(1, "images"), Some("[]"));
    }
}
