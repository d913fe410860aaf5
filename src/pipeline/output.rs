// src/pipeline/output.rs

//! Transformed output writing.
//!
//! Serializes the three relations as CSV under the `trans/` key layout.
//! Write failures are logged and counted, never fatal.

use chrono::NaiveDate;

use crate::pipeline::transform::NormalizedData;
use crate::storage::{trans_key, ObjectStore};

/// Upload the normalized relations. Returns the number of failed
/// writes.
pub async fn upload_transformed(
    store: &dyn ObjectStore,
    source: &str,
    date: NaiveDate,
    data: &NormalizedData,
) -> usize {
    let relations = [
        (&data.property_details, "property_details"),
        (&data.estate_agent_details, "estate_agent_details"),
        (&data.property_images, "property_images"),
    ];

    let mut failures = 0;
    for (table, data_name) in relations {
        let key = trans_key(source, date, data_name);
        let encoded = match table.to_csv() {
            Ok(encoded) => encoded,
            Err(e) => {
                log::warn!("CSV encoding failed for {}: {}", key, e);
                failures += 1;
                continue;
            }
        };

        match store.put(&key, encoded.as_bytes(), "text/csv").await {
            Ok(()) => log::info!("Wrote {} rows to {}", table.len(), key),
            Err(e) => {
                log::warn!("Output write failed for {}: {}", key, e);
                failures += 1;
            }
        }
    }
    failures
}
