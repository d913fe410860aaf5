// src/storage/mod.rs

//! Object-store abstractions and the archive key layout.
//!
//! Raw page bodies and transformed CSVs share one bucket, keyed by
//! processing state:
//!
//! ```text
//! raw/property_data/{source}/{yyyy}/{mm}/{dd}/{page}/{location}_{page}.json
//! trans/property_data/{source}/{yyyy}/{mm}/{dd}/{dataName}/{dataName}.csv
//! ```

pub mod local;
pub mod s3;

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::error::Result;

// Re-export for convenience
pub use local::LocalStore;
pub use s3::S3Store;

/// Write capability of an object store. The bucket is fixed per
/// deployment and owned by the implementation.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    async fn put(&self, key: &str, bytes: &[u8], content_type: &str) -> Result<()>;
}

/// Key for one raw page body. `page` is the request's actual cursor
/// value: a page number for page-number sources, an offset otherwise.
pub fn raw_key(source: &str, date: NaiveDate, location: &str, page: u32) -> String {
    format!(
        "raw/property_data/{}/{}/{}/{}_{}.json",
        source,
        date.format("%Y/%m/%d"),
        page,
        location,
        page
    )
}

/// Key for one transformed relation.
pub fn trans_key(source: &str, date: NaiveDate, data_name: &str) -> String {
    format!(
        "trans/property_data/{}/{}/{}/{}.csv",
        source,
        date.format("%Y/%m/%d"),
        data_name,
        data_name
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2021, 4, 12).unwrap()
    }

    #[test]
    fn raw_key_layout() {
        assert_eq!(
            raw_key("zoopla", date(), "oxford", 2),
            "raw/property_data/zoopla/2021/04/12/2/oxford_2.json"
        );
        assert_eq!(
            raw_key("rightmove", date(), "cambridge", 48),
            "raw/property_data/rightmove/2021/04/12/48/cambridge_48.json"
        );
    }

    #[test]
    fn trans_key_layout() {
        assert_eq!(
            trans_key("rightmove", date(), "property_details"),
            "trans/property_data/rightmove/2021/04/12/property_details/property_details.csv"
        );
    }
}
