// src/config.rs

//! Static configuration loading.
//!
//! Each source carries two files under the static directory:
//!
//! ```text
//! static/
//! ├── config.toml                # optional crawler settings
//! ├── rightmove/
//! │   ├── locations.toml         # [[locations]] name/value pairs
//! │   └── base_params.toml       # [params] string map
//! └── zoopla/
//!     ├── locations.toml
//!     └── base_params.toml
//! ```
//!
//! Missing source files are fatal: the run aborts before any request.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::error::{AppError, Result};
use crate::models::{Location, SourceConfig};

/// Environment variable holding the Zoopla API key.
pub const ZOOPLA_API_KEY_VAR: &str = "ZOOPLA_API_KEY";

#[derive(Debug, Deserialize)]
struct LocationsFile {
    #[serde(default)]
    locations: Vec<Location>,
}

#[derive(Debug, Deserialize)]
struct BaseParamsFile {
    #[serde(default)]
    params: BTreeMap<String, String>,
}

fn load_toml<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let content = fs::read_to_string(path)
        .map_err(|e| AppError::config(format!("Cannot read {}: {e}", path.display())))?;
    Ok(toml::from_str(&content)?)
}

/// Load a source's locations and base query parameters.
pub fn load_source_config(static_dir: &Path, source: &str) -> Result<SourceConfig> {
    let dir = static_dir.join(source);

    let locations: LocationsFile = load_toml(&dir.join("locations.toml"))?;
    if locations.locations.is_empty() {
        return Err(AppError::config(format!(
            "No locations configured for {source}"
        )));
    }

    let base_params: BaseParamsFile = load_toml(&dir.join("base_params.toml"))?;

    Ok(SourceConfig {
        locations: locations.locations,
        base_params: base_params.params,
    })
}

/// Read the Zoopla API key from the environment. The key is never
/// stored in config files.
pub fn zoopla_api_key() -> Result<String> {
    std::env::var(ZOOPLA_API_KEY_VAR)
        .map_err(|_| AppError::config(format!("Missing environment variable {ZOOPLA_API_KEY_VAR}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_source(dir: &Path, source: &str, locations: &str, params: &str) {
        let src = dir.join(source);
        fs::create_dir_all(&src).unwrap();
        fs::write(src.join("locations.toml"), locations).unwrap();
        fs::write(src.join("base_params.toml"), params).unwrap();
    }

    #[test]
    fn loads_locations_in_file_order() {
        let tmp = TempDir::new().unwrap();
        write_source(
            tmp.path(),
            "rightmove",
            r#"
            [[locations]]
            name = "oxford"
            value = "REGION^904"

            [[locations]]
            name = "cambridge"
            value = "REGION^274"
            "#,
            r#"
            [params]
            channel = "BUY"
            "#,
        );

        let config = load_source_config(tmp.path(), "rightmove").unwrap();
        let names: Vec<_> = config.locations.iter().map(|l| l.name.as_str()).collect();
        assert_eq!(names, ["oxford", "cambridge"]);
        assert_eq!(config.base_params.get("channel"), Some(&"BUY".to_string()));
    }

    #[test]
    fn missing_source_dir_is_config_error() {
        let tmp = TempDir::new().unwrap();
        let err = load_source_config(tmp.path(), "zoopla").unwrap_err();
        assert!(matches!(err, AppError::Config(_)));
    }

    #[test]
    fn empty_locations_is_config_error() {
        let tmp = TempDir::new().unwrap();
        write_source(tmp.path(), "zoopla", "locations = []", "[params]");
        assert!(load_source_config(tmp.path(), "zoopla").is_err());
    }
}
