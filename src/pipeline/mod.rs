// src/pipeline/mod.rs

//! Pipeline entry point: acquisition, normalization, output.

pub mod fetch;
pub mod output;
pub mod transform;

use std::path::Path;
use std::time::Duration;

use chrono::Utc;

pub use fetch::{FetchOutcome, Paginator, FAILURE_SENTINEL};
pub use transform::{normalize, NormalizedData};

use crate::config::load_source_config;
use crate::error::Result;
use crate::models::Config;
use crate::sources::build_adapter;
use crate::storage::ObjectStore;
use crate::utils::http::Transport;

/// Run-level switches from the CLI.
#[derive(Debug, Clone)]
pub struct PipelineOptions {
    /// Seconds to sleep between page requests.
    pub delay_secs: u64,

    /// Whether raw page bodies are archived.
    pub save_raw: bool,
}

/// Run the full pipeline over every configured source.
///
/// Returns `Err` only for configuration problems; per-page transport
/// and storage failures are logged and absorbed.
pub async fn run_pipeline(
    config: &Config,
    static_dir: &Path,
    transport: &dyn Transport,
    store: &dyn ObjectStore,
    options: &PipelineOptions,
) -> Result<()> {
    let run_date = Utc::now().date_naive();

    // Resolve every source up front so a configuration problem aborts
    // before the first request is issued.
    let mut sources = Vec::new();
    for name in &config.sources {
        let source_config = load_source_config(static_dir, name)?;
        let adapter = build_adapter(name, source_config.base_params.clone())?;
        sources.push((adapter, source_config));
    }

    let archive = options.save_raw.then_some((store, run_date));
    let paginator = Paginator::new(transport, archive, Duration::from_secs(options.delay_secs));

    for (adapter, source_config) in &sources {
        let outcome = paginator
            .fetch_source(adapter.as_ref(), &source_config.locations)
            .await;

        log::info!(
            "{}: collected {} records over {} pages across {} locations \
             ({} page failures, {} archive failures)",
            adapter.name(),
            outcome.records.len(),
            outcome.pages_fetched,
            outcome.locations,
            outcome.page_failures,
            outcome.archive_failures,
        );

        let normalized = normalize(&outcome.records);
        let output_failures =
            output::upload_transformed(store, adapter.name(), run_date, &normalized).await;
        if output_failures > 0 {
            log::warn!(
                "{}: {} transformed relations failed to write",
                adapter.name(),
                output_failures
            );
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use serde_json::json;
    use tempfile::TempDir;

    use super::*;
    use crate::error::AppError;
    use crate::storage::{raw_key, trans_key, LocalStore};

    struct ScriptedTransport {
        responses: Mutex<VecDeque<Result<(u16, String)>>>,
    }

    #[async_trait]
    impl Transport for ScriptedTransport {
        async fn get(&self, _url: &str, _params: &[(String, String)]) -> Result<(u16, String)> {
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(AppError::transport("script", "exhausted")))
        }
    }

    fn write_rightmove_config(static_dir: &std::path::Path) {
        let dir = static_dir.join("rightmove");
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(
            dir.join("locations.toml"),
            "[[locations]]\nname = \"oxford\"\nvalue = \"REGION^904\"\n",
        )
        .unwrap();
        std::fs::write(dir.join("base_params.toml"), "[params]\nchannel = \"BUY\"\n").unwrap();
    }

    fn page(id: u64, total: u64) -> Result<(u16, String)> {
        Ok((
            200,
            json!({"properties": [{"id": id}], "resultCount": total}).to_string(),
        ))
    }

    #[tokio::test]
    async fn transport_failure_mid_run_still_completes() {
        let static_dir = TempDir::new().unwrap();
        write_rightmove_config(static_dir.path());

        let store_dir = TempDir::new().unwrap();
        let store = LocalStore::new(store_dir.path());

        // total 100 -> offsets 0, 48, 72, 96; the second request fails
        let transport = ScriptedTransport {
            responses: Mutex::new(
                vec![
                    page(1, 100),
                    Ok((502, "bad gateway".into())),
                    page(3, 100),
                    page(4, 100),
                ]
                .into(),
            ),
        };

        let mut config = Config::default();
        config.sources = vec!["rightmove".into()];
        let options = PipelineOptions {
            delay_secs: 0,
            save_raw: true,
        };

        let result = run_pipeline(&config, static_dir.path(), &transport, &store, &options).await;
        assert!(result.is_ok());

        let run_date = Utc::now().date_naive();

        // Raw artifacts exist for every page attempt, failed one included.
        for offset in [0, 48, 72, 96] {
            let key = raw_key("rightmove", run_date, "oxford", offset);
            assert!(store.read_bytes(&key).await.unwrap().is_some(), "offset {offset}");
        }
        let failed = store
            .read_bytes(&raw_key("rightmove", run_date, "oxford", 48))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(failed, FAILURE_SENTINEL.as_bytes());

        // The normalized dataset contains only the surviving pages.
        let details = store
            .read_bytes(&trans_key("rightmove", run_date, "property_details"))
            .await
            .unwrap()
            .unwrap();
        let details = String::from_utf8(details).unwrap();
        assert_eq!(details.lines().count(), 4); // header + 3 rows
    }

    #[tokio::test]
    async fn missing_source_config_aborts_before_any_request() {
        let static_dir = TempDir::new().unwrap();
        let store_dir = TempDir::new().unwrap();
        let store = LocalStore::new(store_dir.path());
        let transport = ScriptedTransport {
            responses: Mutex::new(VecDeque::new()),
        };

        let mut config = Config::default();
        config.sources = vec!["rightmove".into()];
        let options = PipelineOptions {
            delay_secs: 0,
            save_raw: true,
        };

        let result = run_pipeline(&config, static_dir.path(), &transport, &store, &options).await;
        assert!(matches!(result, Err(AppError::Config(_))));
    }
}
