//! Dataset Refresh Pipeline
//!
//! Pulls the states feed, parses it into generic rows, maps and validates
//! every row, and only then replaces the stored dataset in one transaction.
//! A failure at any stage leaves the currently stored dataset untouched.
//!
//! Two feed shapes are in circulation: the Rdatasets CSV export with R-style
//! headers (`rownames`, `Life Exp`, `HS Grad`) and a JSON array-of-objects
//! mirror. Both funnel into the same field mapping, so the pipeline does not
//! care which one it was pointed at.

use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use stateline_core::{record_from_row, IngestError, StateRecord};

use crate::db::StateStore;

/// Feed used when `STATELINE_SOURCE_URL` is not set.
pub const DEFAULT_SOURCE_URL: &str =
    "https://raw.githubusercontent.com/vincentarelbundock/Rdatasets/master/csv/datasets/state.x77.csv";

/// Bound on the whole fetch leg, connect through body.
const FETCH_TIMEOUT: Duration = Duration::from_secs(30);

// ============================================================================
// SOURCE CONFIGURATION
// ============================================================================

/// Payload shape of the upstream feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    Csv,
    Json,
}

impl SourceFormat {
    /// Parse an explicit format name, case-insensitive.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "csv" => Some(SourceFormat::Csv),
            "json" => Some(SourceFormat::Json),
            _ => None,
        }
    }

    /// Guess the format from the URL path extension. Anything that is not
    /// `.json` is treated as CSV, matching the default feed.
    pub fn infer(url: &str) -> Self {
        let path = url
            .split(|c| c == '?' || c == '#')
            .next()
            .unwrap_or(url);
        if path.to_ascii_lowercase().ends_with(".json") {
            SourceFormat::Json
        } else {
            SourceFormat::Csv
        }
    }
}

/// Where the refresh pipeline pulls the dataset from.
#[derive(Debug, Clone)]
pub struct SourceConfig {
    pub url: String,
    pub format: SourceFormat,
}

impl SourceConfig {
    /// Read source configuration from the environment.
    ///
    /// `STATELINE_SOURCE_URL` defaults to the Rdatasets CSV export;
    /// `STATELINE_SOURCE_FORMAT` (`csv` | `json`) overrides the extension
    /// based inference.
    pub fn from_env() -> Self {
        let url = std::env::var("STATELINE_SOURCE_URL")
            .unwrap_or_else(|_| DEFAULT_SOURCE_URL.to_string());
        let format = std::env::var("STATELINE_SOURCE_FORMAT")
            .ok()
            .and_then(|s| SourceFormat::parse(&s))
            .unwrap_or_else(|| SourceFormat::infer(&url));
        Self { url, format }
    }
}

/// Outbound HTTP client for feed fetches, shared by the server job and the
/// one-shot CLI.
pub fn http_client() -> reqwest::Result<reqwest::Client> {
    reqwest::Client::builder().timeout(FETCH_TIMEOUT).build()
}

// ============================================================================
// REFRESH REPORT
// ============================================================================

/// Summary of one completed refresh.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshReport {
    /// Rows written to the store.
    pub records_written: u64,
    /// Feed the dataset was pulled from.
    pub source: String,
    /// Wall-clock duration of the whole pipeline.
    pub elapsed_ms: u64,
    pub completed_at: DateTime<Utc>,
}

// ============================================================================
// PIPELINE
// ============================================================================

/// Fetch the configured feed and replace the stored dataset with it.
///
/// Every row must map to a valid record before anything is written; one bad
/// row fails the whole refresh. The write itself is a single transaction in
/// [`StateStore::replace_all`], so callers observe either the old dataset or
/// the new one, never a mix.
pub async fn refresh(
    store: &StateStore,
    client: &reqwest::Client,
    config: &SourceConfig,
) -> Result<RefreshReport, IngestError> {
    let started = Instant::now();
    tracing::info!(source = %config.url, format = ?config.format, "Refreshing states dataset");

    let payload = fetch_payload(client, config).await?;
    let rows = parse_rows(&payload, config.format)?;
    let records = map_rows(&rows)?;

    let records_written = store
        .replace_all(&records)
        .await
        .map_err(|e| IngestError::StoreWriteFailed(e.to_string()))?;

    let report = RefreshReport {
        records_written,
        source: config.url.clone(),
        elapsed_ms: started.elapsed().as_millis() as u64,
        completed_at: Utc::now(),
    };
    tracing::info!(
        records = report.records_written,
        elapsed_ms = report.elapsed_ms,
        "Dataset refresh complete"
    );

    Ok(report)
}

/// GET the feed body as text. Non-success statuses fail here rather than
/// surfacing later as a parse error.
async fn fetch_payload(
    client: &reqwest::Client,
    config: &SourceConfig,
) -> Result<String, IngestError> {
    let fetch_err = |reason: String| IngestError::SourceFetchFailed {
        url: config.url.clone(),
        reason,
    };

    let response = client
        .get(&config.url)
        .send()
        .await
        .map_err(|e| fetch_err(e.to_string()))?
        .error_for_status()
        .map_err(|e| fetch_err(e.to_string()))?;

    response.text().await.map_err(|e| fetch_err(e.to_string()))
}

/// Parse the payload into generic rows. An empty feed is refused: replacing
/// fifty states with nothing is a broken feed, not a valid dataset.
fn parse_rows(payload: &str, format: SourceFormat) -> Result<Vec<Map<String, Value>>, IngestError> {
    let rows = match format {
        SourceFormat::Csv => parse_csv(payload)?,
        SourceFormat::Json => parse_json(payload)?,
    };

    if rows.is_empty() {
        return Err(IngestError::SourceParseFailed(
            "source contained no rows".to_string(),
        ));
    }

    Ok(rows)
}

fn parse_csv(payload: &str) -> Result<Vec<Map<String, Value>>, IngestError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(payload.as_bytes());

    let headers = reader
        .headers()
        .map_err(|e| IngestError::SourceParseFailed(format!("bad CSV header: {}", e)))?
        .clone();

    let mut rows = Vec::new();
    for (i, result) in reader.records().enumerate() {
        let record = result
            .map_err(|e| IngestError::SourceParseFailed(format!("CSV record {}: {}", i + 1, e)))?;

        let mut row = Map::new();
        for (header, value) in headers.iter().zip(record.iter()) {
            row.insert(header.to_string(), Value::String(value.to_string()));
        }
        rows.push(row);
    }

    Ok(rows)
}

fn parse_json(payload: &str) -> Result<Vec<Map<String, Value>>, IngestError> {
    let value: Value = serde_json::from_str(payload)
        .map_err(|e| IngestError::SourceParseFailed(format!("bad JSON: {}", e)))?;

    let items = value.as_array().ok_or_else(|| {
        IngestError::SourceParseFailed("expected a JSON array of objects".to_string())
    })?;

    items
        .iter()
        .map(|item| {
            item.as_object().cloned().ok_or_else(|| {
                IngestError::SourceParseFailed("expected a JSON array of objects".to_string())
            })
        })
        .collect()
}

/// Map every row or fail the batch. Row numbers in the error are 1-based to
/// match what a curl of the feed shows.
fn map_rows(rows: &[Map<String, Value>]) -> Result<Vec<StateRecord>, IngestError> {
    rows.iter()
        .enumerate()
        .map(|(i, row)| {
            record_from_row(row)
                .map_err(|e| IngestError::SourceParseFailed(format!("row {}: {}", i + 1, e)))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const CSV_FEED: &str = "\
rownames,Population,Income,Illiteracy,Life Exp,Murder,HS Grad,Frost,Area
Alabama,3615,3624,2.1,69.05,15.1,41.3,20,50708
Alaska,365,6315,1.5,69.31,11.3,66.7,152,566432
";

    #[test]
    fn csv_feed_maps_to_records() {
        let rows = parse_rows(CSV_FEED, SourceFormat::Csv).unwrap();
        let records = map_rows(&rows).unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].name, "Alabama");
        assert_eq!(records[0].population, 3615);
        assert_eq!(records[1].name, "Alaska");
        assert_eq!(records[1].life_exp, 69.31);
    }

    #[test]
    fn json_feed_maps_to_records() {
        let payload = r#"[
            {"state": "Alabama", "population": 3615, "income": 3624,
             "illiteracy": 2.1, "life_exp": 69.05, "murder": 15.1,
             "hs_grad": 41.3, "frost": 20, "area": 50708}
        ]"#;

        let rows = parse_rows(payload, SourceFormat::Json).unwrap();
        let records = map_rows(&rows).unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].name, "Alabama");
        assert_eq!(records[0].frost, 20);
    }

    #[test]
    fn empty_feed_is_refused() {
        let header_only = "rownames,Population,Income,Illiteracy,Life Exp,Murder,HS Grad,Frost,Area\n";
        let err = parse_rows(header_only, SourceFormat::Csv).unwrap_err();
        assert!(matches!(err, IngestError::SourceParseFailed(_)));

        let err = parse_rows("[]", SourceFormat::Json).unwrap_err();
        assert!(matches!(err, IngestError::SourceParseFailed(_)));
    }

    #[test]
    fn json_must_be_an_array_of_objects() {
        assert!(parse_rows(r#"{"state": "Alabama"}"#, SourceFormat::Json).is_err());
        assert!(parse_rows("[1, 2, 3]", SourceFormat::Json).is_err());
        assert!(parse_rows("not json at all", SourceFormat::Json).is_err());
    }

    #[test]
    fn bad_row_fails_the_batch_with_its_row_number() {
        let payload = "\
rownames,Population,Income,Illiteracy,Life Exp,Murder,HS Grad,Frost,Area
Alabama,3615,3624,2.1,69.05,15.1,41.3,20,50708
Alaska,lots,6315,1.5,69.31,11.3,66.7,152,566432
";
        let rows = parse_rows(payload, SourceFormat::Csv).unwrap();
        let err = map_rows(&rows).unwrap_err();

        let msg = err.to_string();
        assert!(msg.contains("row 2"), "unexpected message: {}", msg);
        assert!(msg.contains("population"), "unexpected message: {}", msg);
    }

    #[test]
    fn ragged_csv_is_a_parse_error() {
        let payload = "\
rownames,Population,Income,Illiteracy,Life Exp,Murder,HS Grad,Frost,Area
Alabama,3615,3624
";
        let err = parse_rows(payload, SourceFormat::Csv).unwrap_err();
        assert!(matches!(err, IngestError::SourceParseFailed(_)));
    }

    #[test]
    fn format_is_inferred_from_the_url() {
        assert_eq!(SourceFormat::infer(DEFAULT_SOURCE_URL), SourceFormat::Csv);
        assert_eq!(
            SourceFormat::infer("https://example.test/data/states.json"),
            SourceFormat::Json
        );
        assert_eq!(
            SourceFormat::infer("https://example.test/states.JSON?raw=1"),
            SourceFormat::Json
        );
        assert_eq!(
            SourceFormat::infer("https://example.test/feed"),
            SourceFormat::Csv
        );
    }

    #[test]
    fn explicit_format_names_parse_case_insensitively() {
        assert_eq!(SourceFormat::parse("csv"), Some(SourceFormat::Csv));
        assert_eq!(SourceFormat::parse(" JSON "), Some(SourceFormat::Json));
        assert_eq!(SourceFormat::parse("xml"), None);
    }

    /// Sets an env var for the test body and restores the prior value on
    /// drop.
    struct EnvVarGuard {
        key: &'static str,
        previous: Option<String>,
    }

    impl EnvVarGuard {
        fn set(key: &'static str, value: &str) -> Self {
            let previous = std::env::var(key).ok();
            std::env::set_var(key, value);
            Self { key, previous }
        }
    }

    impl Drop for EnvVarGuard {
        fn drop(&mut self) {
            match &self.previous {
                Some(value) => std::env::set_var(self.key, value),
                None => std::env::remove_var(self.key),
            }
        }
    }

    #[test]
    fn source_config_reads_url_and_format_from_env() {
        let _url = EnvVarGuard::set("STATELINE_SOURCE_URL", "https://example.test/feed");
        let _format = EnvVarGuard::set("STATELINE_SOURCE_FORMAT", "json");

        let config = SourceConfig::from_env();
        assert_eq!(config.url, "https://example.test/feed");
        assert_eq!(config.format, SourceFormat::Json);
    }
}
