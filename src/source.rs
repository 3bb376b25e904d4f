use std::fs;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use tracing::info;

use crate::config::SourceConfig;
use crate::error::{DataError, DataResult};
use crate::http_cache::fetch_text_cached;
use crate::http_client::sheet_client;
use crate::records::{FixtureRecord, MatchCorpus, corpus_from_table, fixtures_from_table};
use crate::table::{RawTable, parse_csv};

/// Both sheets, parsed and typed.
#[derive(Debug, Clone, Default)]
pub struct SheetData {
    pub corpus: MatchCorpus,
    pub fixtures: Vec<FixtureRecord>,
}

pub fn is_remote(location: &str) -> bool {
    let lower = location.trim_start().to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

/// Raw CSV text from a URL (through the http cache) or a local file.
pub fn read_location(location: &str, fresh_for: Duration) -> Result<String> {
    if is_remote(location) {
        let client = sheet_client()?;
        return fetch_text_cached(client, location, fresh_for)
            .with_context(|| format!("fetch {location}"));
    }
    let path = location.strip_prefix("file://").unwrap_or(location);
    fs::read_to_string(Path::new(path)).with_context(|| format!("read {path}"))
}

pub fn load_table(location: &str, fresh_for: Duration) -> Result<RawTable> {
    let raw = read_location(location, fresh_for)?;
    parse_csv(&raw).with_context(|| format!("parse csv from {location}"))
}

/// Fetch and type both sheets. Any failure here leaves the dashboard without data.
pub fn load_sheets(sources: &SourceConfig, fresh_for: Duration) -> DataResult<SheetData> {
    let historical = load_table(&sources.historical, fresh_for)
        .map_err(|err| DataError::unavailable("historical results", format!("{err:#}")))?;
    let fixtures = load_table(&sources.fixtures, fresh_for)
        .map_err(|err| DataError::unavailable("fixtures", format!("{err:#}")))?;

    let sheets = sheets_from_tables(&historical, &fixtures)?;
    info!(
        matches = sheets.corpus.len(),
        fixtures = sheets.fixtures.len(),
        "sheets loaded"
    );
    Ok(sheets)
}

pub fn sheets_from_tables(historical: &RawTable, fixtures: &RawTable) -> DataResult<SheetData> {
    let corpus = corpus_from_table(historical)
        .map_err(|err| DataError::unavailable("historical results", err))?;
    let fixtures =
        fixtures_from_table(fixtures).map_err(|err| DataError::unavailable("fixtures", err))?;
    Ok(SheetData { corpus, fixtures })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remote_detection() {
        assert!(is_remote("https://docs.google.com/x"));
        assert!(is_remote("HTTP://example.org/a.csv"));
        assert!(!is_remote("data/results.csv"));
        assert!(!is_remote("file:///tmp/a.csv"));
    }

    #[test]
    fn missing_local_file_is_unavailable() {
        let sources = SourceConfig {
            historical: "/definitely/not/here/results.csv".to_string(),
            fixtures: "/definitely/not/here/fixtures.csv".to_string(),
        };
        let err = load_sheets(&sources, Duration::ZERO).expect_err("missing file");
        assert!(matches!(
            err,
            DataError::Unavailable {
                what: "historical results",
                ..
            }
        ));
    }

    #[test]
    fn missing_required_column_is_unavailable() {
        let historical = parse_csv("home_team,away_team\nA,B\n").expect("csv");
        let fixtures = parse_csv("home_team,away_team,date\nA,B,2024-01-01\n").expect("csv");
        let err = sheets_from_tables(&historical, &fixtures).expect_err("no round column");
        assert!(err.to_string().contains("round_number"));
    }
}
