use std::time::Duration;

use crate::trends::{TrendConfig, TrendProfile};

pub const DEFAULT_HISTORICAL_URL: &str = "https://docs.google.com/spreadsheets/d/1oZJlXF6tpLLaEDNfduHzYFvLKDw7rnyzZY17CQNl1so/gviz/tq?tqx=out:csv&gid=0";
pub const DEFAULT_FIXTURES_URL: &str = "https://docs.google.com/spreadsheets/d/1oZJlXF6tpLLaEDNfduHzYFvLKDw7rnyzZY17CQNl1so/gviz/tq?tqx=out:csv&gid=1005360909";

const DEFAULT_REFRESH_SECS: u64 = 300;
const MIN_REFRESH_SECS: u64 = 30;

/// Where the two sheets live. A location is either an http(s) URL or a local path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceConfig {
    pub historical: String,
    pub fixtures: String,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            historical: DEFAULT_HISTORICAL_URL.to_string(),
            fixtures: DEFAULT_FIXTURES_URL.to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub sources: SourceConfig,
    pub profile: TrendProfile,
    pub refresh: Duration,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            sources: SourceConfig::default(),
            profile: TrendProfile::Classic,
            refresh: Duration::from_secs(DEFAULT_REFRESH_SECS),
        }
    }
}

impl AppConfig {
    /// Reads `BOLASTATS_*` variables. Call after `.env` files are loaded.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut cfg = Self::default();
        if let Some(loc) = lookup("BOLASTATS_HISTORICAL_URL").and_then(|v| non_empty(&v)) {
            cfg.sources.historical = loc;
        }
        if let Some(loc) = lookup("BOLASTATS_FIXTURES_URL").and_then(|v| non_empty(&v)) {
            cfg.sources.fixtures = loc;
        }
        if let Some(profile) = lookup("BOLASTATS_TREND_PROFILE")
            .as_deref()
            .and_then(TrendProfile::parse)
        {
            cfg.profile = profile;
        }
        let refresh = lookup("BOLASTATS_REFRESH_SECS")
            .and_then(|val| val.trim().parse::<u64>().ok())
            .unwrap_or(DEFAULT_REFRESH_SECS)
            .max(MIN_REFRESH_SECS);
        cfg.refresh = Duration::from_secs(refresh);
        cfg
    }

    pub fn trend_config(&self) -> TrendConfig {
        self.profile.config()
    }
}

fn non_empty(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
