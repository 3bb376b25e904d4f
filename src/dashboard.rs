use std::fmt::Write as _;

use chrono::{NaiveDate, NaiveDateTime};
use tracing::{debug, warn};

use crate::config::AppConfig;
use crate::error::{DataError, DataResult};
use crate::rounds::current_round_fixtures;
use crate::source::{SheetData, load_sheets};
use crate::trends::{TrendConfig, derive_trends};

pub const NO_TRENDS_MESSAGE: &str = "No strong trends to recommend for this game.";
pub const UNAVAILABLE_MESSAGE: &str =
    "Unable to fetch data from the configured sheets. Data unavailable.";
pub const NO_ROUND_MESSAGE: &str = "No fixtures with a round number to show.";

#[derive(Debug, Clone, PartialEq)]
pub struct FixtureTrends {
    pub home: String,
    pub away: String,
    pub date: Option<NaiveDateTime>,
    pub trends: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Gameweek {
    pub round: i64,
    pub fixtures: Vec<FixtureTrends>,
}

/// What one render shows.
#[derive(Debug, Clone, PartialEq)]
pub enum Dashboard {
    Ready(Gameweek),
    NoCurrentRound,
    Unavailable(String),
}

impl Dashboard {
    pub fn load(config: &AppConfig, today: NaiveDate) -> Self {
        let fresh_for = config.refresh;
        match load_sheets(&config.sources, fresh_for) {
            Ok(sheets) => Self::from_sheets(&sheets, today, &config.trend_config()),
            Err(err) => {
                warn!("sheets unavailable: {err}");
                Dashboard::Unavailable(err.to_string())
            }
        }
    }

    pub fn from_sheets(sheets: &SheetData, today: NaiveDate, trend_config: &TrendConfig) -> Self {
        match build_gameweek(sheets, today, trend_config) {
            Ok(week) => Dashboard::Ready(week),
            Err(DataError::NoCurrentRound) => {
                warn!("fixture table has no current round");
                Dashboard::NoCurrentRound
            }
            Err(err) => Dashboard::Unavailable(err.to_string()),
        }
    }

    pub fn gameweek(&self) -> Option<&Gameweek> {
        match self {
            Dashboard::Ready(week) => Some(week),
            _ => None,
        }
    }
}

pub fn build_gameweek(
    sheets: &SheetData,
    today: NaiveDate,
    trend_config: &TrendConfig,
) -> DataResult<Gameweek> {
    let (round, selected) = current_round_fixtures(&sheets.fixtures, today)?;
    let fixtures = selected
        .into_iter()
        .map(|f| {
            let trends = derive_trends(&f.home_team, &f.away_team, &sheets.corpus, trend_config);
            debug!(home = %f.home_team, away = %f.away_team, trends = trends.len(), "fixture trends");
            FixtureTrends {
                home: f.home_team.clone(),
                away: f.away_team.clone(),
                date: f.date,
                trends,
            }
        })
        .collect();
    Ok(Gameweek { round, fixtures })
}

pub fn format_kickoff(date: Option<NaiveDateTime>) -> String {
    match date {
        Some(dt) if dt.time() == chrono::NaiveTime::MIN => dt.format("%a %d %b").to_string(),
        Some(dt) => dt.format("%a %d %b %H:%M").to_string(),
        None => "TBC".to_string(),
    }
}

/// Plain-text report, one block per fixture.
pub fn render_text(dashboard: &Dashboard) -> String {
    let mut out = String::new();
    match dashboard {
        Dashboard::Unavailable(reason) => {
            let _ = writeln!(out, "{UNAVAILABLE_MESSAGE}");
            let _ = writeln!(out, "  ({reason})");
        }
        Dashboard::NoCurrentRound => {
            let _ = writeln!(out, "{NO_ROUND_MESSAGE}");
        }
        Dashboard::Ready(week) => {
            let _ = writeln!(out, "Gameweek {} Predictions", week.round);
            for f in &week.fixtures {
                let _ = writeln!(out);
                let _ = writeln!(
                    out,
                    "{} vs {}  [{}]",
                    f.home,
                    f.away,
                    format_kickoff(f.date)
                );
                if f.trends.is_empty() {
                    let _ = writeln!(out, "  {NO_TRENDS_MESSAGE}");
                }
                for t in &f.trends {
                    let _ = writeln!(out, "  - {t}");
                }
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::parse_datetime;

    #[test]
    fn kickoff_formatting() {
        assert_eq!(format_kickoff(None), "TBC");
        assert_eq!(format_kickoff(parse_datetime("2024-01-13")), "Sat 13 Jan");
        assert_eq!(
            format_kickoff(parse_datetime("2024-01-13 15:00:00")),
            "Sat 13 Jan 15:00"
        );
    }

    #[test]
    fn text_for_unavailable_and_empty_fixture() {
        let text = render_text(&Dashboard::Unavailable("boom".to_string()));
        assert!(text.starts_with(UNAVAILABLE_MESSAGE));
        assert!(text.contains("boom"));

        let week = Dashboard::Ready(Gameweek {
            round: 4,
            fixtures: vec![FixtureTrends {
                home: "Red FC".to_string(),
                away: "Blue FC".to_string(),
                date: None,
                trends: Vec::new(),
            }],
        });
        let text = render_text(&week);
        assert!(text.contains("Gameweek 4 Predictions"));
        assert!(text.contains("Red FC vs Blue FC"));
        assert!(text.contains(NO_TRENDS_MESSAGE));
    }
}
