use std::cmp::Ordering;

use tracing::debug;

use crate::records::{MatchCorpus, MatchRecord, StatColumn};

/// Which rule set to derive trends with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TrendProfile {
    /// Last 5 meetings, "over" signals only.
    #[default]
    Classic,
    /// Last 8 meetings, adds "under" signals, half-time leads and corner/booking dominance.
    Extended,
}

impl TrendProfile {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "classic" | "5" => Some(TrendProfile::Classic),
            "extended" | "8" => Some(TrendProfile::Extended),
            _ => None,
        }
    }

    pub fn config(self) -> TrendConfig {
        match self {
            TrendProfile::Classic => TrendConfig::classic(),
            TrendProfile::Extended => TrendConfig::extended(),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            TrendProfile::Classic => "classic",
            TrendProfile::Extended => "extended",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrendConfig {
    pub sample_size: usize,
    pub min_meetings: usize,
    pub over_threshold: f64,
    pub under_threshold: Option<f64>,
    pub dominance: bool,
    pub first_half_result: bool,
    pub max_trends: usize,
}

impl TrendConfig {
    pub fn classic() -> Self {
        Self {
            sample_size: 5,
            min_meetings: 5,
            over_threshold: 0.8,
            under_threshold: None,
            dominance: false,
            first_half_result: false,
            max_trends: 3,
        }
    }

    pub fn extended() -> Self {
        Self {
            sample_size: 8,
            under_threshold: Some(0.2),
            dominance: true,
            first_half_result: true,
            ..Self::classic()
        }
    }
}

impl Default for TrendConfig {
    fn default() -> Self {
        Self::classic()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TrendSignal {
    /// Ranking weight in [0, 1]; never rendered.
    pub score: f64,
    pub label: String,
}

struct Market {
    label: &'static str,
    under_label: &'static str,
    requires: &'static [StatColumn],
    extended_only: bool,
    /// `None` when the row has no readable value for this market.
    value: fn(&MatchRecord) -> Option<bool>,
}

// Evaluation order matters: equal scores keep this order after ranking.
const MARKETS: &[Market] = &[
    Market {
        label: "Both teams scored",
        under_label: "A team failed to score",
        requires: &[StatColumn::BothTeamsScore],
        extended_only: false,
        value: |m| m.both_teams_score,
    },
    Market {
        label: "Over 2.5 goals",
        under_label: "Under 2.5 goals",
        requires: &[StatColumn::Over25],
        extended_only: false,
        value: |m| m.over_2_5,
    },
    Market {
        label: "Over 9.5 corners",
        under_label: "Under 9.5 corners",
        requires: &[StatColumn::TotalCorners],
        extended_only: false,
        value: |m| m.total_corners.map(|c| c > 9.5),
    },
    Market {
        label: "Over 3.5 bookings",
        under_label: "Under 3.5 bookings",
        requires: &[StatColumn::HomeYellowCards, StatColumn::AwayYellowCards],
        extended_only: false,
        value: |m| sum(m.home_yellow_cards, m.away_yellow_cards).map(|c| c > 3.5),
    },
    Market {
        label: "First-half goals",
        under_label: "No first-half goals",
        requires: &[StatColumn::FirstHalfHome, StatColumn::FirstHalfAway],
        extended_only: false,
        value: |m| sum(m.first_half_home, m.first_half_away).map(|g| g > 0.0),
    },
    Market {
        label: "Home side led at half-time",
        under_label: "Home side did not lead at half-time",
        requires: &[StatColumn::FirstHalfHome, StatColumn::FirstHalfAway],
        extended_only: true,
        value: |m| Some(m.first_half_home? > m.first_half_away?),
    },
];

type SidePair = fn(&MatchRecord) -> (Option<f64>, Option<f64>);

fn sum(a: Option<f64>, b: Option<f64>) -> Option<f64> {
    Some(a? + b?)
}

/// Head-to-head meetings between two teams, most recent first. Undated matches go last.
pub fn head_to_head<'a>(home: &str, away: &str, corpus: &'a MatchCorpus) -> Vec<&'a MatchRecord> {
    let mut meetings: Vec<&MatchRecord> = corpus
        .matches
        .iter()
        .filter(|m| m.involves_pair(home, away))
        .collect();
    meetings.sort_by(|a, b| b.match_date.cmp(&a.match_date));
    meetings
}

/// Every qualifying signal for the fixture, ranked, before truncation.
pub fn derive_signals(
    home: &str,
    away: &str,
    corpus: &MatchCorpus,
    config: &TrendConfig,
) -> Vec<TrendSignal> {
    let meetings = head_to_head(home, away, corpus);
    if meetings.len() < config.min_meetings {
        debug!(
            home,
            away,
            meetings = meetings.len(),
            "not enough head-to-head meetings"
        );
        return Vec::new();
    }

    let sample = &meetings[..meetings.len().min(config.sample_size)];
    let total = sample.len();
    let mut signals = Vec::new();

    let wins = sample.iter().filter(|m| team_won(home, m)).count();
    let win_ratio = ratio(wins, total);
    if win_ratio >= config.over_threshold {
        signals.push(TrendSignal {
            score: win_ratio,
            label: format!("{home} won {wins}/{total} recent meetings"),
        });
    }

    for market in MARKETS {
        if market.extended_only && !config.first_half_result {
            continue;
        }
        if !corpus.has_all(market.requires) {
            continue;
        }
        let hits = sample
            .iter()
            .filter(|m| (market.value)(m) == Some(true))
            .count();
        let misses = sample
            .iter()
            .filter(|m| (market.value)(m) == Some(false))
            .count();
        let hit_ratio = ratio(hits, total);
        let miss_ratio = ratio(misses, total);
        if hit_ratio >= config.over_threshold {
            signals.push(TrendSignal {
                score: hit_ratio,
                label: format!("{} in {hits}/{total} games", market.label),
            });
        } else if let Some(under) = config.under_threshold
            && hit_ratio <= under
            && miss_ratio >= config.over_threshold
        {
            // Unreadable cells are neither hits nor misses.
            signals.push(TrendSignal {
                score: miss_ratio,
                label: format!("{} in {misses}/{total} games", market.under_label),
            });
        }
    }

    if config.dominance {
        let stats: [(&str, [StatColumn; 2], SidePair); 2] = [
            (
                "corners",
                [StatColumn::HomeCorners, StatColumn::AwayCorners],
                side_corners,
            ),
            (
                "bookings",
                [StatColumn::HomeYellowCards, StatColumn::AwayYellowCards],
                side_bookings,
            ),
        ];
        for (name, requires, sides) in stats {
            if !corpus.has_all(&requires) {
                continue;
            }
            let ahead = sample
                .iter()
                .filter(|m| team_had_more(home, m, sides))
                .count();
            let ahead_ratio = ratio(ahead, total);
            if ahead_ratio >= config.over_threshold {
                signals.push(TrendSignal {
                    score: ahead_ratio,
                    label: format!("{home} had more {name} in {ahead}/{total} games"),
                });
            }
        }
    }

    rank_signals(&mut signals);
    signals
}

/// Top trend sentences for a fixture, most important first.
pub fn derive_trends(
    home: &str,
    away: &str,
    corpus: &MatchCorpus,
    config: &TrendConfig,
) -> Vec<String> {
    derive_signals(home, away, corpus, config)
        .into_iter()
        .take(config.max_trends)
        .map(|s| s.label)
        .collect()
}

/// Stable sort by score, highest first.
pub fn rank_signals(signals: &mut [TrendSignal]) {
    signals.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
}

fn ratio(count: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    count as f64 / total as f64
}

fn team_won(team: &str, m: &MatchRecord) -> bool {
    let (Some(hs), Some(aws)) = (m.home_score, m.away_score) else {
        return false;
    };
    (m.home_team == team && hs > aws) || (m.away_team == team && aws > hs)
}

fn side_corners(m: &MatchRecord) -> (Option<f64>, Option<f64>) {
    (m.home_corners, m.away_corners)
}

fn side_bookings(m: &MatchRecord) -> (Option<f64>, Option<f64>) {
    (m.home_yellow_cards, m.away_yellow_cards)
}

fn team_had_more(team: &str, m: &MatchRecord, sides: SidePair) -> bool {
    let (home_side, away_side) = sides(m);
    let (Some(h), Some(a)) = (home_side, away_side) else {
        return false;
    };
    if m.home_team == team {
        h > a
    } else if m.away_team == team {
        a > h
    } else {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signal(score: f64, label: &str) -> TrendSignal {
        TrendSignal {
            score,
            label: label.to_string(),
        }
    }

    #[test]
    fn ranking_is_stable_for_ties() {
        let mut signals = vec![
            signal(0.8, "a"),
            signal(1.0, "b"),
            signal(0.8, "c"),
            signal(1.0, "d"),
        ];
        rank_signals(&mut signals);
        let labels: Vec<&str> = signals.iter().map(|s| s.label.as_str()).collect();
        assert_eq!(labels, ["b", "d", "a", "c"]);
    }

    #[test]
    fn win_counts_from_either_side() {
        let mut home_win = MatchRecord::new("Red", "Blue");
        home_win.home_score = Some(2);
        home_win.away_score = Some(0);
        let mut away_win = MatchRecord::new("Blue", "Red");
        away_win.home_score = Some(1);
        away_win.away_score = Some(3);
        let mut draw = MatchRecord::new("Blue", "Red");
        draw.home_score = Some(1);
        draw.away_score = Some(1);

        assert!(team_won("Red", &home_win));
        assert!(team_won("Red", &away_win));
        assert!(!team_won("Red", &draw));
        assert!(!team_won("Blue", &home_win));
    }

    #[test]
    fn missing_scores_are_not_wins() {
        let m = MatchRecord::new("Red", "Blue");
        assert!(!team_won("Red", &m));
    }

    #[test]
    fn profiles_parse_and_differ() {
        assert_eq!(TrendProfile::parse(" Extended "), Some(TrendProfile::Extended));
        assert_eq!(TrendProfile::parse("8"), Some(TrendProfile::Extended));
        assert_eq!(TrendProfile::parse("weird"), None);
        assert_eq!(TrendProfile::Classic.config().sample_size, 5);
        let ext = TrendProfile::Extended.config();
        assert_eq!(ext.sample_size, 8);
        assert_eq!(ext.min_meetings, 5);
        assert_eq!(ext.under_threshold, Some(0.2));
    }

    #[test]
    fn profile_labels_parse_back() {
        for profile in [TrendProfile::Classic, TrendProfile::Extended] {
            assert_eq!(TrendProfile::parse(profile.label()), Some(profile));
        }
        assert_eq!(TrendProfile::default(), TrendProfile::Classic);
    }

    #[test]
    fn half_time_result_needs_both_halves() {
        let market = MARKETS
            .iter()
            .find(|m| m.extended_only)
            .expect("half-time market");
        let mut m = MatchRecord::new("Red", "Blue");
        m.first_half_home = Some(1.0);
        assert_eq!((market.value)(&m), None);
        m.first_half_away = Some(1.0);
        assert_eq!((market.value)(&m), Some(false));
    }

    #[test]
    fn dominance_follows_the_team_across_venues() {
        let mut at_home = MatchRecord::new("Red", "Blue");
        at_home.home_corners = Some(7.0);
        at_home.away_corners = Some(3.0);
        let mut away = MatchRecord::new("Blue", "Red");
        away.home_corners = Some(2.0);
        away.away_corners = Some(6.0);
        let mut level = MatchRecord::new("Blue", "Red");
        level.home_corners = Some(4.0);
        level.away_corners = Some(4.0);

        assert!(team_had_more("Red", &at_home, side_corners));
        assert!(team_had_more("Red", &away, side_corners));
        assert!(!team_had_more("Red", &level, side_corners));
    }
}
