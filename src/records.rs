use std::collections::HashSet;

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};
use tracing::debug;

use crate::error::{DataError, DataResult};
use crate::table::{RawTable, TableRow};

const HISTORICAL: &str = "historical";
const FIXTURES: &str = "fixtures";

/// Optional historical columns. Trend signals declare which of these they need.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatColumn {
    HomeScore,
    AwayScore,
    MatchDate,
    TotalCorners,
    HomeCorners,
    AwayCorners,
    HomeYellowCards,
    AwayYellowCards,
    FirstHalfHome,
    FirstHalfAway,
    BothTeamsScore,
    Over25,
}

impl StatColumn {
    pub const ALL: [StatColumn; 12] = [
        StatColumn::HomeScore,
        StatColumn::AwayScore,
        StatColumn::MatchDate,
        StatColumn::TotalCorners,
        StatColumn::HomeCorners,
        StatColumn::AwayCorners,
        StatColumn::HomeYellowCards,
        StatColumn::AwayYellowCards,
        StatColumn::FirstHalfHome,
        StatColumn::FirstHalfAway,
        StatColumn::BothTeamsScore,
        StatColumn::Over25,
    ];

    pub fn name(self) -> &'static str {
        match self {
            StatColumn::HomeScore => "home_score",
            StatColumn::AwayScore => "away_score",
            StatColumn::MatchDate => "match_date",
            StatColumn::TotalCorners => "total_corners",
            StatColumn::HomeCorners => "home_corners",
            StatColumn::AwayCorners => "away_corners",
            StatColumn::HomeYellowCards => "home_yellow_cards",
            StatColumn::AwayYellowCards => "away_yellow_cards",
            StatColumn::FirstHalfHome => "first_half_home",
            StatColumn::FirstHalfAway => "first_half_away",
            StatColumn::BothTeamsScore => "both_teams_score",
            StatColumn::Over25 => "over_2_5",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MatchRecord {
    pub home_team: String,
    pub away_team: String,
    pub home_score: Option<i64>,
    pub away_score: Option<i64>,
    pub match_date: Option<NaiveDateTime>,
    pub total_corners: Option<f64>,
    pub home_corners: Option<f64>,
    pub away_corners: Option<f64>,
    pub home_yellow_cards: Option<f64>,
    pub away_yellow_cards: Option<f64>,
    pub first_half_home: Option<f64>,
    pub first_half_away: Option<f64>,
    pub both_teams_score: Option<bool>,
    pub over_2_5: Option<bool>,
}

impl MatchRecord {
    pub fn new(home_team: impl Into<String>, away_team: impl Into<String>) -> Self {
        Self {
            home_team: home_team.into(),
            away_team: away_team.into(),
            ..Self::default()
        }
    }

    pub fn involves_pair(&self, a: &str, b: &str) -> bool {
        (self.home_team == a && self.away_team == b) || (self.home_team == b && self.away_team == a)
    }
}

/// The historical sheet: every result plus which optional columns the header carried.
#[derive(Debug, Clone, Default)]
pub struct MatchCorpus {
    pub matches: Vec<MatchRecord>,
    pub columns: HashSet<StatColumn>,
}

impl MatchCorpus {
    pub fn new(matches: Vec<MatchRecord>, columns: impl IntoIterator<Item = StatColumn>) -> Self {
        Self {
            matches,
            columns: columns.into_iter().collect(),
        }
    }

    pub fn has(&self, column: StatColumn) -> bool {
        self.columns.contains(&column)
    }

    pub fn has_all(&self, columns: &[StatColumn]) -> bool {
        columns.iter().all(|c| self.has(*c))
    }

    pub fn len(&self) -> usize {
        self.matches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FixtureRecord {
    pub home_team: String,
    pub away_team: String,
    pub round_number: Option<i64>,
    pub date: Option<NaiveDateTime>,
}

pub fn corpus_from_table(table: &RawTable) -> DataResult<MatchCorpus> {
    require(table, HISTORICAL, "home_team")?;
    require(table, HISTORICAL, "away_team")?;

    let columns = StatColumn::ALL
        .into_iter()
        .filter(|c| table.has_column(c.name()))
        .collect::<HashSet<_>>();

    let mut matches = Vec::with_capacity(table.len());
    let mut skipped = 0usize;
    for row in table.rows() {
        match parse_match_row(&row) {
            Some(m) => matches.push(m),
            None => skipped += 1,
        }
    }
    if skipped > 0 {
        debug!(skipped, "historical rows without team names skipped");
    }

    Ok(MatchCorpus { matches, columns })
}

pub fn fixtures_from_table(table: &RawTable) -> DataResult<Vec<FixtureRecord>> {
    for column in ["home_team", "away_team", "round_number", "date"] {
        require(table, FIXTURES, column)?;
    }

    let mut out = Vec::with_capacity(table.len());
    for row in table.rows() {
        let (Some(home_team), Some(away_team)) = (row.get("home_team"), row.get("away_team"))
        else {
            continue;
        };
        out.push(FixtureRecord {
            home_team: home_team.to_string(),
            away_team: away_team.to_string(),
            round_number: row.get("round_number").and_then(parse_int),
            date: row.get("date").and_then(parse_datetime),
        });
    }
    Ok(out)
}

fn require(table: &RawTable, name: &'static str, column: &'static str) -> DataResult<()> {
    if table.has_column(column) {
        Ok(())
    } else {
        Err(DataError::MissingColumn {
            table: name,
            column,
        })
    }
}

fn parse_match_row(row: &TableRow<'_>) -> Option<MatchRecord> {
    let home_team = row.get("home_team")?.to_string();
    let away_team = row.get("away_team")?.to_string();
    let num = |c: StatColumn| row.get(c.name()).and_then(parse_number);
    let flag = |c: StatColumn| row.get(c.name()).and_then(parse_bool);

    Some(MatchRecord {
        home_team,
        away_team,
        home_score: row.get(StatColumn::HomeScore.name()).and_then(parse_int),
        away_score: row.get(StatColumn::AwayScore.name()).and_then(parse_int),
        match_date: row.get(StatColumn::MatchDate.name()).and_then(parse_datetime),
        total_corners: num(StatColumn::TotalCorners),
        home_corners: num(StatColumn::HomeCorners),
        away_corners: num(StatColumn::AwayCorners),
        home_yellow_cards: num(StatColumn::HomeYellowCards),
        away_yellow_cards: num(StatColumn::AwayYellowCards),
        first_half_home: num(StatColumn::FirstHalfHome),
        first_half_away: num(StatColumn::FirstHalfAway),
        both_teams_score: flag(StatColumn::BothTeamsScore),
        over_2_5: flag(StatColumn::Over25),
    })
}

pub fn parse_number(raw: &str) -> Option<f64> {
    let n = raw.trim().parse::<f64>().ok()?;
    n.is_finite().then_some(n)
}

/// Integers, tolerating sheet exports like "3.0".
pub fn parse_int(raw: &str) -> Option<i64> {
    let raw = raw.trim();
    if let Ok(n) = raw.parse::<i64>() {
        return Some(n);
    }
    let f = parse_number(raw)?;
    (f.fract() == 0.0).then_some(f as i64)
}

pub fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "t" | "yes" | "y" | "1" | "1.0" => Some(true),
        "false" | "f" | "no" | "n" | "0" | "0.0" => Some(false),
        _ => None,
    }
}

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%d/%m/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
    "%d/%m/%Y %H:%M",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y", "%d/%m/%Y", "%d-%m-%Y"];

/// Lenient sheet date parsing. Month-first wins for ambiguous slashes, like the
/// sheet export; day-first is the fallback when the month would be out of range.
pub fn parse_datetime(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.naive_local());
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(dt);
        }
    }
    for fmt in DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(raw, fmt) {
            return Some(d.and_time(NaiveTime::MIN));
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::table::parse_csv;

    #[test]
    fn parse_int_accepts_float_exports() {
        assert_eq!(parse_int("3"), Some(3));
        assert_eq!(parse_int(" 3.0 "), Some(3));
        assert_eq!(parse_int("3.5"), None);
        assert_eq!(parse_int("TBD"), None);
    }

    #[test]
    fn parse_bool_variants() {
        assert_eq!(parse_bool("TRUE"), Some(true));
        assert_eq!(parse_bool("yes"), Some(true));
        assert_eq!(parse_bool("0"), Some(false));
        assert_eq!(parse_bool("maybe"), None);
    }

    #[test]
    fn parse_number_rejects_nan() {
        assert_eq!(parse_number("NaN"), None);
        assert_eq!(parse_number("n/a"), None);
        assert_eq!(parse_number("10"), Some(10.0));
    }

    #[test]
    fn parse_datetime_formats() {
        let d = |y, m, day| NaiveDate::from_ymd_opt(y, m, day).unwrap();
        assert_eq!(parse_datetime("2024-01-15").map(|dt| dt.date()), Some(d(2024, 1, 15)));
        assert_eq!(parse_datetime("01/15/2024").map(|dt| dt.date()), Some(d(2024, 1, 15)));
        assert_eq!(parse_datetime("15/01/2024").map(|dt| dt.date()), Some(d(2024, 1, 15)));
        assert_eq!(
            parse_datetime("2024-01-15 19:45:00").map(|dt| dt.date()),
            Some(d(2024, 1, 15))
        );
        assert_eq!(parse_datetime("next week"), None);
        assert_eq!(parse_datetime(""), None);
    }

    #[test]
    fn offset_timestamps_keep_their_wall_clock() {
        let dt = parse_datetime("2024-01-15T23:30:00-05:00").unwrap();
        assert_eq!(dt.date(), NaiveDate::from_ymd_opt(2024, 1, 15).unwrap());
        assert_eq!(dt.format("%H:%M").to_string(), "23:30");
        let utc = parse_datetime("2024-05-19T15:00:00Z").unwrap();
        assert_eq!(utc.format("%d %H:%M").to_string(), "19 15:00");
    }

    #[test]
    fn corpus_tracks_present_columns() {
        let table = parse_csv(
            "Home Team,Away Team,Home Score,Away Score,Total Corners\nA,B,2,1,11\nC,D,x,0,\n",
        )
        .expect("csv");
        let corpus = corpus_from_table(&table).expect("corpus");
        assert_eq!(corpus.len(), 2);
        assert!(corpus.has(StatColumn::TotalCorners));
        assert!(!corpus.has(StatColumn::BothTeamsScore));
        assert_eq!(corpus.matches[1].home_score, None);
        assert_eq!(corpus.matches[1].total_corners, None);
    }

    #[test]
    fn fixtures_require_round_number() {
        let table = parse_csv("home_team,away_team,date\nA,B,2024-01-01\n").expect("csv");
        let err = fixtures_from_table(&table).expect_err("missing round_number");
        assert!(matches!(
            err,
            DataError::MissingColumn {
                column: "round_number",
                ..
            }
        ));
    }

    #[test]
    fn fixtures_keep_unparseable_dates_as_missing() {
        let table =
            parse_csv("Home Team,Away Team,Round Number,Date\nA,B,1,soon\nC,D,2.0,2024-02-01\n")
                .expect("csv");
        let fixtures = fixtures_from_table(&table).expect("fixtures");
        assert_eq!(fixtures.len(), 2);
        assert_eq!(fixtures[0].date, None);
        assert_eq!(fixtures[1].round_number, Some(2));
    }
}
