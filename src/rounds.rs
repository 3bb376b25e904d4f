use std::collections::BTreeMap;

use chrono::{NaiveDate, NaiveDateTime};
use tracing::debug;

use crate::error::{DataError, DataResult};
use crate::records::FixtureRecord;

/// Latest known kickoff per round. Rounds whose dates are all missing map to `None`.
pub fn round_latest_dates(fixtures: &[FixtureRecord]) -> BTreeMap<i64, Option<NaiveDateTime>> {
    let mut out: BTreeMap<i64, Option<NaiveDateTime>> = BTreeMap::new();
    for f in fixtures {
        let Some(round) = f.round_number else {
            continue;
        };
        let slot = out.entry(round).or_insert(None);
        if let Some(date) = f.date {
            *slot = Some(slot.map_or(date, |cur| cur.max(date)));
        }
    }
    out
}

/// Smallest round whose latest fixture is on or after `today`; otherwise the highest round.
pub fn select_current_round(fixtures: &[FixtureRecord], today: NaiveDate) -> DataResult<i64> {
    let rounds = round_latest_dates(fixtures);

    let upcoming = rounds
        .iter()
        .find(|(_, latest)| latest.is_some_and(|dt| dt.date() >= today))
        .map(|(round, _)| *round);
    if let Some(round) = upcoming {
        debug!(round, %today, "current round selected");
        return Ok(round);
    }

    let last = rounds.keys().next_back().copied();
    match last {
        Some(round) => {
            debug!(round, %today, "no upcoming round, falling back to last round");
            Ok(round)
        }
        None => Err(DataError::NoCurrentRound),
    }
}

pub fn current_round_fixtures(
    fixtures: &[FixtureRecord],
    today: NaiveDate,
) -> DataResult<(i64, Vec<&FixtureRecord>)> {
    let round = select_current_round(fixtures, today)?;
    let selected = fixtures
        .iter()
        .filter(|f| f.round_number == Some(round))
        .collect();
    Ok((round, selected))
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::records::parse_datetime;

    fn fixture(round: Option<i64>, date: &str) -> FixtureRecord {
        FixtureRecord {
            home_team: "H".to_string(),
            away_team: "A".to_string(),
            round_number: round,
            date: parse_datetime(date),
        }
    }

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    #[test]
    fn picks_first_round_not_yet_finished() {
        let fixtures = vec![
            fixture(Some(1), "2024-01-01"),
            fixture(Some(2), "2024-01-08"),
            fixture(Some(3), "2024-01-15"),
        ];
        assert_eq!(select_current_round(&fixtures, day(2024, 1, 10)).ok(), Some(3));
    }

    #[test]
    fn round_ending_today_is_current() {
        let fixtures = vec![
            fixture(Some(1), "2024-01-06"),
            fixture(Some(1), "2024-01-10 20:00:00"),
            fixture(Some(2), "2024-01-17"),
        ];
        assert_eq!(select_current_round(&fixtures, day(2024, 1, 10)).ok(), Some(1));
    }

    #[test]
    fn uses_max_date_within_round() {
        let fixtures = vec![
            fixture(Some(4), "2024-01-02"),
            fixture(Some(4), "2024-01-12"),
            fixture(Some(5), "2024-01-20"),
        ];
        assert_eq!(select_current_round(&fixtures, day(2024, 1, 10)).ok(), Some(4));
    }

    #[test]
    fn all_past_falls_back_to_max_round() {
        let fixtures = vec![
            fixture(Some(7), "2023-05-01"),
            fixture(Some(2), "2023-03-01"),
            fixture(Some(9), "2023-06-01"),
        ];
        assert_eq!(select_current_round(&fixtures, day(2024, 1, 10)).ok(), Some(9));
    }

    #[test]
    fn missing_dates_fall_back_to_max_round() {
        let fixtures = vec![fixture(Some(1), "tbc"), fixture(Some(2), "")];
        assert_eq!(select_current_round(&fixtures, day(2024, 1, 10)).ok(), Some(2));
    }

    #[test]
    fn empty_table_has_no_current_round() {
        let err = select_current_round(&[], day(2024, 1, 10)).expect_err("no rounds");
        assert!(matches!(err, DataError::NoCurrentRound));

        let unroundable = vec![fixture(None, "2024-01-12")];
        assert!(matches!(
            select_current_round(&unroundable, day(2024, 1, 10)),
            Err(DataError::NoCurrentRound)
        ));
    }

    #[test]
    fn current_round_fixtures_keeps_source_order() {
        let mut a = fixture(Some(3), "2024-01-15");
        a.home_team = "First".to_string();
        let mut b = fixture(Some(3), "2024-01-14");
        b.home_team = "Second".to_string();
        let fixtures = vec![a, fixture(Some(2), "2024-01-08"), b];
        let (round, selected) =
            current_round_fixtures(&fixtures, day(2024, 1, 10)).expect("round");
        assert_eq!(round, 3);
        let names: Vec<&str> = selected.iter().map(|f| f.home_team.as_str()).collect();
        assert_eq!(names, ["First", "Second"]);
    }
}
