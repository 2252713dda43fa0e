//! The round store: normalises raw score rows into [RoundRecord]s, applies the
//! trailing analysis window and partitions each player's rounds into ALL, HOME
//! and AWAY views.

use std::path::Path;

use chrono::{Duration, NaiveDate};
use rustc_hash::FxHashMap;
use thiserror::Error;
use tracing::warn;

use crate::csv::CsvReader;

/// A single normalised round. Immutable once ingested.
#[derive(Debug, Clone, PartialEq)]
pub struct RoundRecord {
    pub player_id: String,
    pub player_name: String,
    pub date_played: NaiveDate,
    pub course_name: String,
    pub is_home: bool,
    pub differential: f64,
    pub open_handicap_index: f64,
    pub course_handicap: i32,
}

impl RoundRecord {
    /// The over/under-handicap performance signal for the round; lower is better.
    pub fn gap(&self) -> f64 {
        self.differential - self.open_handicap_index
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RowParseError {
    #[error("row has {got} cells, expected at least {want}")]
    TruncatedRow { want: usize, got: usize },

    #[error("unparseable date {0:?}")]
    BadDate(String),

    #[error("unparseable {column} value {value:?}")]
    BadNumber { column: &'static str, value: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
pub enum Subset {
    #[strum(serialize = "ALL")]
    All,
    #[strum(serialize = "HOME")]
    Home,
    #[strum(serialize = "AWAY")]
    Away,
}

/// A player's rounds inside the analysis window, sorted by date played.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerWindow {
    pub player_id: String,
    pub player_name: String,
    rounds: Vec<RoundRecord>,
}

impl PlayerWindow {
    pub fn rounds(&self, subset: Subset) -> impl Iterator<Item = &RoundRecord> {
        self.rounds.iter().filter(move |round| match subset {
            Subset::All => true,
            Subset::Home => round.is_home,
            Subset::Away => !round.is_home,
        })
    }

    pub fn count(&self, subset: Subset) -> usize {
        self.rounds(subset).count()
    }

    pub fn gaps(&self, subset: Subset) -> Vec<f64> {
        self.rounds(subset).map(RoundRecord::gap).collect()
    }

    pub fn open_handicap_indices(&self) -> Vec<f64> {
        self.rounds.iter().map(|round| round.open_handicap_index).collect()
    }
}

/// Outcome of a CSV ingest: the parsed store plus the count of rows dropped for
/// data-quality reasons.
#[derive(Debug)]
pub struct RoundIngest {
    pub store: RoundStore,
    pub dropped: usize,
}

#[derive(Debug, Clone, Default)]
pub struct RoundStore {
    rounds: Vec<RoundRecord>,
}

impl RoundStore {
    pub fn from_records(rounds: Vec<RoundRecord>) -> Self {
        Self { rounds }
    }

    /// Reads a scores CSV in the handicap-site export layout. Rows that fail to
    /// parse are dropped and counted, never fatal to the batch.
    pub fn from_csv(path: impl AsRef<Path>, home_course: &str) -> Result<RoundIngest, anyhow::Error> {
        let reader = CsvReader::open(path)?;
        let columns = Columns::resolve(&reader)?;
        let mut rounds = vec![];
        let mut dropped = 0;
        for row in reader {
            let row = row?;
            match columns.parse_row(&row, home_course) {
                Ok(round) => rounds.push(round),
                Err(err) => {
                    warn!("dropping row: {err}");
                    dropped += 1;
                }
            }
        }
        Ok(RoundIngest {
            store: Self { rounds },
            dropped,
        })
    }

    pub fn len(&self) -> usize {
        self.rounds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rounds.is_empty()
    }

    /// One window per player with at least one round inside
    /// [`now` − `window_weeks`, `now`], ordered by player name then id for
    /// reproducible output.
    pub fn windows(&self, now: NaiveDate, window_weeks: u32) -> Vec<PlayerWindow> {
        let start = now - Duration::weeks(window_weeks as i64);
        let mut by_player: FxHashMap<&str, PlayerWindow> = FxHashMap::default();
        for round in &self.rounds {
            if round.date_played < start || round.date_played > now {
                continue;
            }
            by_player
                .entry(&round.player_id)
                .or_insert_with(|| PlayerWindow {
                    player_id: round.player_id.clone(),
                    player_name: round.player_name.clone(),
                    rounds: vec![],
                })
                .rounds
                .push(round.clone());
        }
        let mut windows: Vec<_> = by_player.into_values().collect();
        for window in &mut windows {
            window
                .rounds
                .sort_by(|a, b| a.date_played.cmp(&b.date_played).then_with(|| a.course_name.cmp(&b.course_name)));
        }
        windows.sort_by(|a, b| {
            a.player_name
                .cmp(&b.player_name)
                .then_with(|| a.player_id.cmp(&b.player_id))
        });
        windows
    }

    /// Latest course handicap per player at the home course, taken across the
    /// entire history rather than the window: CH moves slowly and the most recent
    /// home round is the best available reading.
    pub fn home_course_handicaps(&self) -> FxHashMap<String, i32> {
        let mut latest: FxHashMap<String, (NaiveDate, i32)> = FxHashMap::default();
        for round in &self.rounds {
            if !round.is_home {
                continue;
            }
            match latest.get(&round.player_id) {
                Some((date, _)) if *date > round.date_played => {}
                _ => {
                    latest.insert(
                        round.player_id.clone(),
                        (round.date_played, round.course_handicap),
                    );
                }
            }
        }
        latest.into_iter().map(|(id, (_, ch))| (id, ch)).collect()
    }
}

/// Resolved ordinals of the columns the engine consumes. The export carries more
/// columns (tee, CR, slope, gross); those are ignored.
struct Columns {
    player_id: usize,
    player_name: usize,
    date_played: usize,
    club_played: usize,
    open_hi: usize,
    course_handicap: usize,
    differential: usize,
    width: usize,
}

impl Columns {
    fn resolve(reader: &CsvReader) -> Result<Self, anyhow::Error> {
        let require = |column: &str| {
            reader
                .ordinal(column)
                .ok_or_else(|| anyhow::anyhow!("scores file is missing column {column:?}"))
        };
        let columns = Self {
            player_id: require("SA Player ID")?,
            player_name: require("Player Name")?,
            date_played: require("Date Played")?,
            club_played: require("Club Played")?,
            open_hi: require("OPEN HI")?,
            course_handicap: require("CH")?,
            differential: require("DIFF")?,
            width: reader.header().len(),
        };
        Ok(columns)
    }

    fn parse_row(&self, row: &[String], home_course: &str) -> Result<RoundRecord, RowParseError> {
        if row.len() < self.width {
            return Err(RowParseError::TruncatedRow {
                want: self.width,
                got: row.len(),
            });
        }
        let course_name = row[self.club_played].clone();
        Ok(RoundRecord {
            player_id: row[self.player_id].clone(),
            player_name: row[self.player_name].clone(),
            date_played: parse_round_date(&row[self.date_played])?,
            is_home: course_name == home_course,
            course_name,
            differential: clean_differential(&row[self.differential])?,
            open_handicap_index: clean_open_hi(&row[self.open_hi])?,
            course_handicap: row[self.course_handicap].parse().map_err(|_| {
                RowParseError::BadNumber {
                    column: "CH",
                    value: row[self.course_handicap].clone(),
                }
            })?,
        })
    }
}

/// Dates arrive as `21-05-2024 pm`; the meridiem token carries no information.
fn parse_round_date(raw: &str) -> Result<NaiveDate, RowParseError> {
    let token = raw
        .split_whitespace()
        .next()
        .ok_or_else(|| RowParseError::BadDate(raw.to_string()))?;
    NaiveDate::parse_from_str(token, "%d-%m-%Y").map_err(|_| RowParseError::BadDate(raw.to_string()))
}

/// Differentials may carry `c` (capped) or `e` (exceptional) markers.
fn clean_differential(raw: &str) -> Result<f64, RowParseError> {
    let cleaned: String = raw.chars().filter(|ch| !matches!(ch, 'c' | 'e')).collect();
    cleaned
        .trim()
        .parse()
        .map_err(|_| RowParseError::BadNumber {
            column: "DIFF",
            value: raw.to_string(),
        })
}

/// The handicap index may carry a trailing `S` soft-cap marker.
fn clean_open_hi(raw: &str) -> Result<f64, RowParseError> {
    raw.trim_end_matches('S')
        .trim()
        .parse()
        .map_err(|_| RowParseError::BadNumber {
            column: "OPEN HI",
            value: raw.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::round_on;

    #[test]
    fn clean_differential_strips_markers() {
        assert_eq!(Ok(10.2), clean_differential("10.2c"));
        assert_eq!(Ok(-1.5), clean_differential("-1.5e"));
        assert_eq!(Ok(3.0), clean_differential(" 3.0 "));
        assert!(clean_differential("n/a").is_err());
    }

    #[test]
    fn clean_open_hi_strips_soft_cap() {
        assert_eq!(Ok(12.4), clean_open_hi("12.4S"));
        assert_eq!(Ok(8.0), clean_open_hi("8.0"));
        assert!(clean_open_hi("S").is_err());
    }

    #[test]
    fn parses_date_with_meridiem_token() {
        assert_eq!(
            Ok(NaiveDate::from_ymd_opt(2024, 5, 21).unwrap()),
            parse_round_date("21-05-2024 pm")
        );
        assert!(parse_round_date("2024/05/21").is_err());
    }

    #[test]
    fn window_filters_and_partitions() {
        let now = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        let store = RoundStore::from_records(vec![
            round_on("p1", "2024-05-20", true, 10.0, 9.0),
            round_on("p1", "2024-05-25", false, 12.0, 9.0),
            round_on("p1", "2023-01-01", true, 8.0, 9.0), // outside the window
        ]);
        let windows = store.windows(now, 12);
        assert_eq!(1, windows.len());
        let window = &windows[0];
        assert_eq!(2, window.count(Subset::All));
        assert_eq!(1, window.count(Subset::Home));
        assert_eq!(1, window.count(Subset::Away));
        assert_eq!(vec![1.0], window.gaps(Subset::Home));
        assert_eq!(vec![3.0], window.gaps(Subset::Away));
    }

    #[test]
    fn window_boundaries_are_inclusive() {
        let now = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        let start = now - Duration::weeks(12);
        let store = RoundStore::from_records(vec![
            round_on("p1", &start.to_string(), true, 10.0, 9.0),
            round_on("p1", &now.to_string(), true, 10.0, 9.0),
        ]);
        assert_eq!(2, store.windows(now, 12)[0].count(Subset::All));
    }

    #[test]
    fn windows_ordered_by_player_name() {
        let now = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        let mut zed = round_on("z1", "2024-05-20", true, 10.0, 9.0);
        zed.player_name = "Zed".into();
        let mut abe = round_on("a1", "2024-05-20", true, 10.0, 9.0);
        abe.player_name = "Abe".into();
        let store = RoundStore::from_records(vec![zed, abe]);
        let names: Vec<_> = store
            .windows(now, 12)
            .into_iter()
            .map(|window| window.player_name)
            .collect();
        assert_eq!(vec!["Abe".to_string(), "Zed".to_string()], names);
    }

    #[test]
    fn latest_home_course_handicap_wins() {
        let mut early = round_on("p1", "2024-04-01", true, 10.0, 9.0);
        early.course_handicap = 11;
        let mut late = round_on("p1", "2024-05-01", true, 10.0, 9.0);
        late.course_handicap = 12;
        let away = round_on("p1", "2024-05-20", false, 10.0, 9.0);
        let store = RoundStore::from_records(vec![late.clone(), early, away]);
        let handicaps = store.home_course_handicaps();
        assert_eq!(Some(&12), handicaps.get("p1"));
    }
}
