//! Testing helpers.

use chrono::NaiveDate;

use crate::rounds::RoundRecord;

/// A windowed round fixture: player id doubles as the name, the course follows
/// from `is_home`, and the course handicap defaults to 10.
pub fn round_on(player: &str, iso_date: &str, is_home: bool, diff: f64, open_hi: f64) -> RoundRecord {
    RoundRecord {
        player_id: player.to_string(),
        player_name: player.to_string(),
        date_played: iso_date.parse::<NaiveDate>().unwrap(),
        course_name: if is_home { "HOME CLUB" } else { "AWAY CLUB" }.to_string(),
        is_home,
        differential: diff,
        open_handicap_index: open_hi,
        course_handicap: 10,
    }
}
