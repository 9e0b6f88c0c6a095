use std::fmt::Display;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One row of the PvP ranking table.
///
/// Every field is the display text of its column, trimmed and otherwise left
/// untouched. No numeric coercion is applied.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerRanking {
    pub position: String,
    pub name: String,
    pub level: String,
    /// Read from the `class` attribute of the icon in the fourth column.
    pub school: String,
    pub wins: String,
    pub rating: String,
}

impl PlayerRanking {
    /// Label/value pairs in the order they are printed.
    pub fn labeled_fields(&self) -> [(&'static str, &str); 6] {
        [
            ("Position", self.position.as_str()),
            ("Name", self.name.as_str()),
            ("Level", self.level.as_str()),
            ("Wins", self.wins.as_str()),
            ("School", self.school.as_str()),
            ("Rating", self.rating.as_str()),
        ]
    }
}

impl Display for PlayerRanking {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (label, value) in self.labeled_fields() {
            writeln!(f, "{}: {}", label, value)?;
        }
        Ok(())
    }
}

/// One row of the tournament schedule table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tournament {
    pub name: String,
    pub levels: String,
    /// Epoch milliseconds as a digit string when the cell embeds a
    /// `new Date(..)` call, otherwise the raw cell text.
    pub start_time: String,
    pub duration: String,
}

impl Tournament {
    pub fn labeled_fields(&self) -> [(&'static str, &str); 4] {
        [
            ("Tournament Name", self.name.as_str()),
            ("Levels", self.levels.as_str()),
            ("Start Time", self.start_time.as_str()),
            ("Duration", self.duration.as_str()),
        ]
    }

    /// Interprets `start_time` as milliseconds since the Unix epoch.
    ///
    /// Returns `None` when the field holds free text or a value chrono cannot
    /// represent.
    pub fn start_time_utc(&self) -> Option<DateTime<Utc>> {
        let millis = self.start_time.parse::<i64>().ok()?;
        DateTime::from_timestamp_millis(millis)
    }
}

impl Display for Tournament {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (label, value) in self.labeled_fields() {
            writeln!(f, "{}: {}", label, value)?;
        }
        Ok(())
    }
}
