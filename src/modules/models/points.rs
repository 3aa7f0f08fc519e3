use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A championship points row of one member in one race.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ChampPointsRow {
    pub subsession_id: i64,
    pub series_id: i32,
    pub season_year: i32,
    pub season_quarter: i32,
    pub start_time: DateTime<Utc>,
    pub race_week_num: i32,
    pub official: bool,
    pub champ_points: Option<i32>,
}

/// One representative point value per race week, ordered by week index.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(transparent)]
pub struct WeeklyPointsTable {
    weeks: BTreeMap<u32, i32>,
}

impl WeeklyPointsTable {
    pub fn new() -> WeeklyPointsTable {
        WeeklyPointsTable::default()
    }

    pub fn insert(&mut self, week: u32, points: i32) {
        self.weeks.insert(week, points);
    }

    pub fn get(&self, week: u32) -> Option<i32> {
        self.weeks.get(&week).copied()
    }

    pub fn contains_week(&self, week: u32) -> bool {
        self.weeks.contains_key(&week)
    }

    pub fn len(&self) -> usize {
        self.weeks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.weeks.is_empty()
    }

    /// weeks in ascending week order
    pub fn iter(&self) -> impl Iterator<Item = (u32, i32)> + '_ {
        self.weeks.iter().map(|(week, points)| (*week, *points))
    }

    pub fn max_points(&self) -> Option<i32> {
        self.weeks.values().copied().max()
    }

    /// keep the highest value for every week present in either table
    pub fn merge_max(&mut self, other: &WeeklyPointsTable) {
        for (week, points) in other.iter() {
            let entry = self.weeks.entry(week).or_insert(points);
            if points > *entry {
                *entry = points;
            }
        }
    }
}

impl FromIterator<(u32, i32)> for WeeklyPointsTable {
    fn from_iter<I: IntoIterator<Item = (u32, i32)>>(iter: I) -> Self {
        WeeklyPointsTable {
            weeks: iter.into_iter().collect(),
        }
    }
}

/// Result of the drop week selection.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct WeeklyTotal {
    pub total_points: i32,
    /// week indices that count towards the total, best week first
    pub counted_weeks: Vec<u32>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct LeaderboardEntry {
    pub cust_id: i64,
    pub weeks: WeeklyPointsTable,
    pub total_points: i32,
    pub projected_points: i32,
    pub counted_weeks: Vec<u32>,
}
