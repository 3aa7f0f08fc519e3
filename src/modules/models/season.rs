use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

const SECONDS_PER_WEEK: i64 = 7 * 24 * 60 * 60;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct SeasonDates {
    pub year: i32,
    pub quarter: i32,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl SeasonDates {
    /// # week of a moment
    /// the zero based week of the season a moment falls in.
    /// moments before the season start give a negative week
    ///
    /// ## Arguments
    /// * `moment` - the moment to place in the season
    ///
    /// ## Returns
    /// * `i64` - `floor((moment - start) / 7 days)`
    pub fn week_of(&self, moment: DateTime<Utc>) -> i64 {
        (moment - self.start).num_seconds().div_euclid(SECONDS_PER_WEEK)
    }

    /// amount of weeks between start and end, a partial week counts as a week
    pub fn week_count(&self) -> i64 {
        let seconds = (self.end - self.start).num_seconds().max(0);
        (seconds + SECONDS_PER_WEEK - 1) / SECONDS_PER_WEEK
    }

    pub fn is_valid_week(&self, week: i64) -> bool {
        week >= 0 && week < self.week_count()
    }

    pub fn contains(&self, moment: DateTime<Utc>) -> bool {
        self.start <= moment && moment < self.end
    }

    pub fn is_active(&self, now: DateTime<Utc>) -> bool {
        self.contains(now)
    }

    /// # completed weeks
    /// the amount of weeks of the season that are fully over at `now`
    ///
    /// ## Arguments
    /// * `now` - the moment to evaluate
    /// * `season_weeks` - the length of a season in weeks
    ///
    /// ## Returns
    /// * `u32` - 0 before the season, `season_weeks` once it has ended
    pub fn completed_weeks(&self, now: DateTime<Utc>, season_weeks: u32) -> u32 {
        if now < self.start {
            0
        } else if now >= self.end {
            season_weeks
        } else {
            (self.week_of(now).max(0) as u32).min(season_weeks)
        }
    }
}

/// Lookup table over the season date ranges the data source provides.
#[derive(Debug, Clone, Default)]
pub struct SeasonCalendar {
    seasons: Vec<SeasonDates>,
}

impl SeasonCalendar {
    pub fn new(mut seasons: Vec<SeasonDates>) -> SeasonCalendar {
        seasons.sort_by_key(|s| s.start);
        SeasonCalendar { seasons }
    }

    pub fn find(&self, year: i32, quarter: i32) -> Option<&SeasonDates> {
        self.seasons
            .iter()
            .find(|s| s.year == year && s.quarter == quarter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn season() -> SeasonDates {
        let start = Utc.with_ymd_and_hms(2023, 3, 14, 0, 0, 0).unwrap();
        SeasonDates {
            year: 2023,
            quarter: 2,
            start,
            end: start + Duration::weeks(12),
        }
    }

    #[test]
    fn week_of_floors_to_whole_weeks() {
        let s = season();
        assert_eq!(s.week_of(s.start), 0);
        assert_eq!(s.week_of(s.start + Duration::days(6)), 0);
        assert_eq!(s.week_of(s.start + Duration::days(7)), 1);
        assert_eq!(s.week_of(s.start - Duration::hours(1)), -1);
    }

    #[test]
    fn valid_weeks_follow_the_date_range() {
        let s = season();
        assert_eq!(s.week_count(), 12);
        assert!(s.is_valid_week(0));
        assert!(s.is_valid_week(11));
        assert!(!s.is_valid_week(12));
        assert!(!s.is_valid_week(-1));
    }

    #[test]
    fn completed_weeks_are_capped() {
        let s = season();
        assert_eq!(s.completed_weeks(s.start - Duration::days(1), 12), 0);
        assert_eq!(s.completed_weeks(s.start + Duration::days(22), 12), 3);
        assert_eq!(s.completed_weeks(s.end + Duration::days(30), 12), 12);
    }

    #[test]
    fn calendar_finds_seasons() {
        let calendar = SeasonCalendar::new(vec![season()]);
        assert_eq!(calendar.find(2023, 2), Some(&season()));
        assert!(calendar.find(2023, 3).is_none());
    }
}
