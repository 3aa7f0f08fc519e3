use log::debug;

use crate::modules::models::points::{WeeklyPointsTable, WeeklyTotal};

/// weeks a member is expected to count over a full season, independent of the
/// configured amount of kept weeks
pub const PROJECTION_INCLUSION_WEEKS: f64 = 6.0;

pub struct StandingsHelper {}

impl StandingsHelper {
    /// # rank the weeks of a table
    /// weeks are first ordered by week index, then stable sorted by points from high
    /// to low. equal points keep the lower week first.
    ///
    /// ## Arguments
    /// * `table` - the weekly points of a member
    ///
    /// ## Returns
    /// * `Vec<(u32, i32)>` - the `(week, points)` pairs, best first
    pub fn ranked_weeks(table: &WeeklyPointsTable) -> Vec<(u32, i32)> {
        let mut weeks: Vec<(u32, i32)> = table.iter().collect();
        weeks.sort_by(|a, b| a.0.cmp(&b.0));
        weeks.sort_by(|a, b| b.1.cmp(&a.1));
        weeks
    }

    /// # total of the best weeks
    /// sum the points of the best `kept` weeks, every week counts when fewer are present
    ///
    /// ## Arguments
    /// * `table` - the weekly points of a member
    /// * `kept` - the amount of weeks that count
    ///
    /// ## Returns
    /// * `WeeklyTotal` - the total and the weeks it is made of
    pub fn total(table: &WeeklyPointsTable, kept: usize) -> WeeklyTotal {
        let counted: Vec<(u32, i32)> = StandingsHelper::ranked_weeks(table)
            .into_iter()
            .take(kept)
            .collect();

        WeeklyTotal {
            total_points: counted.iter().map(|(_, points)| *points).sum(),
            counted_weeks: counted.iter().map(|(week, _)| *week).collect(),
        }
    }

    /// # weeks to project
    /// estimate how many weeks of the current pace will count at the end of the season
    ///
    /// ## Arguments
    /// * `table` - the weekly points of a member
    /// * `completed_weeks` - the amount of weeks of the season that are over
    /// * `season_active` - whether the season is still running
    /// * `kept` - the amount of weeks that count
    /// * `season_weeks` - the length of a season in weeks
    ///
    /// ## Returns
    /// * `usize` - the amount of best weeks to average
    pub fn weeks_to_project(
        table: &WeeklyPointsTable,
        completed_weeks: u32,
        season_active: bool,
        kept: usize,
        season_weeks: u32,
    ) -> usize {
        let weeks_raced = table.len() as f64;
        let projected_weeks_raced = if completed_weeks > 0 {
            weeks_raced / completed_weeks as f64 * season_weeks as f64
        } else {
            0.0
        };
        let inclusion_rate = if projected_weeks_raced > 0.0 {
            PROJECTION_INCLUSION_WEEKS / projected_weeks_raced
        } else {
            1.0
        };
        let mut weeks_to_project = (weeks_raced * inclusion_rate).ceil() as usize;

        // missing the latest week is expected to cost a counted week
        if season_active
            && weeks_to_project > 0
            && completed_weeks > 0
            && !table.contains_week(completed_weeks - 1)
            && weeks_to_project >= kept
        {
            weeks_to_project -= 1;
        }

        weeks_to_project
    }

    /// # projected season total
    /// extrapolate the average of the best weeks to a full set of kept weeks
    ///
    /// ## Arguments
    /// * `table` - the weekly points of a member
    /// * `completed_weeks` - the amount of weeks of the season that are over
    /// * `season_active` - whether the season is still running
    /// * `kept` - the amount of weeks that count
    /// * `season_weeks` - the length of a season in weeks
    ///
    /// ## Returns
    /// * `i32` - the projected total, 0 when nothing can be projected
    pub fn projection(
        table: &WeeklyPointsTable,
        completed_weeks: u32,
        season_active: bool,
        kept: usize,
        season_weeks: u32,
    ) -> i32 {
        let weeks_to_project = StandingsHelper::weeks_to_project(
            table,
            completed_weeks,
            season_active,
            kept,
            season_weeks,
        );
        if weeks_to_project == 0 {
            return 0;
        }

        let sum: i64 = StandingsHelper::ranked_weeks(table)
            .into_iter()
            .take(weeks_to_project)
            .map(|(_, points)| points as i64)
            .sum();
        let projected = (sum as f64 / weeks_to_project as f64 * kept as f64).floor();

        debug!(
            target: "helpers/standings:projection",
            "projecting {} weeks to {}",
            weeks_to_project,
            projected
        );

        projected as i32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(weeks: &[(u32, i32)]) -> WeeklyPointsTable {
        weeks.iter().copied().collect()
    }

    #[test]
    fn best_weeks_are_summed() {
        let t = table(&[(1, 50), (2, 40), (3, 30), (4, 20), (5, 10)]);
        let total = StandingsHelper::total(&t, 3);
        assert_eq!(total.total_points, 120);
        assert_eq!(total.counted_weeks, vec![1, 2, 3]);
    }

    #[test]
    fn ties_keep_the_earlier_week() {
        let t = table(&[(7, 30), (2, 30), (4, 45), (0, 30)]);
        assert_eq!(
            StandingsHelper::ranked_weeks(&t),
            vec![(4, 45), (0, 30), (2, 30), (7, 30)]
        );
        assert_eq!(StandingsHelper::total(&t, 2).counted_weeks, vec![4, 0]);
    }

    #[test]
    fn short_tables_count_every_week() {
        let t = table(&[(0, 12), (3, 8)]);
        assert_eq!(StandingsHelper::total(&t, 6).total_points, 20);
        assert_eq!(StandingsHelper::total(&WeeklyPointsTable::new(), 6).total_points, 0);
    }

    #[test]
    fn empty_table_projects_nothing() {
        let t = WeeklyPointsTable::new();
        assert_eq!(StandingsHelper::weeks_to_project(&t, 5, true, 6, 12), 0);
        assert_eq!(StandingsHelper::projection(&t, 5, true, 6, 12), 0);
        assert_eq!(StandingsHelper::projection(&t, 0, true, 6, 12), 0);
    }

    #[test]
    fn nothing_kept_never_projects_below_zero() {
        let t = WeeklyPointsTable::new();
        assert_eq!(StandingsHelper::weeks_to_project(&t, 5, true, 0, 12), 0);
        assert_eq!(StandingsHelper::projection(&t, 5, true, 0, 12), 0);

        let t = table(&[(0, 40)]);
        assert_eq!(StandingsHelper::projection(&t, 5, true, 0, 12), 0);
    }

    #[test]
    fn full_season_projection_equals_the_total() {
        let t: WeeklyPointsTable = (0..12).map(|w| (w, 100 + w as i32)).collect();
        assert_eq!(StandingsHelper::weeks_to_project(&t, 12, false, 6, 12), 6);
        assert_eq!(
            StandingsHelper::projection(&t, 12, false, 6, 12),
            StandingsHelper::total(&t, 6).total_points
        );
    }

    #[test]
    fn partial_season_pace_is_extrapolated() {
        // 3 of 5 completed weeks: 7.2 projected weeks, 6/7.2 of 3 rounds up to 3
        let t = table(&[(0, 100), (1, 80), (3, 60)]);
        assert_eq!(StandingsHelper::weeks_to_project(&t, 5, true, 6, 12), 3);
        assert_eq!(StandingsHelper::projection(&t, 5, true, 6, 12), 480);
    }

    #[test]
    fn missing_latest_week_costs_a_week_once_enough_are_projected() {
        // weeks 0 to 9 raced, week 10 is the latest completed week
        let t: WeeklyPointsTable = (0..10).map(|w| (w, 10)).collect();
        assert_eq!(StandingsHelper::weeks_to_project(&t, 11, false, 6, 12), 6);
        assert_eq!(StandingsHelper::weeks_to_project(&t, 11, true, 6, 12), 5);
        assert_eq!(StandingsHelper::weeks_to_project(&t, 11, true, 7, 12), 6);
        assert_eq!(StandingsHelper::projection(&t, 11, true, 6, 12), 60);
    }

    #[test]
    fn projection_is_floored() {
        let t = table(&[(0, 10), (1, 11)]);
        // 2 of 2 weeks: 12 projected weeks, 6/12 of 2 is 1 week of 11 points
        assert_eq!(StandingsHelper::projection(&t, 2, true, 6, 12), 66);
        // 2 of 4 weeks: 6 projected weeks, both weeks averaged to 10.5
        assert_eq!(StandingsHelper::projection(&t, 4, false, 6, 12), 63);
    }
}
