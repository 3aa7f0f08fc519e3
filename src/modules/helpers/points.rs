use std::collections::{BTreeMap, BTreeSet};

use log::{debug, warn};

use crate::modules::config::EngineConfig;
use crate::modules::helpers::math::Math;
use crate::modules::models::points::{ChampPointsRow, WeeklyPointsTable};
use crate::modules::models::season::{SeasonCalendar, SeasonDates};

/// only the best quarter of the results of a week count, rounded up
const RESULTS_PER_COUNTED_RESULT: usize = 4;

/// The season a points table is built for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeasonKey {
    pub year: i32,
    pub quarter: i32,
}

pub struct PointsHelper {}

impl PointsHelper {
    /// # race week of a result
    /// the week a result counts towards. when adjusting, the week is recomputed
    /// from the start time of the race and the start of the season, but only used
    /// when it lands inside the season.
    ///
    /// ## Arguments
    /// * `row` - the result
    /// * `season` - the dates of the season of the result, if known
    /// * `adjust` - whether to recompute the week
    ///
    /// ## Returns
    /// * `i64` - the zero based race week
    pub fn race_week(row: &ChampPointsRow, season: Option<&SeasonDates>, adjust: bool) -> i64 {
        let reported = row.race_week_num as i64;
        if !adjust {
            return reported;
        }

        match season {
            Some(season) => {
                let computed = season.week_of(row.start_time);
                if season.is_valid_week(computed) {
                    computed
                } else {
                    reported
                }
            }
            None => reported,
        }
    }

    /// # representative points of a week
    /// keep the best `ceil(n / 4)` results of a week and average them
    ///
    /// ## Arguments
    /// * `points` - the points of every scored result of the week
    ///
    /// ## Returns
    /// * `Option<i32>` - the truncated average, `None` for a week without results
    pub fn best_of_week(points: &[i32]) -> Option<i32> {
        let mut sorted = points.to_vec();
        sorted.sort_by(|a, b| b.cmp(a));
        let counted = Math::ceil_div(sorted.len(), RESULTS_PER_COUNTED_RESULT);

        Math::truncating_mean(&sorted[..counted])
    }

    /// # weekly points of a series
    /// one representative point value per race week for one member in one series
    /// and season. unofficial results and results without points are skipped.
    ///
    /// ## Arguments
    /// * `rows` - the championship points rows of the member
    /// * `series_id` - the series to collect
    /// * `season` - the season to collect
    /// * `calendar` - the season date ranges
    /// * `adjust` - whether to recompute race weeks from the start time
    /// * `up_to_week` - the last week to include
    ///
    /// ## Returns
    /// * `WeeklyPointsTable` - the points per week
    pub fn weekly_points(
        rows: &[ChampPointsRow],
        series_id: i32,
        season: SeasonKey,
        calendar: &SeasonCalendar,
        adjust: bool,
        up_to_week: Option<u32>,
    ) -> WeeklyPointsTable {
        let season_dates = calendar.find(season.year, season.quarter);
        let mut per_week: BTreeMap<u32, Vec<i32>> = BTreeMap::new();

        for row in rows.iter().filter(|row| {
            row.official
                && row.series_id == series_id
                && row.season_year == season.year
                && row.season_quarter == season.quarter
        }) {
            let points = match row.champ_points {
                Some(points) => points,
                None => {
                    warn!(
                        target: "helpers/points:weekly_points",
                        "skipping subsession {} without champ points",
                        row.subsession_id
                    );
                    continue;
                }
            };

            let week = PointsHelper::race_week(row, season_dates, adjust);
            if week < 0 {
                warn!(
                    target: "helpers/points:weekly_points",
                    "skipping subsession {} with race week {}",
                    row.subsession_id,
                    week
                );
                continue;
            }
            let week = week as u32;
            if up_to_week.map_or(false, |last| week > last) {
                continue;
            }

            per_week.entry(week).or_default().push(points);
        }

        per_week
            .into_iter()
            .filter_map(|(week, points)| PointsHelper::best_of_week(&points).map(|p| (week, p)))
            .collect()
    }

    /// every series the member entered during the season
    pub fn series_raced(rows: &[ChampPointsRow], season: SeasonKey) -> BTreeSet<i32> {
        rows.iter()
            .filter(|row| row.season_year == season.year && row.season_quarter == season.quarter)
            .map(|row| row.series_id)
            .collect()
    }

    /// # series of the umbrella championship
    /// the series the member raced in the season, the configured legacy series is
    /// always added except in its excluded season.
    ///
    /// ## Arguments
    /// * `rows` - the championship points rows of the member
    /// * `season` - the season to collect
    /// * `config` - the engine config
    ///
    /// ## Returns
    /// * `BTreeSet<i32>` - the series ids to merge
    pub fn umbrella_series(
        rows: &[ChampPointsRow],
        season: SeasonKey,
        config: &EngineConfig,
    ) -> BTreeSet<i32> {
        let mut series = PointsHelper::series_raced(rows, season);
        if let Some(rule) = &config.legacy_series {
            if rule.applies_to(season.year, season.quarter) {
                series.insert(rule.series_id);
            }
        }

        series
    }

    /// # weekly points of the umbrella championship
    /// build the weekly points of every umbrella series and keep the best value of
    /// each week across those series.
    ///
    /// ## Arguments
    /// * `rows` - the championship points rows of the member
    /// * `season` - the season to collect
    /// * `calendar` - the season date ranges
    /// * `config` - the engine config
    /// * `up_to_week` - the last week to include
    ///
    /// ## Returns
    /// * `WeeklyPointsTable` - the best points per week across series
    pub fn umbrella_weekly_points(
        rows: &[ChampPointsRow],
        season: SeasonKey,
        calendar: &SeasonCalendar,
        config: &EngineConfig,
        up_to_week: Option<u32>,
    ) -> WeeklyPointsTable {
        let series = PointsHelper::umbrella_series(rows, season, config);

        let mut merged = WeeklyPointsTable::new();
        for series_id in series {
            let table = PointsHelper::weekly_points(
                rows,
                series_id,
                season,
                calendar,
                config.adjust_race_weeks,
                up_to_week,
            );
            debug!(
                target: "helpers/points:umbrella_weekly_points",
                "series {} contributes {} weeks",
                series_id,
                table.len()
            );
            merged.merge_max(&table);
        }

        merged
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::config::LegacySeriesRule;
    use chrono::{DateTime, Duration, TimeZone, Utc};

    const SEASON: SeasonKey = SeasonKey {
        year: 2023,
        quarter: 2,
    };

    fn season_start() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2023, 3, 14, 0, 0, 0).unwrap()
    }

    fn calendar() -> SeasonCalendar {
        SeasonCalendar::new(vec![SeasonDates {
            year: 2023,
            quarter: 2,
            start: season_start(),
            end: season_start() + Duration::weeks(12),
        }])
    }

    fn result(series_id: i32, week: i32, points: Option<i32>) -> ChampPointsRow {
        ChampPointsRow {
            subsession_id: 1,
            series_id,
            season_year: 2023,
            season_quarter: 2,
            start_time: season_start() + Duration::weeks(week as i64) + Duration::hours(20),
            race_week_num: week,
            official: true,
            champ_points: points,
        }
    }

    #[test]
    fn best_quarter_of_a_week_counts() {
        assert_eq!(PointsHelper::best_of_week(&[60, 60, 60, 60]), Some(60));
        assert_eq!(PointsHelper::best_of_week(&[10, 50, 20, 45, 30]), Some(47));
        assert_eq!(PointsHelper::best_of_week(&[33]), Some(33));
        assert_eq!(PointsHelper::best_of_week(&[]), None);
    }

    #[test]
    fn weekly_points_skip_unscored_results() {
        let mut unofficial = result(5, 0, Some(200));
        unofficial.official = false;
        let rows = vec![
            result(5, 0, Some(40)),
            result(5, 0, Some(44)),
            result(5, 1, None),
            result(5, 2, Some(70)),
            result(6, 2, Some(99)),
            unofficial,
        ];

        let table = PointsHelper::weekly_points(&rows, 5, SEASON, &calendar(), false, None);
        assert_eq!(table.get(0), Some(44));
        assert_eq!(table.get(1), None);
        assert_eq!(table.get(2), Some(70));
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn weeks_after_cutoff_are_left_out() {
        let rows = vec![result(5, 0, Some(10)), result(5, 3, Some(20)), result(5, 4, Some(30))];
        let table = PointsHelper::weekly_points(&rows, 5, SEASON, &calendar(), false, Some(3));
        assert_eq!(table.iter().collect::<Vec<_>>(), vec![(0, 10), (3, 20)]);
    }

    #[test]
    fn adjusted_week_only_overrides_inside_the_season() {
        let cal = calendar();
        let season = cal.find(2023, 2);

        let mut shifted = result(5, 3, Some(10));
        shifted.start_time = season_start() + Duration::days(15);
        assert_eq!(PointsHelper::race_week(&shifted, season, true), 2);
        assert_eq!(PointsHelper::race_week(&shifted, season, false), 3);

        let mut late = result(5, 11, Some(10));
        late.start_time = season_start() + Duration::weeks(13);
        assert_eq!(PointsHelper::race_week(&late, season, true), 11);

        assert_eq!(PointsHelper::race_week(&shifted, None, true), 3);
    }

    #[test]
    fn umbrella_keeps_the_best_series_per_week() {
        let rows = vec![
            result(5, 0, Some(40)),
            result(6, 0, Some(55)),
            result(6, 1, Some(12)),
            result(5, 1, Some(30)),
            result(7, 2, Some(8)),
        ];
        let table = PointsHelper::umbrella_weekly_points(
            &rows,
            SEASON,
            &calendar(),
            &EngineConfig::default(),
            None,
        );
        assert_eq!(table.iter().collect::<Vec<_>>(), vec![(0, 55), (1, 30), (2, 8)]);
    }

    #[test]
    fn legacy_series_is_folded_in_outside_its_excluded_season() {
        let rows = vec![result(5, 4, Some(20)), result(6, 4, Some(25))];
        let mut config = EngineConfig::default();
        config.legacy_series = Some(LegacySeriesRule {
            series_id: 231,
            excluded_season: Some((2023, 2)),
        });

        let series = PointsHelper::umbrella_series(&rows, SEASON, &config);
        assert_eq!(series.into_iter().collect::<Vec<_>>(), vec![5, 6]);

        let other_season = SeasonKey {
            year: 2023,
            quarter: 3,
        };
        let mut next_quarter = result(5, 0, Some(10));
        next_quarter.season_quarter = 3;
        let series = PointsHelper::umbrella_series(&[next_quarter], other_season, &config);
        assert_eq!(series.into_iter().collect::<Vec<_>>(), vec![5, 231]);

        let table = PointsHelper::umbrella_weekly_points(&rows, SEASON, &calendar(), &config, None);
        assert_eq!(table.get(4), Some(25));
    }

    #[test]
    fn unofficial_entries_count_as_raced_but_score_nothing() {
        let mut unofficial = result(9, 1, Some(90));
        unofficial.official = false;
        let rows = vec![result(5, 1, Some(15)), unofficial];

        let series = PointsHelper::series_raced(&rows, SEASON);
        assert!(series.contains(&9));

        let table = PointsHelper::umbrella_weekly_points(
            &rows,
            SEASON,
            &calendar(),
            &EngineConfig::default(),
            None,
        );
        assert_eq!(table.get(1), Some(15));
    }
}
