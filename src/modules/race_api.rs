use std::thread;

use chrono::{DateTime, Utc};
use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::errors::{CustomResult, Error};
use crate::modules::config::EngineConfig;
use crate::modules::helpers::math::Math;
use crate::modules::helpers::narrative::NarrativeHelper;
use crate::modules::helpers::points::{PointsHelper, SeasonKey};
use crate::modules::helpers::standings::StandingsHelper;
use crate::modules::models::points::LeaderboardEntry;
use crate::modules::models::result::{ResultFilter, RACE_SIMSESSION};
use crate::modules::models::season::SeasonCalendar;
use crate::modules::models::summary::CarResultSummary;
use crate::modules::source::RaceDataSource;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct LeaderboardQuery {
    pub series_id: i32,
    pub season_year: i32,
    pub season_quarter: i32,
    /// last race week to include, every week when empty
    pub up_to_week: Option<u32>,
    pub now: DateTime<Utc>,
    pub members: Vec<i64>,
}

/// # summarize the race of a member
/// fetch the race of a subsession and summarize the car the member drove.
///
/// ## Arguments
/// * `source` - the race data
/// * `config` - the engine config
/// * `subsession_id` - the subsession to summarize
/// * `cust_id` - the member whose car to summarize
///
/// ## Returns
/// * `Option<CarResultSummary>` - `None` when the subsession is not a race the member
///   finished scoring in, or when a team race is missing its team row
/// * `NotFoundError` / `StorageError` - when the data can't be fetched
pub fn summarize_race<S: RaceDataSource>(
    source: &S,
    config: &EngineConfig,
    subsession_id: i64,
    cust_id: i64,
) -> CustomResult<Option<CarResultSummary>> {
    let meta = source.subsession_meta(subsession_id)?;
    let rows = source.result_rows(subsession_id, &ResultFilter::race())?;

    let car_number = match rows.iter().find(|row| row.cust_id == Some(cust_id)) {
        Some(row) => row.car_number.clone(),
        None => {
            info!(
                target: "race_api:summarize_race",
                "member {} has no race result in subsession {}",
                cust_id,
                subsession_id
            );
            return Ok(None);
        }
    };

    let laps = source.lap_records(subsession_id, Some(RACE_SIMSESSION))?;

    match NarrativeHelper::summarize_car(&meta, &rows, &laps, &car_number, config) {
        Ok(summary) => Ok(Some(summary)),
        Err(error @ Error::NotARaceError { .. })
        | Err(error @ Error::InconsistentStateError { .. }) => {
            warn!(target: "race_api:summarize_race", "no summary: {}", error);
            Ok(None)
        }
        Err(error) => Err(error),
    }
}

/// # build a leaderboard
/// compute the weekly points, total and projection of every member of the query.
/// members are computed in parallel, the result is ordered by total from high to low
/// with equal totals kept in member order. members without a scored week are left out.
///
/// ## Arguments
/// * `source` - the race data
/// * `config` - the engine config
/// * `query` - the series, season and members to rank
///
/// ## Returns
/// * `Vec<LeaderboardEntry>` - the ranked entries
/// * `NotFoundError` / `StorageError` - when the data of a member can't be fetched
pub fn build_leaderboard<S: RaceDataSource>(
    source: &S,
    config: &EngineConfig,
    query: &LeaderboardQuery,
) -> CustomResult<Vec<LeaderboardEntry>> {
    let calendar = SeasonCalendar::new(source.season_date_ranges()?);
    let (completed_weeks, season_active) =
        match calendar.find(query.season_year, query.season_quarter) {
            Some(season) => (
                season.completed_weeks(query.now, config.season_weeks),
                season.is_active(query.now),
            ),
            None => {
                warn!(
                    target: "race_api:build_leaderboard",
                    "no dates for season {}-{}, treating it as completed",
                    query.season_year,
                    query.season_quarter
                );
                (config.season_weeks, false)
            }
        };

    let workers = thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    let chunk_size = Math::ceil_div(query.members.len(), workers).max(1);

    let results: Vec<CustomResult<Option<LeaderboardEntry>>> = thread::scope(|scope| {
        let handles: Vec<_> = query
            .members
            .chunks(chunk_size)
            .map(|members| {
                let calendar = &calendar;
                scope.spawn(move || {
                    members
                        .iter()
                        .map(|cust_id| {
                            member_entry(
                                source,
                                config,
                                query,
                                calendar,
                                *cust_id,
                                completed_weeks,
                                season_active,
                            )
                        })
                        .collect::<Vec<_>>()
                })
            })
            .collect();

        handles
            .into_iter()
            .flat_map(|handle| match handle.join() {
                Ok(entries) => entries,
                Err(panic) => std::panic::resume_unwind(panic),
            })
            .collect()
    });

    let mut entries: Vec<LeaderboardEntry> = Vec::new();
    for result in results {
        if let Some(entry) = result? {
            entries.push(entry);
        }
    }
    entries.sort_by(|a, b| b.total_points.cmp(&a.total_points));

    info!(
        target: "race_api:build_leaderboard",
        "leaderboard for series {} {}-{} has {} entries",
        query.series_id,
        query.season_year,
        query.season_quarter,
        entries.len()
    );

    Ok(entries)
}

fn member_entry<S: RaceDataSource>(
    source: &S,
    config: &EngineConfig,
    query: &LeaderboardQuery,
    calendar: &SeasonCalendar,
    cust_id: i64,
    completed_weeks: u32,
    season_active: bool,
) -> CustomResult<Option<LeaderboardEntry>> {
    let rows = source.champ_points_rows(
        cust_id,
        Some(query.season_year),
        Some(query.season_quarter),
    )?;
    let season = SeasonKey {
        year: query.season_year,
        quarter: query.season_quarter,
    };

    let weeks = if config.is_umbrella(query.series_id) {
        PointsHelper::umbrella_weekly_points(&rows, season, calendar, config, query.up_to_week)
    } else {
        PointsHelper::weekly_points(
            &rows,
            query.series_id,
            season,
            calendar,
            config.adjust_race_weeks,
            query.up_to_week,
        )
    };
    if weeks.is_empty() {
        return Ok(None);
    }

    let total = StandingsHelper::total(&weeks, config.drop_weeks_kept);
    let projected_points = StandingsHelper::projection(
        &weeks,
        completed_weeks,
        season_active,
        config.drop_weeks_kept,
        config.season_weeks,
    );

    Ok(Some(LeaderboardEntry {
        cust_id,
        weeks,
        total_points: total.total_points,
        projected_points,
        counted_weeks: total.counted_weeks,
    }))
}
