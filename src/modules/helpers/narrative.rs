use std::collections::BTreeSet;

use log::{info, warn};

use crate::errors::{CustomResult, Error};
use crate::modules::config::EngineConfig;
use crate::modules::helpers::finish::FinishHelper;
use crate::modules::helpers::general::Helpers;
use crate::modules::helpers::lap::LapHelper;
use crate::modules::helpers::position::PositionHelper;
use crate::modules::helpers::sof::SofHelper;
use crate::modules::models::lap::LapRecord;
use crate::modules::models::result::{ResultRow, RACE_SIMSESSION};
use crate::modules::models::subsession::SubsessionMeta;
use crate::modules::models::summary::{CarResultSummary, DriverSummary, LapsLed};

pub struct NarrativeHelper {}

impl NarrativeHelper {
    /// # summarize the race of a car
    /// combine the decoded laps, laps led, strength of field, finish classification
    /// and the result rows of one car into a single summary.
    ///
    /// team races take positions, points and strength from the team row and the
    /// personal numbers from every driver row that completed a lap.
    ///
    /// ## Arguments
    /// * `meta` - the subsession the car raced in
    /// * `rows` - all result rows of the subsession
    /// * `laps` - all race laps of the subsession
    /// * `car_number` - the car to summarize
    /// * `config` - the engine config
    ///
    /// ## Returns
    /// * `CarResultSummary` - the summary of the car
    /// * `NotARaceError` - when the subsession has no scored race
    /// * `InconsistentStateError` - when a team race has no team row for the car
    /// * `NotFoundError` - when the car has no result row
    /// * `InvalidFlagsError` - when a lap of the class carries unknown flag bits
    pub fn summarize_car(
        meta: &SubsessionMeta,
        rows: &[ResultRow],
        laps: &[LapRecord],
        car_number: &str,
        config: &EngineConfig,
    ) -> CustomResult<CarResultSummary> {
        let race_rows: Vec<ResultRow> = rows
            .iter()
            .filter(|row| row.simsession_number == RACE_SIMSESSION)
            .cloned()
            .collect();
        if !meta.is_race() || race_rows.is_empty() {
            return Err(Error::NotARaceError {
                subsession_id: meta.subsession_id,
            });
        }

        let is_team_race = meta.is_team_race();
        let car_rows: Vec<&ResultRow> = race_rows
            .iter()
            .filter(|row| row.car_number == car_number)
            .collect();
        if car_rows.is_empty() {
            return Err(Error::NotFoundError {
                entity: "car",
                id: format!("{} in subsession {}", car_number, meta.subsession_id),
            });
        }

        let primary: &ResultRow = if is_team_race {
            match car_rows.iter().find(|row| row.is_team_row()) {
                Some(row) => *row,
                None => {
                    return Err(Error::InconsistentStateError {
                        subsession_id: meta.subsession_id,
                        car_number: car_number.to_string(),
                    })
                }
            }
        } else {
            match car_rows.iter().find(|row| !row.is_team_row()) {
                Some(row) => *row,
                None => {
                    return Err(Error::MissingDataError {
                        field: "cust_id",
                        row: car_rows[0].describe(),
                    })
                }
            }
        };

        let class_id = primary.car_class_id;
        let is_multiclass = Helpers::count_distinct(race_rows.iter().map(|r| r.car_class_id)) > 1;
        let class_cars: BTreeSet<String> = race_rows
            .iter()
            .filter(|row| row.car_class_id == class_id)
            .map(|row| row.car_number.clone())
            .collect();

        // laps
        let class_laps: Vec<LapRecord> = laps
            .iter()
            .filter(|lap| {
                lap.simsession_number == RACE_SIMSESSION && class_cars.contains(&lap.car_number)
            })
            .cloned()
            .collect();
        let mut per_car = LapHelper::laps_per_car(&class_laps);
        let target_laps = per_car.remove(car_number).unwrap_or_default();
        let decoded = LapHelper::decode_laps(&target_laps)?;

        let competitor_laps: Vec<LapRecord> = per_car.values().flatten().cloned().collect();
        let led = PositionHelper::laps_led(&target_laps, &competitor_laps, &decoded);

        // strength of field
        let ratings = SofHelper::ratings_per_car(&race_rows, class_id, is_team_race);
        let car_sof = ratings.get(car_number).and_then(|r| SofHelper::car_sof(r));
        let class_sof = SofHelper::class_sof(ratings.values());

        // finish
        let mut competitor_checkered: Vec<&LapRecord> = Vec::new();
        for car_laps in per_car.values() {
            if let Some(lap) = LapHelper::checkered_lap(car_laps)? {
                competitor_checkered.push(lap);
            }
        }
        let finish = FinishHelper::classify(
            LapHelper::checkered_lap(&target_laps)?,
            &competitor_checkered,
            primary.is_disqualified(),
            config.close_finish_threshold_ms,
        );

        let drivers = NarrativeHelper::driver_summaries(&car_rows, is_team_race, &led);

        let (car_number_rank, car_number_delta) = if !is_team_race && !meta.hosted {
            NarrativeHelper::car_number_rank(
                car_number,
                &class_cars,
                primary.finish_position_in_class,
            )
        } else {
            (None, None)
        };

        if primary.finish_position_in_class.is_none() {
            warn!(
                target: "helpers/narrative:summarize_car",
                "no finish position on {}",
                primary.describe()
            );
        }

        let positions_gained = match (
            primary.start_position_in_class,
            primary.finish_position_in_class,
        ) {
            (Some(start), Some(finish)) => Some(start - finish),
            _ => None,
        };

        info!(
            target: "helpers/narrative:summarize_car",
            "summarized car {} of subsession {} ({} laps led)",
            car_number,
            meta.subsession_id,
            led.laps_led.len()
        );

        Ok(CarResultSummary {
            subsession_id: meta.subsession_id,
            series_id: meta.series_id,
            season_year: meta.season_year,
            season_quarter: meta.season_quarter,
            track_name: meta.track_name.clone(),
            car_number: car_number.to_string(),
            car_class_id: class_id,
            is_team_race,
            is_multiclass,
            hosted: meta.hosted,
            event_laps_complete: meta.event_laps_complete,
            start_position_in_class: primary.start_position_in_class,
            finish_position_in_class: primary.finish_position_in_class,
            positions_gained,
            champ_points: primary.champ_points,
            car_sof: SofHelper::truncate(car_sof),
            class_sof: SofHelper::truncate(class_sof),
            class_car_count: class_cars.len(),
            drivers,
            laps_led: led.laps_led,
            class_positions: led.class_positions,
            laps: decoded,
            finish,
            car_number_rank,
            car_number_delta,
        })
    }

    /// # driver summaries
    /// the personal numbers of every driver of the car. team races only list
    /// drivers that completed a lap.
    fn driver_summaries(
        car_rows: &[&ResultRow],
        is_team_race: bool,
        led: &LapsLed,
    ) -> Vec<DriverSummary> {
        let mut drivers = Vec::new();
        for row in car_rows {
            let cust_id = match row.cust_id {
                Some(cust_id) => cust_id,
                None => continue,
            };
            if is_team_race && row.laps_complete <= 0 {
                continue;
            }

            let laps_led = if is_team_race {
                led.laps_led_by_driver
                    .get(&cust_id)
                    .cloned()
                    .unwrap_or_default()
            } else {
                led.laps_led.clone()
            };

            drivers.push(DriverSummary {
                cust_id,
                incidents: row.incidents,
                irating_old: row.irating_old,
                irating_new: row.irating_new,
                irating_delta: row.irating_delta(),
                laps_complete: row.laps_complete,
                laps_led,
            });
        }

        drivers
    }

    /// # rank of a car number
    /// rank every car number of the class from low to high and compare the rank of
    /// the target with its finish position.
    /// car numbers that are not numeric are left out of the ranking.
    ///
    /// ## Returns
    /// * `(Option<i32>, Option<i32>)` - the rank and the rank minus the finish position
    fn car_number_rank(
        car_number: &str,
        class_cars: &BTreeSet<String>,
        finish_position: Option<i32>,
    ) -> (Option<i32>, Option<i32>) {
        let mut numbers: Vec<(i64, &str)> = Vec::new();
        for car in class_cars {
            match car.trim().parse::<i64>() {
                Ok(number) => numbers.push((number, car.as_str())),
                Err(_) => {
                    warn!(
                        target: "helpers/narrative:car_number_rank",
                        "skipping non numeric car number {:?}",
                        car
                    );
                }
            }
        }
        // "7" and "07" share a value, the spelling keeps them apart
        numbers.sort();

        let rank = numbers
            .iter()
            .position(|(_, car)| *car == car_number)
            .map(|index| index as i32 + 1);
        let delta = match (rank, finish_position) {
            (Some(rank), Some(finish)) => Some(rank - finish),
            _ => None,
        };

        (rank, delta)
    }
}
