use std::collections::BTreeMap;
use std::f64::consts::LN_2;

use crate::modules::helpers::math::Math;
use crate::modules::models::result::ResultRow;

/// spread of the exponential rating weighting, `1600 / ln 2`
pub const SOF_SCALE: f64 = 1600.0 / LN_2;

pub struct SofHelper {}

impl SofHelper {
    /// # strength of a car
    /// the combined starting rating of the drivers of one car.
    /// ratings of zero or below are unknown and left out.
    ///
    /// ## Arguments
    /// * `ratings` - the starting ratings of the drivers of the car
    ///
    /// ## Returns
    /// * `Option<f64>` - `None` when no driver has a valid rating
    pub fn car_sof(ratings: &[i32]) -> Option<f64> {
        let valid: Vec<f64> = ratings
            .iter()
            .filter(|r| **r > 0)
            .map(|r| *r as f64)
            .collect();

        Math::log_domain_average(&valid, SOF_SCALE)
    }

    /// # strength of field of a class
    /// combine the strength of every car of the class the same way the strength of a
    /// car combines its drivers. cars without any valid rating are left out.
    ///
    /// ## Arguments
    /// * `cars` - the starting ratings per car
    ///
    /// ## Returns
    /// * `Option<f64>` - `None` when no car has a valid rating
    pub fn class_sof<'a, I>(cars: I) -> Option<f64>
    where
        I: IntoIterator<Item = &'a Vec<i32>>,
    {
        let car_sofs: Vec<f64> = cars
            .into_iter()
            .filter_map(|ratings| SofHelper::car_sof(ratings))
            .collect();

        Math::log_domain_average(&car_sofs, SOF_SCALE)
    }

    /// # starting ratings per car
    /// collect the starting rating of every driver row of a class, grouped by car.
    /// team rows are skipped, their rating is not a driver rating. in team races only
    /// drivers that completed a lap count.
    ///
    /// ## Arguments
    /// * `rows` - the result rows of the session
    /// * `car_class_id` - the class to collect
    /// * `is_team_race` - whether the cars are shared by teams
    ///
    /// ## Returns
    /// * `BTreeMap<String, Vec<i32>>` - the starting ratings per car number
    pub fn ratings_per_car(
        rows: &[ResultRow],
        car_class_id: i32,
        is_team_race: bool,
    ) -> BTreeMap<String, Vec<i32>> {
        let mut per_car: BTreeMap<String, Vec<i32>> = BTreeMap::new();
        for row in rows.iter().filter(|row| {
            row.car_class_id == car_class_id
                && !row.is_team_row()
                && !(is_team_race && row.laps_complete <= 0)
        }) {
            per_car
                .entry(row.car_number.clone())
                .or_default()
                .push(row.irating_old);
        }

        per_car
    }

    /// whole rating points, the fraction is dropped
    pub fn truncate(sof: Option<f64>) -> Option<i32> {
        sof.map(|s| s.trunc() as i32)
    }
}
