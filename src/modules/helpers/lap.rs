use std::collections::BTreeMap;

use crate::errors::CustomResult;
use crate::modules::helpers::general::Helpers;
use crate::modules::models::lap::LapRecord;
use crate::modules::models::summary::{FastestLap, LapCategories};

pub struct LapHelper {}

impl LapHelper {
    /// # decode the laps of a car
    /// sort the lap numbers of one car into the lap categories set in their flags.
    /// a lap can end up in several categories.
    ///
    /// ## Arguments
    /// * `laps` - the laps of one car in one session, in driven order
    ///
    /// ## Returns
    /// * `LapCategories` - the lap numbers per category
    /// * `InvalidFlagsError` - when a lap carries bits outside the known layout
    pub fn decode_laps(laps: &[LapRecord]) -> CustomResult<LapCategories> {
        let mut decoded = LapCategories::default();

        for lap in laps {
            let flags = lap.lap_flags()?;
            let n = lap.lap_number;

            let categories: [(bool, &mut Vec<i32>); 13] = [
                (flags.is_off_track(), &mut decoded.off_track_laps),
                (flags.is_pitted(), &mut decoded.pitted_laps),
                (flags.is_black_flag(), &mut decoded.black_flag_laps),
                (flags.is_car_reset(), &mut decoded.car_reset_laps),
                (flags.is_contact(), &mut decoded.contact_laps),
                (flags.is_car_contact(), &mut decoded.car_contact_laps),
                (flags.is_lost_control(), &mut decoded.lost_control_laps),
                (flags.is_discontinuity(), &mut decoded.discontinuity_laps),
                (flags.is_interpolated_crossing(), &mut decoded.interpolated_crossing_laps),
                (flags.is_clock_smash(), &mut decoded.clock_smash_laps),
                (flags.is_tow(), &mut decoded.tow_laps),
                (flags.is_driver_change(), &mut decoded.driver_change_laps),
                (flags.is_optional_path(), &mut decoded.optional_path_laps),
            ];
            for (is_set, category) in categories {
                if is_set {
                    category.push(n);
                }
            }

            if flags.is_green() && decoded.green_flag_lap.is_none() {
                decoded.green_flag_lap = Some(n);
            }
            if flags.is_checkered() && decoded.checkered_flag_lap.is_none() {
                decoded.checkered_flag_lap = Some(n);
            }

            decoded.last_lap_driven = Some(decoded.last_lap_driven.map_or(n, |last| last.max(n)));

            if let Some(lap_time) = lap.lap_time.filter(|t| *t > 0) {
                let faster = decoded
                    .fastest_lap
                    .map_or(true, |fastest| lap_time < fastest.lap_time);
                if faster {
                    decoded.fastest_lap = Some(FastestLap {
                        lap_number: n,
                        lap_time,
                    });
                }
            }
        }

        decoded.self_spin_laps = Helpers::get_difference_between_vectors(
            &decoded.lost_control_laps,
            &decoded.car_contact_laps,
        );

        Ok(decoded)
    }

    /// # group laps per car
    /// split the laps of a session per car number, every car sorted by lap number
    ///
    /// ## Arguments
    /// * `laps` - the laps of the session
    ///
    /// ## Returns
    /// * `BTreeMap<String, Vec<LapRecord>>` - the laps per car number
    pub fn laps_per_car(laps: &[LapRecord]) -> BTreeMap<String, Vec<LapRecord>> {
        let mut per_car: BTreeMap<String, Vec<LapRecord>> = BTreeMap::new();
        for lap in laps {
            per_car
                .entry(lap.car_number.clone())
                .or_default()
                .push(lap.to_owned());
        }

        for car_laps in per_car.values_mut() {
            car_laps.sort_by_key(|lap| lap.lap_number);
        }

        per_car
    }

    /// the lap a car took the checkered flag on, if it did
    pub fn checkered_lap(laps: &[LapRecord]) -> CustomResult<Option<&LapRecord>> {
        for lap in laps {
            if lap.lap_flags()?.is_checkered() {
                return Ok(Some(lap));
            }
        }
        Ok(None)
    }
}
