use std::collections::HashMap;

use log::debug;

use crate::modules::models::lap::LapRecord;
use crate::modules::models::summary::{LapCategories, LapsLed};

pub struct PositionHelper {}

impl PositionHelper {
    /// # get the laps led by a car
    /// rebuild the running order of a class lap by lap and find the laps on which
    /// the target was ahead of every other car of its class.
    ///
    /// a lap is led when the target has a valid position that is strictly better
    /// than the best position of the rest of the class on that lap, and the lap lies
    /// between the green flag lap and the checkered flag lap (or the last lap driven
    /// when the car did not finish). ties are not led.
    ///
    /// ## Arguments
    /// * `target_laps` - the laps of the target car
    /// * `competitor_laps` - the laps of every other car in the class
    /// * `decoded` - the decoded laps of the target car
    ///
    /// ## Returns
    /// * `LapsLed` - the laps led, the led laps per driver and the class position per lap
    pub fn laps_led(
        target_laps: &[LapRecord],
        competitor_laps: &[LapRecord],
        decoded: &LapCategories,
    ) -> LapsLed {
        let mut competitor_positions: HashMap<i32, Vec<i32>> = HashMap::new();
        for lap in competitor_laps.iter().filter(|lap| lap.lap_position > 0) {
            competitor_positions
                .entry(lap.lap_number)
                .or_default()
                .push(lap.lap_position);
        }

        let window = decoded.green_flag_lap.map(|green| {
            let end = decoded
                .checkered_flag_lap
                .or(decoded.last_lap_driven)
                .unwrap_or(green);
            (green, end)
        });

        let mut led = LapsLed::default();
        for lap in target_laps {
            if lap.lap_position <= 0 {
                continue;
            }

            let others = competitor_positions
                .get(&lap.lap_number)
                .map(|v| v.as_slice())
                .unwrap_or(&[]);
            let ahead = others.iter().filter(|p| **p < lap.lap_position).count() as i32;
            led.class_positions.push((lap.lap_number, ahead + 1));

            let in_window = window
                .map_or(false, |(start, end)| lap.lap_number >= start && lap.lap_number <= end);
            let best_other = others.iter().min();
            let is_leading = best_other.map_or(true, |best| lap.lap_position < *best);

            if in_window && is_leading {
                led.laps_led.push(lap.lap_number);
                led.laps_led_by_driver
                    .entry(lap.cust_id)
                    .or_default()
                    .push(lap.lap_number);
            }
        }

        debug!(
            target: "helpers/position:laps_led",
            "car {} led {} laps",
            target_laps.first().map(|l| l.car_number.as_str()).unwrap_or("?"),
            led.laps_led.len()
        );

        led
    }
}
