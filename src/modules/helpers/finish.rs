use log::debug;

use crate::modules::models::lap::LapRecord;
use crate::modules::models::summary::{CloseFinisher, FinishOutcome};

/// default gap below which two finishers count as a close finish
pub const CLOSE_FINISH_THRESHOLD_MS: i64 = 3000;

pub struct FinishHelper {}

impl FinishHelper {
    /// # classify how a car finished
    /// compare the checkered flag interval of the target with the rest of its class.
    ///
    /// cars on the lead lap report their interval in milliseconds, every other class
    /// car on the lead lap within the threshold is a close finisher. a lapped target
    /// reports the laps it is down, a target without a checkered lap did not finish
    /// unless it was disqualified.
    ///
    /// ## Arguments
    /// * `target_checkered` - the checkered flag lap of the target, if any
    /// * `competitor_checkered` - the checkered flag laps of the rest of the class
    /// * `disqualified` - whether the target was disqualified
    /// * `threshold_ms` - the largest gap that is still close (exclusive)
    ///
    /// ## Returns
    /// * `FinishOutcome` - the finish classification
    pub fn classify(
        target_checkered: Option<&LapRecord>,
        competitor_checkered: &[&LapRecord],
        disqualified: bool,
        threshold_ms: i64,
    ) -> FinishOutcome {
        let target = match target_checkered {
            Some(lap) => lap,
            None if disqualified => return FinishOutcome::Disqualified,
            None => return FinishOutcome::DidNotFinish,
        };

        if let Some(target_ms) = target.interval_ms() {
            let close_finishers = FinishHelper::close_finishers(
                target_ms,
                competitor_checkered,
                &target.car_number,
                threshold_ms,
            );
            return FinishOutcome::LeadLap { close_finishers };
        }

        match target.interval_laps() {
            Some(laps_down) => FinishOutcome::LapsDown { laps_down },
            None => {
                debug!(
                    target: "helpers/finish:classify",
                    "car {} took the checkered flag without an interval",
                    target.car_number
                );
                FinishOutcome::LeadLap {
                    close_finishers: Vec::new(),
                }
            }
        }
    }

    /// # close finishers
    /// every lead lap class car that finished within the threshold of the target,
    /// cars ahead first
    ///
    /// ## Arguments
    /// * `target_ms` - the finish interval of the target, the winner has 0
    /// * `competitor_checkered` - the checkered flag laps of the rest of the class
    /// * `target_car` - the car number of the target, never reported as its own rival
    /// * `threshold_ms` - the largest gap that is still close (exclusive)
    ///
    /// ## Returns
    /// * `Vec<CloseFinisher>` - sorted by relative gap, largest first
    pub fn close_finishers(
        target_ms: i64,
        competitor_checkered: &[&LapRecord],
        target_car: &str,
        threshold_ms: i64,
    ) -> Vec<CloseFinisher> {
        let mut close: Vec<CloseFinisher> = competitor_checkered
            .iter()
            .filter(|lap| lap.car_number != target_car)
            .filter_map(|lap| {
                let other_ms = lap.interval_ms()?;
                let relative_ms = other_ms - target_ms;
                if relative_ms.abs() < threshold_ms {
                    Some(CloseFinisher {
                        car_number: lap.car_number.clone(),
                        relative_ms,
                    })
                } else {
                    None
                }
            })
            .collect();

        close.sort_by(|a, b| b.relative_ms.cmp(&a.relative_ms));
        close
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::models::lap::{IntervalUnits, LapFlags};

    fn checkered(car: &str, interval: i64, units: IntervalUnits) -> LapRecord {
        LapRecord {
            subsession_id: 1,
            simsession_number: 0,
            car_number: car.to_string(),
            cust_id: 1,
            lap_number: 20,
            flags: LapFlags::CHECKERED.bits(),
            lap_position: 1,
            interval: Some(interval),
            interval_units: Some(units),
            lap_time: None,
        }
    }

    #[test]
    fn close_finishers_are_sorted_ahead_first() {
        let target = checkered("10", 5_000, IntervalUnits::Ms);
        let others = vec![
            checkered("1", 0, IntervalUnits::Ms),
            checkered("2", 3_200, IntervalUnits::Ms),
            checkered("3", 6_100, IntervalUnits::Ms),
            checkered("4", 7_999, IntervalUnits::Ms),
            checkered("5", 8_000, IntervalUnits::Ms),
            checkered("6", 1, IntervalUnits::Laps),
        ];
        let refs: Vec<&LapRecord> = others.iter().collect();

        let outcome = FinishHelper::classify(Some(&target), &refs, false, CLOSE_FINISH_THRESHOLD_MS);
        let expected = vec![
            CloseFinisher {
                car_number: "4".to_string(),
                relative_ms: 2_999,
            },
            CloseFinisher {
                car_number: "3".to_string(),
                relative_ms: 1_100,
            },
            CloseFinisher {
                car_number: "2".to_string(),
                relative_ms: -1_800,
            },
        ];
        assert_eq!(
            outcome,
            FinishOutcome::LeadLap {
                close_finishers: expected
            }
        );
    }

    #[test]
    fn target_is_not_its_own_rival() {
        let target = checkered("10", 0, IntervalUnits::Ms);
        let refs = vec![&target];
        let outcome = FinishHelper::classify(Some(&target), &refs, false, 3_000);
        assert_eq!(
            outcome,
            FinishOutcome::LeadLap {
                close_finishers: Vec::new()
            }
        );
    }

    #[test]
    fn lapped_target_reports_laps_down() {
        let target = checkered("10", 2, IntervalUnits::Laps);
        let leader = checkered("1", 0, IntervalUnits::Ms);
        let outcome = FinishHelper::classify(Some(&target), &[&leader], false, 3_000);
        assert_eq!(outcome, FinishOutcome::LapsDown { laps_down: 2 });
    }

    #[test]
    fn no_checkered_is_dnf_unless_disqualified() {
        assert_eq!(
            FinishHelper::classify(None, &[], false, 3_000),
            FinishOutcome::DidNotFinish
        );
        assert_eq!(
            FinishHelper::classify(None, &[], true, 3_000),
            FinishOutcome::Disqualified
        );
    }
}
