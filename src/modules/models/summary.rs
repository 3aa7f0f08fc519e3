use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Lap numbers per lap category of one car in one session.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct LapCategories {
    pub off_track_laps: Vec<i32>,
    pub pitted_laps: Vec<i32>,
    pub black_flag_laps: Vec<i32>,
    pub car_reset_laps: Vec<i32>,
    pub contact_laps: Vec<i32>,
    pub car_contact_laps: Vec<i32>,
    pub lost_control_laps: Vec<i32>,
    pub discontinuity_laps: Vec<i32>,
    pub interpolated_crossing_laps: Vec<i32>,
    pub clock_smash_laps: Vec<i32>,
    pub tow_laps: Vec<i32>,
    pub driver_change_laps: Vec<i32>,
    pub optional_path_laps: Vec<i32>,
    /// spins that were not caused by contact with another car
    pub self_spin_laps: Vec<i32>,
    pub green_flag_lap: Option<i32>,
    pub checkered_flag_lap: Option<i32>,
    pub last_lap_driven: Option<i32>,
    pub fastest_lap: Option<FastestLap>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct FastestLap {
    pub lap_number: i32,
    pub lap_time: i64,
}

/// Laps led by a car and the in class running order of that car.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct LapsLed {
    pub laps_led: Vec<i32>,
    /// team races attribute every led lap to the driver of that lap
    pub laps_led_by_driver: BTreeMap<i64, Vec<i32>>,
    /// `(lap number, position in class)` for every lap with a valid position
    pub class_positions: Vec<(i32, i32)>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct CloseFinisher {
    pub car_number: String,
    /// gap in milliseconds, positive when the other car finished behind
    pub relative_ms: i64,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FinishOutcome {
    LeadLap { close_finishers: Vec<CloseFinisher> },
    LapsDown { laps_down: i64 },
    DidNotFinish,
    Disqualified,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct DriverSummary {
    pub cust_id: i64,
    pub incidents: i32,
    pub irating_old: i32,
    pub irating_new: i32,
    pub irating_delta: i32,
    pub laps_complete: i32,
    pub laps_led: Vec<i32>,
}

/// Everything a narrative about one car in one race needs. Built on demand and
/// never stored.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct CarResultSummary {
    pub subsession_id: i64,
    pub series_id: i32,
    pub season_year: i32,
    pub season_quarter: i32,
    pub track_name: String,
    pub car_number: String,
    pub car_class_id: i32,
    pub is_team_race: bool,
    pub is_multiclass: bool,
    pub hosted: bool,
    pub event_laps_complete: i32,
    pub start_position_in_class: Option<i32>,
    pub finish_position_in_class: Option<i32>,
    pub positions_gained: Option<i32>,
    pub champ_points: Option<i32>,
    pub car_sof: Option<i32>,
    pub class_sof: Option<i32>,
    pub class_car_count: usize,
    pub drivers: Vec<DriverSummary>,
    pub laps_led: Vec<i32>,
    pub class_positions: Vec<(i32, i32)>,
    pub laps: LapCategories,
    pub finish: FinishOutcome,
    /// rank of the car number among all class car numbers, lowest number first
    pub car_number_rank: Option<i32>,
    /// car number rank minus finish position, positive when beating the number
    pub car_number_delta: Option<i32>,
}

impl CarResultSummary {
    pub fn towed(&self) -> bool {
        !self.laps.tow_laps.is_empty()
    }

    pub fn had_contact(&self) -> bool {
        !self.laps.car_contact_laps.is_empty() || !self.laps.contact_laps.is_empty()
    }

    pub fn self_spun(&self) -> bool {
        !self.laps.self_spin_laps.is_empty()
    }

    pub fn black_flagged(&self) -> bool {
        !self.laps.black_flag_laps.is_empty()
    }

    pub fn total_incidents(&self) -> i32 {
        self.drivers.iter().map(|d| d.incidents).sum()
    }

    pub fn driver(&self, cust_id: i64) -> Option<&DriverSummary> {
        self.drivers.iter().find(|d| d.cust_id == cust_id)
    }
}
