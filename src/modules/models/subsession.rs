use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    Practice,
    Qualify,
    TimeTrial,
    Race,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct SubsessionMeta {
    pub subsession_id: i64,
    pub season_year: i32,
    pub season_quarter: i32,
    pub series_id: i32,
    pub track_name: String,
    pub max_team_drivers: i32,
    pub event_laps_complete: i32,
    pub license_category_id: i32,
    pub hosted: bool,
    pub event_type: EventType,
}

impl SubsessionMeta {
    pub fn is_team_race(&self) -> bool {
        self.max_team_drivers > 1
    }

    pub fn is_race(&self) -> bool {
        self.event_type == EventType::Race
    }
}
