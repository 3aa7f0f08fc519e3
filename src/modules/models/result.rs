use serde::{Deserialize, Serialize};

/// Simsession number of the main race within a subsession.
pub const RACE_SIMSESSION: i32 = 0;

/// `reason_out_id` the service uses for a disqualified car.
pub const REASON_OUT_DISQUALIFIED: i32 = 32;

/// A scoring row of a session. Team races carry one row without `cust_id`
/// for the team and one row per driver of that team.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ResultRow {
    pub subsession_id: i64,
    pub simsession_number: i32,
    pub cust_id: Option<i64>,
    pub car_number: String,
    pub car_class_id: i32,
    pub start_position_in_class: Option<i32>,
    pub finish_position_in_class: Option<i32>,
    pub incidents: i32,
    pub irating_old: i32,
    pub irating_new: i32,
    pub champ_points: Option<i32>,
    pub reason_out_id: i32,
    pub laps_complete: i32,
    pub official: bool,
}

impl ResultRow {
    pub fn is_team_row(&self) -> bool {
        self.cust_id.is_none()
    }

    pub fn is_disqualified(&self) -> bool {
        self.reason_out_id == REASON_OUT_DISQUALIFIED
    }

    pub fn irating_delta(&self) -> i32 {
        self.irating_new - self.irating_old
    }

    pub fn describe(&self) -> String {
        match self.cust_id {
            Some(cust_id) => format!(
                "result row (subsession: {}, car: {}, cust_id: {})",
                self.subsession_id, self.car_number, cust_id
            ),
            None => format!(
                "team result row (subsession: {}, car: {})",
                self.subsession_id, self.car_number
            ),
        }
    }
}

/// Narrows the rows a data source returns for a subsession.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct ResultFilter {
    pub simsession_number: Option<i32>,
    pub cust_id: Option<i64>,
    pub car_number: Option<String>,
}

impl ResultFilter {
    pub fn race() -> ResultFilter {
        ResultFilter {
            simsession_number: Some(RACE_SIMSESSION),
            ..ResultFilter::default()
        }
    }

    pub fn matches(&self, row: &ResultRow) -> bool {
        self.simsession_number
            .map_or(true, |n| row.simsession_number == n)
            && self.cust_id.map_or(true, |c| row.cust_id == Some(c))
            && self
                .car_number
                .as_ref()
                .map_or(true, |car| &row.car_number == car)
    }
}
