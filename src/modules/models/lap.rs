use std::fmt;

use serde::{Deserialize, Serialize};

use crate::errors::{CustomResult, Error};

/// Unit of the gap reported on a lap record.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum IntervalUnits {
    Ms,
    Laps,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct LapRecord {
    pub subsession_id: i64,
    pub simsession_number: i32,
    pub car_number: String,
    pub cust_id: i64,
    pub lap_number: i32,
    pub flags: u32,
    pub lap_position: i32,
    pub interval: Option<i64>,
    pub interval_units: Option<IntervalUnits>,
    /// lap time in milliseconds, `None` when the lap was not timed
    pub lap_time: Option<i64>,
}

impl LapRecord {
    /// # get the flags of the lap
    /// validate the raw flag word of this lap and wrap it in a `LapFlags`
    ///
    /// ## Returns
    /// * `LapFlags` - the named flags of the lap
    /// * `InvalidFlagsError` - when bits outside the known layout are set
    pub fn lap_flags(&self) -> CustomResult<LapFlags> {
        LapFlags::from_bits(self.flags).ok_or(Error::InvalidFlagsError {
            lap_number: self.lap_number,
            bits: self.flags & !LapFlags::ALL.bits(),
        })
    }

    /// the gap to the leader in milliseconds, only when the car is on the lead lap
    pub fn interval_ms(&self) -> Option<i64> {
        match (self.interval, self.interval_units) {
            (Some(interval), Some(IntervalUnits::Ms)) => Some(interval),
            _ => None,
        }
    }

    pub fn interval_laps(&self) -> Option<i64> {
        match (self.interval, self.interval_units) {
            (Some(interval), Some(IntervalUnits::Laps)) => Some(interval),
            _ => None,
        }
    }
}

/// Flag word the racing service attaches to every lap.
///
/// Several categories can be set on the same lap.
#[derive(Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[serde(transparent)]
pub struct LapFlags(u32);

impl LapFlags {
    pub const OFF_TRACK: LapFlags = LapFlags(0x0001);
    pub const PITTED: LapFlags = LapFlags(0x0002);
    pub const BLACK_FLAG: LapFlags = LapFlags(0x0004);
    pub const CAR_RESET: LapFlags = LapFlags(0x0008);
    pub const CONTACT: LapFlags = LapFlags(0x0010);
    pub const CAR_CONTACT: LapFlags = LapFlags(0x0020);
    pub const LOST_CONTROL: LapFlags = LapFlags(0x0040);
    pub const DISCONTINUITY: LapFlags = LapFlags(0x0080);
    pub const INTERPOLATED_CROSSING: LapFlags = LapFlags(0x0100);
    pub const CLOCK_SMASH: LapFlags = LapFlags(0x0200);
    pub const TOW: LapFlags = LapFlags(0x0400);
    pub const DRIVER_CHANGE: LapFlags = LapFlags(0x0800);
    pub const OPTIONAL_PATH: LapFlags = LapFlags(0x1000);
    pub const GREEN: LapFlags = LapFlags(0x2000);
    pub const CHECKERED: LapFlags = LapFlags(0x4000);

    pub const ALL: LapFlags = LapFlags(0x7fff);

    const NAMES: [(LapFlags, &'static str); 15] = [
        (LapFlags::OFF_TRACK, "off_track"),
        (LapFlags::PITTED, "pitted"),
        (LapFlags::BLACK_FLAG, "black_flag"),
        (LapFlags::CAR_RESET, "car_reset"),
        (LapFlags::CONTACT, "contact"),
        (LapFlags::CAR_CONTACT, "car_contact"),
        (LapFlags::LOST_CONTROL, "lost_control"),
        (LapFlags::DISCONTINUITY, "discontinuity"),
        (LapFlags::INTERPOLATED_CROSSING, "interpolated_crossing"),
        (LapFlags::CLOCK_SMASH, "clock_smash"),
        (LapFlags::TOW, "tow"),
        (LapFlags::DRIVER_CHANGE, "driver_change"),
        (LapFlags::OPTIONAL_PATH, "optional_path"),
        (LapFlags::GREEN, "green"),
        (LapFlags::CHECKERED, "checkered"),
    ];

    pub const fn empty() -> LapFlags {
        LapFlags(0)
    }

    /// returns `None` when a bit outside the known layout is set
    pub const fn from_bits(bits: u32) -> Option<LapFlags> {
        if bits & !LapFlags::ALL.0 != 0 {
            None
        } else {
            Some(LapFlags(bits))
        }
    }

    pub const fn bits(&self) -> u32 {
        self.0
    }

    pub const fn contains(&self, other: LapFlags) -> bool {
        self.0 & other.0 == other.0
    }

    pub const fn union(self, other: LapFlags) -> LapFlags {
        LapFlags(self.0 | other.0)
    }

    pub fn is_off_track(&self) -> bool {
        self.contains(LapFlags::OFF_TRACK)
    }

    pub fn is_pitted(&self) -> bool {
        self.contains(LapFlags::PITTED)
    }

    pub fn is_black_flag(&self) -> bool {
        self.contains(LapFlags::BLACK_FLAG)
    }

    pub fn is_car_reset(&self) -> bool {
        self.contains(LapFlags::CAR_RESET)
    }

    pub fn is_contact(&self) -> bool {
        self.contains(LapFlags::CONTACT)
    }

    pub fn is_car_contact(&self) -> bool {
        self.contains(LapFlags::CAR_CONTACT)
    }

    pub fn is_lost_control(&self) -> bool {
        self.contains(LapFlags::LOST_CONTROL)
    }

    pub fn is_discontinuity(&self) -> bool {
        self.contains(LapFlags::DISCONTINUITY)
    }

    pub fn is_interpolated_crossing(&self) -> bool {
        self.contains(LapFlags::INTERPOLATED_CROSSING)
    }

    pub fn is_clock_smash(&self) -> bool {
        self.contains(LapFlags::CLOCK_SMASH)
    }

    pub fn is_tow(&self) -> bool {
        self.contains(LapFlags::TOW)
    }

    pub fn is_driver_change(&self) -> bool {
        self.contains(LapFlags::DRIVER_CHANGE)
    }

    pub fn is_optional_path(&self) -> bool {
        self.contains(LapFlags::OPTIONAL_PATH)
    }

    pub fn is_green(&self) -> bool {
        self.contains(LapFlags::GREEN)
    }

    pub fn is_checkered(&self) -> bool {
        self.contains(LapFlags::CHECKERED)
    }
}

impl std::ops::BitOr for LapFlags {
    type Output = LapFlags;

    fn bitor(self, rhs: LapFlags) -> LapFlags {
        self.union(rhs)
    }
}

impl fmt::Debug for LapFlags {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let names: Vec<&str> = LapFlags::NAMES
            .iter()
            .filter(|(flag, _)| self.contains(*flag))
            .map(|(_, name)| *name)
            .collect();

        write!(f, "LapFlags({})", names.join(" | "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lap(flags: u32, interval: Option<i64>, units: Option<IntervalUnits>) -> LapRecord {
        LapRecord {
            subsession_id: 1,
            simsession_number: 0,
            car_number: "7".to_string(),
            cust_id: 10,
            lap_number: 3,
            flags,
            lap_position: 1,
            interval,
            interval_units: units,
            lap_time: Some(90_000),
        }
    }

    #[test]
    fn several_categories_on_one_lap() {
        let flags = LapFlags::from_bits(0x0061).unwrap();
        assert!(flags.is_off_track());
        assert!(flags.is_car_contact());
        assert!(flags.is_lost_control());
        assert!(!flags.is_contact());
        assert!(!flags.is_tow());
    }

    #[test]
    fn unknown_bits_are_rejected() {
        assert!(LapFlags::from_bits(0x8000).is_none());

        match lap(0x8001, None, None).lap_flags() {
            Err(Error::InvalidFlagsError { lap_number, bits }) => {
                assert_eq!(lap_number, 3);
                assert_eq!(bits, 0x8000);
            }
            other => panic!("expected invalid flags, got {:?}", other),
        }
    }

    #[test]
    fn interval_is_split_by_unit() {
        let lead_lap = lap(0, Some(1_250), Some(IntervalUnits::Ms));
        assert_eq!(lead_lap.interval_ms(), Some(1_250));
        assert_eq!(lead_lap.interval_laps(), None);

        let lapped = lap(0, Some(2), Some(IntervalUnits::Laps));
        assert_eq!(lapped.interval_ms(), None);
        assert_eq!(lapped.interval_laps(), Some(2));
    }

    #[test]
    fn debug_lists_flag_names() {
        let flags = LapFlags::PITTED | LapFlags::TOW;
        assert_eq!(format!("{:?}", flags), "LapFlags(pitted | tow)");
    }
}
