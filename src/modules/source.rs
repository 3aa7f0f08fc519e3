use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::errors::{CustomResult, Error};
use crate::modules::models::lap::LapRecord;
use crate::modules::models::points::ChampPointsRow;
use crate::modules::models::result::{ResultFilter, ResultRow};
use crate::modules::models::season::SeasonDates;
use crate::modules::models::subsession::SubsessionMeta;

/// Read access to the persisted race data. Every call returns an owned copy so
/// computations never share mutable state.
pub trait RaceDataSource: Sync {
    /// laps of a subsession, limited to one simsession when given
    fn lap_records(
        &self,
        subsession_id: i64,
        simsession_number: Option<i32>,
    ) -> CustomResult<Vec<LapRecord>>;

    fn result_rows(&self, subsession_id: i64, filter: &ResultFilter)
        -> CustomResult<Vec<ResultRow>>;

    /// `NotFoundError` when the subsession is unknown
    fn subsession_meta(&self, subsession_id: i64) -> CustomResult<SubsessionMeta>;

    fn season_date_ranges(&self) -> CustomResult<Vec<SeasonDates>>;

    /// championship points rows of a member, optionally limited to one season
    fn champ_points_rows(
        &self,
        cust_id: i64,
        season_year: Option<i32>,
        season_quarter: Option<i32>,
    ) -> CustomResult<Vec<ChampPointsRow>>;
}

/// Championship points rows of one member in an export.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct MemberChampPoints {
    pub cust_id: i64,
    pub rows: Vec<ChampPointsRow>,
}

/// A dump of persisted race data, as written by the storage exporter.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct RaceDataExport {
    pub subsessions: Vec<SubsessionMeta>,
    pub laps: Vec<LapRecord>,
    pub results: Vec<ResultRow>,
    pub champ_points: Vec<MemberChampPoints>,
    pub seasons: Vec<SeasonDates>,
}

/// A data source over rows held in memory, used to replay exported data.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    subsessions: HashMap<i64, SubsessionMeta>,
    laps: HashMap<i64, Vec<LapRecord>>,
    results: HashMap<i64, Vec<ResultRow>>,
    champ_points: HashMap<i64, Vec<ChampPointsRow>>,
    seasons: Vec<SeasonDates>,
}

impl MemorySource {
    pub fn new() -> MemorySource {
        MemorySource::default()
    }

    pub fn add_subsession(&mut self, meta: SubsessionMeta) {
        self.subsessions.insert(meta.subsession_id, meta);
    }

    pub fn add_laps(&mut self, laps: Vec<LapRecord>) {
        for lap in laps {
            self.laps.entry(lap.subsession_id).or_default().push(lap);
        }
    }

    pub fn add_results(&mut self, rows: Vec<ResultRow>) {
        for row in rows {
            self.results.entry(row.subsession_id).or_default().push(row);
        }
    }

    pub fn add_champ_points(&mut self, cust_id: i64, rows: Vec<ChampPointsRow>) {
        self.champ_points.entry(cust_id).or_default().extend(rows);
    }

    pub fn add_season(&mut self, season: SeasonDates) {
        self.seasons.push(season);
    }

    pub fn from_export(export: RaceDataExport) -> MemorySource {
        let mut source = MemorySource::new();
        for meta in export.subsessions {
            source.add_subsession(meta);
        }
        source.add_laps(export.laps);
        source.add_results(export.results);
        for member in export.champ_points {
            source.add_champ_points(member.cust_id, member.rows);
        }
        for season in export.seasons {
            source.add_season(season);
        }

        source
    }

    /// # load an export
    /// read a json export of the race data into memory
    ///
    /// ## Arguments
    /// * `json` - the export
    ///
    /// ## Returns
    /// * `MemorySource` - a data source over the export
    /// * `StorageError` - when the export is not valid json of the expected shape
    pub fn from_json(json: &str) -> CustomResult<MemorySource> {
        let export: RaceDataExport =
            serde_json::from_str(json).map_err(|error| Error::StorageError {
                message: format!("invalid export: {}", error),
            })?;

        Ok(MemorySource::from_export(export))
    }
}

impl RaceDataSource for MemorySource {
    fn lap_records(
        &self,
        subsession_id: i64,
        simsession_number: Option<i32>,
    ) -> CustomResult<Vec<LapRecord>> {
        let laps = match self.laps.get(&subsession_id) {
            Some(laps) => laps,
            None => return Ok(Vec::new()),
        };

        Ok(laps
            .iter()
            .filter(|lap| simsession_number.map_or(true, |n| lap.simsession_number == n))
            .cloned()
            .collect())
    }

    fn result_rows(
        &self,
        subsession_id: i64,
        filter: &ResultFilter,
    ) -> CustomResult<Vec<ResultRow>> {
        let rows = match self.results.get(&subsession_id) {
            Some(rows) => rows,
            None => return Ok(Vec::new()),
        };

        Ok(rows.iter().filter(|row| filter.matches(row)).cloned().collect())
    }

    fn subsession_meta(&self, subsession_id: i64) -> CustomResult<SubsessionMeta> {
        self.subsessions
            .get(&subsession_id)
            .cloned()
            .ok_or_else(|| Error::NotFoundError {
                entity: "subsession",
                id: subsession_id.to_string(),
            })
    }

    fn season_date_ranges(&self) -> CustomResult<Vec<SeasonDates>> {
        Ok(self.seasons.clone())
    }

    fn champ_points_rows(
        &self,
        cust_id: i64,
        season_year: Option<i32>,
        season_quarter: Option<i32>,
    ) -> CustomResult<Vec<ChampPointsRow>> {
        let rows = match self.champ_points.get(&cust_id) {
            Some(rows) => rows,
            None => return Ok(Vec::new()),
        };

        Ok(rows
            .iter()
            .filter(|row| season_year.map_or(true, |y| row.season_year == y))
            .filter(|row| season_quarter.map_or(true, |q| row.season_quarter == q))
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::models::subsession::EventType;
    use chrono::{TimeZone, Utc};

    fn points_row(season_year: i32, season_quarter: i32) -> ChampPointsRow {
        ChampPointsRow {
            subsession_id: 3,
            series_id: 1,
            season_year,
            season_quarter,
            start_time: Utc.with_ymd_and_hms(2023, 1, 1, 0, 0, 0).unwrap(),
            race_week_num: 0,
            official: true,
            champ_points: Some(10),
        }
    }

    #[test]
    fn unknown_subsession_is_not_found() {
        let mut source = MemorySource::new();
        source.add_subsession(SubsessionMeta {
            subsession_id: 8,
            season_year: 2023,
            season_quarter: 1,
            series_id: 1,
            track_name: "Road Atlanta".to_string(),
            max_team_drivers: 1,
            event_laps_complete: 10,
            license_category_id: 2,
            hosted: false,
            event_type: EventType::Race,
        });

        assert!(source.subsession_meta(8).is_ok());
        assert!(matches!(
            source.subsession_meta(9),
            Err(Error::NotFoundError { entity: "subsession", .. })
        ));
        assert!(source.lap_records(9, None).unwrap().is_empty());
    }

    #[test]
    fn champ_points_are_limited_to_the_season() {
        let mut source = MemorySource::new();
        source.add_champ_points(
            4,
            vec![points_row(2023, 1), points_row(2023, 2), points_row(2022, 1)],
        );

        assert_eq!(source.champ_points_rows(4, None, None).unwrap().len(), 3);
        assert_eq!(source.champ_points_rows(4, Some(2023), None).unwrap().len(), 2);
        assert_eq!(source.champ_points_rows(4, Some(2023), Some(2)).unwrap().len(), 1);
        assert!(source.champ_points_rows(5, None, None).unwrap().is_empty());
    }

    #[test]
    fn exports_load_from_json() {
        let json = r#"{
            "champ_points": [{"cust_id": 4, "rows": [{
                "subsession_id": 3, "series_id": 1, "season_year": 2023, "season_quarter": 1,
                "start_time": "2023-01-01T00:00:00Z", "race_week_num": 0,
                "official": true, "champ_points": 10
            }]}],
            "seasons": [{
                "year": 2023, "quarter": 1,
                "start": "2022-12-13T00:00:00Z", "end": "2023-03-07T00:00:00Z"
            }]
        }"#;

        let source = MemorySource::from_json(json).unwrap();
        assert_eq!(source.champ_points_rows(4, None, None).unwrap(), vec![points_row(2023, 1)]);
        assert_eq!(source.season_date_ranges().unwrap().len(), 1);
        assert!(source.subsession_meta(3).is_err());

        assert!(matches!(
            MemorySource::from_json("{\"seasons\": 4}"),
            Err(Error::StorageError { .. })
        ));
    }
}
