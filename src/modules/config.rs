use std::env;
use std::str::FromStr;

use dotenvy::dotenv;
use serde::{Deserialize, Serialize};

use crate::errors::{CustomResult, Error};
use crate::modules::helpers::finish::CLOSE_FINISH_THRESHOLD_MS;
use crate::modules::helpers::logging::level_filter;

/// A series that is always counted towards the umbrella championship, except in
/// one season.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct LegacySeriesRule {
    pub series_id: i32,
    pub excluded_season: Option<(i32, i32)>,
}

impl LegacySeriesRule {
    pub fn applies_to(&self, season_year: i32, season_quarter: i32) -> bool {
        self.excluded_season != Some((season_year, season_quarter))
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct EngineConfig {
    pub logging_level: String,
    pub log_file: String,
    pub close_finish_threshold_ms: i64,
    /// the amount of best weeks that count towards a total
    pub drop_weeks_kept: usize,
    pub season_weeks: u32,
    /// place races in a week by their start time instead of the week the service reports
    pub adjust_race_weeks: bool,
    pub umbrella_series_id: Option<i32>,
    pub legacy_series: Option<LegacySeriesRule>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            logging_level: "INFO".to_string(),
            log_file: "program.log".to_string(),
            close_finish_threshold_ms: CLOSE_FINISH_THRESHOLD_MS,
            drop_weeks_kept: 6,
            season_weeks: 12,
            adjust_race_weeks: false,
            umbrella_series_id: None,
            legacy_series: None,
        }
    }
}

impl EngineConfig {
    /// # load the config from the environment
    /// read the config from environment variables, a `.env` file is loaded first
    /// when present. unset variables keep their default.
    ///
    /// ## Returns
    /// * `EngineConfig` - the loaded config
    /// * `ConfigError` - when a variable is set to a value that does not parse
    pub fn from_env() -> CustomResult<EngineConfig> {
        dotenv().ok();
        let defaults = EngineConfig::default();

        let legacy_series = match env_value::<i32>("LEGACY_SERIES_ID")? {
            Some(series_id) => Some(LegacySeriesRule {
                series_id,
                excluded_season: match env::var("LEGACY_EXCLUDED_SEASON") {
                    Ok(value) => Some(parse_season(&value)?),
                    Err(_) => None,
                },
            }),
            None => None,
        };

        let logging_level = match env::var("LOGGING_LEVEL") {
            Ok(level) => parse_level(&level)?,
            Err(_) => defaults.logging_level,
        };

        Ok(EngineConfig {
            logging_level,
            log_file: env::var("LOG_FILE").unwrap_or(defaults.log_file),
            close_finish_threshold_ms: env_value("CLOSE_FINISH_THRESHOLD_MS")?
                .unwrap_or(defaults.close_finish_threshold_ms),
            drop_weeks_kept: env_value("DROP_WEEKS_KEPT")?.unwrap_or(defaults.drop_weeks_kept),
            season_weeks: env_value("SEASON_WEEKS")?.unwrap_or(defaults.season_weeks),
            adjust_race_weeks: env_value("ADJUST_RACE_WEEKS")?
                .unwrap_or(defaults.adjust_race_weeks),
            umbrella_series_id: env_value("UMBRELLA_SERIES_ID")?,
            legacy_series,
        })
    }

    pub fn from_json(json: &str) -> CustomResult<EngineConfig> {
        let mut config: EngineConfig =
            serde_json::from_str(json).map_err(|error| Error::ConfigError {
                key: "json",
                value: error.to_string(),
            })?;
        config.logging_level = parse_level(&config.logging_level)?;

        Ok(config)
    }

    pub fn is_umbrella(&self, series_id: i32) -> bool {
        self.umbrella_series_id == Some(series_id)
    }
}

fn env_value<T: FromStr>(key: &'static str) -> CustomResult<Option<T>> {
    match env::var(key) {
        Ok(value) => match value.trim().parse::<T>() {
            Ok(parsed) => Ok(Some(parsed)),
            Err(_) => Err(Error::ConfigError { key, value }),
        },
        Err(_) => Ok(None),
    }
}

/// normalizes a level name to upper case, `ConfigError` when the name is unknown
fn parse_level(value: &str) -> CustomResult<String> {
    match level_filter(value) {
        Some(_) => Ok(value.trim().to_uppercase()),
        None => Err(Error::ConfigError {
            key: "LOGGING_LEVEL",
            value: value.to_string(),
        }),
    }
}

/// parses `YEAR-QUARTER`, e.g. `2022-3`
fn parse_season(value: &str) -> CustomResult<(i32, i32)> {
    let invalid = || Error::ConfigError {
        key: "LEGACY_EXCLUDED_SEASON",
        value: value.to_string(),
    };

    let (year, quarter) = value.trim().split_once('-').ok_or_else(invalid)?;
    let year = year.parse::<i32>().map_err(|_| invalid())?;
    let quarter = quarter.parse::<i32>().map_err(|_| invalid())?;
    if !(1..=4).contains(&quarter) {
        return Err(invalid());
    }

    Ok((year, quarter))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn season_values_parse() {
        assert_eq!(parse_season("2022-3").unwrap(), (2022, 3));
        assert!(parse_season("2022").is_err());
        assert!(parse_season("2022-5").is_err());
        assert!(parse_season("twenty-1").is_err());
    }

    #[test]
    fn legacy_rule_skips_only_the_excluded_season() {
        let rule = LegacySeriesRule {
            series_id: 231,
            excluded_season: Some((2022, 3)),
        };
        assert!(rule.applies_to(2022, 2));
        assert!(!rule.applies_to(2022, 3));
        assert!(rule.applies_to(2023, 3));
    }

    #[test]
    fn json_fills_missing_fields_with_defaults() {
        let config = EngineConfig::from_json(r#"{"drop_weeks_kept": 8, "umbrella_series_id": 9}"#)
            .unwrap();
        assert_eq!(config.drop_weeks_kept, 8);
        assert_eq!(config.season_weeks, 12);
        assert_eq!(config.close_finish_threshold_ms, 3000);
        assert!(config.is_umbrella(9));
        assert!(!config.is_umbrella(10));

        assert!(EngineConfig::from_json("{").is_err());
    }

    #[test]
    fn level_names_are_checked() {
        assert_eq!(parse_level("warn").unwrap(), "WARN");
        assert_eq!(parse_level(" Trace ").unwrap(), "TRACE");
        assert!(matches!(
            parse_level("verbose"),
            Err(Error::ConfigError { key: "LOGGING_LEVEL", .. })
        ));

        let config = EngineConfig::from_json(r#"{"logging_level": "debug"}"#).unwrap();
        assert_eq!(config.logging_level, "DEBUG");
        assert!(EngineConfig::from_json(r#"{"logging_level": "loud"}"#).is_err());
    }
}
