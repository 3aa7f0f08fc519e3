use snafu::Snafu;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum Error {
    #[snafu(display("missing {field} on {row}"))]
    MissingDataError { field: &'static str, row: String },

    #[snafu(display("subsession {subsession_id} is not a scored race"))]
    NotARaceError { subsession_id: i64 },

    #[snafu(display("team race {subsession_id} has no team row for car {car_number}"))]
    InconsistentStateError {
        subsession_id: i64,
        car_number: String,
    },

    #[snafu(display("lap {lap_number} carries unknown flag bits {bits:#06x}"))]
    InvalidFlagsError { lap_number: i32, bits: u32 },

    #[snafu(display("{entity} {id} not found"))]
    NotFoundError { entity: &'static str, id: String },

    #[snafu(display("storage failure: {message}"))]
    StorageError { message: String },

    #[snafu(display("invalid value {value:?} for {key}"))]
    ConfigError { key: &'static str, value: String },
}

pub type CustomResult<T> = Result<T, Error>;
