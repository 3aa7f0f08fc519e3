pub mod config;
pub mod race_api;
pub mod source;

pub mod models {
    pub mod lap;
    pub mod points;
    pub mod result;
    pub mod season;
    pub mod subsession;
    pub mod summary;
}

pub mod helpers {
    pub mod finish;
    pub mod lap;
    pub mod narrative;
    pub mod points;
    pub mod position;
    pub mod sof;
    pub mod standings;

    pub mod math;
    pub mod general;
    pub mod logging;
}
