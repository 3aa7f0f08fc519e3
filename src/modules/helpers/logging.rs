use fern::Dispatch;
use log::LevelFilter;

use crate::modules::config::EngineConfig;

/// level filter for a configured level name, `None` for unknown names
pub fn level_filter(level: &str) -> Option<LevelFilter> {
    match level.trim().to_uppercase().as_str() {
        "OFF" => Some(LevelFilter::Off),
        "ERROR" => Some(LevelFilter::Error),
        "WARN" => Some(LevelFilter::Warn),
        "INFO" => Some(LevelFilter::Info),
        "DEBUG" => Some(LevelFilter::Debug),
        "TRACE" => Some(LevelFilter::Trace),
        _ => None,
    }
}

/// # set up logging
/// send every log record of the configured level and up to the configured log file.
/// can only be applied once per process.
///
/// ## Arguments
/// * `config` - the engine config with the level and file to log to
///
/// ## Returns
/// * `fern::InitError` - when the log file can't be opened or a logger is already set
pub fn setup_logging(config: &EngineConfig) -> Result<(), fern::InitError> {
    // loaded configs carry a known level, hand-built ones may not
    let level = level_filter(&config.logging_level).unwrap_or(LevelFilter::Info);
    let base_config = Dispatch::new().level(level);

    let file_logger_config = Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "{} [{}][{}] {}",
                chrono::Local::now().format("[%Y-%m-%d][%H:%M:%S]"),
                record.target(),
                record.level(),
                message
            ))
        })
        .chain(fern::log_file(&config.log_file)?);

    base_config.chain(file_logger_config).apply()?;

    Ok(())
}
