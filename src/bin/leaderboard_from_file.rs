use std::{env, fs, process};

use log::{error, info};
use race_analytics::errors::{CustomResult, Error};
use race_analytics::modules::config::EngineConfig;
use race_analytics::modules::helpers::logging::setup_logging;
use race_analytics::modules::models::points::LeaderboardEntry;
use race_analytics::modules::race_api::{build_leaderboard, LeaderboardQuery};
use race_analytics::modules::source::MemorySource;

fn read_file(path: &str) -> CustomResult<String> {
    fs::read_to_string(path).map_err(|error| Error::StorageError {
        message: format!("can't read {}: {}", path, error),
    })
}

fn run(
    export_path: &str,
    query_path: &str,
    config: &EngineConfig,
) -> CustomResult<Vec<LeaderboardEntry>> {
    let source = MemorySource::from_json(&read_file(export_path)?)?;
    let query: LeaderboardQuery =
        serde_json::from_str(&read_file(query_path)?).map_err(|error| Error::StorageError {
            message: format!("invalid query {}: {}", query_path, error),
        })?;

    build_leaderboard(&source, config, &query)
}

fn main() {
    let config = match EngineConfig::from_env() {
        Ok(config) => config,
        Err(error) => {
            eprintln!("{}", error);
            process::exit(2);
        }
    };
    if let Err(error) = setup_logging(&config) {
        eprintln!("failed to setup logging: {}", error);
        process::exit(2);
    }

    let args: Vec<String> = env::args().collect();
    if args.len() != 3 {
        let program = args.first().map(String::as_str).unwrap_or("leaderboard_from_file");
        eprintln!("usage: {} <export.json> <query.json>", program);
        process::exit(2);
    }

    match run(&args[1], &args[2], &config) {
        Ok(entries) => {
            info!(target: "leaderboard_from_file", "built {} entries from {}", entries.len(), args[1]);
            match serde_json::to_string_pretty(&entries) {
                Ok(json) => println!("{}", json),
                Err(error) => {
                    error!(target: "leaderboard_from_file", "failed to serialize leaderboard: {}", error);
                    process::exit(1);
                }
            }
        }
        Err(error) => {
            error!(target: "leaderboard_from_file", "failed building leaderboard: {}", error);
            eprintln!("{}", error);
            process::exit(1);
        }
    }
}
