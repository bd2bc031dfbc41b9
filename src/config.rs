use std::{env, fmt::Display, path::PathBuf, str::FromStr};
use tracing::{info, warn};

pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_DATA_PATH: &str = "data/habits.json";

/// Process configuration, read once from the environment at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub port: u16,
    pub data_path: PathBuf,
    /// Whether to run the placeholder-status job at startup and after midnight.
    pub daily_job: bool,
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            port: parse_or("PORT", lookup("PORT"), DEFAULT_PORT),
            data_path: lookup("APP_DATA_PATH")
                .filter(|path| !path.trim().is_empty())
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_PATH)),
            daily_job: parse_or("HABIT_DAILY_JOB", lookup("HABIT_DAILY_JOB"), true),
        }
    }
}

fn parse_or<T>(key: &str, raw: Option<String>, default: T) -> T
where
    T: FromStr + Display,
    T::Err: Display,
{
    let Some(raw) = raw else {
        info!("{key} not set, using default: {default}");
        return default;
    };
    raw.trim().parse().unwrap_or_else(|err| {
        warn!("invalid {key} value {raw:?}: {err}; using default: {default}");
        default
    })
}
