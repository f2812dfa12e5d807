use crate::storage::resolve_data_path;
use std::{env, path::PathBuf};

pub const DEFAULT_PORT: u16 = 8080;

/// Process configuration, read from the environment once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub data_path: PathBuf,
    pub seed_example: bool,
    pub upstream_url: Option<String>,
}

impl Config {
    pub fn from_env() -> Result<Self, std::io::Error> {
        let port = env::var("PORT")
            .ok()
            .and_then(|value| value.parse::<u16>().ok())
            .unwrap_or(DEFAULT_PORT);

        let seed_example = env::var("APP_SEED_EXAMPLE")
            .map(|value| flag_enabled(&value))
            .unwrap_or(false);

        let upstream_url = env::var("APP_UPSTREAM_URL")
            .ok()
            .map(|value| value.trim().trim_end_matches('/').to_string())
            .filter(|value| !value.is_empty());

        Ok(Self {
            port,
            data_path: resolve_data_path()?,
            seed_example,
            upstream_url,
        })
    }
}

fn flag_enabled(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}
