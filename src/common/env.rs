// src/common/env.rs

use dotenvy::dotenv;
use lazy_static::lazy_static;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

const DEFAULT_PORT: u16 = 30721;
const DEFAULT_REPORT_TIMEOUT_SECS: u64 = 10;

// Holds the process-level configuration. The handler rules themselves live
// in the settings file pointed to by `config_path`.
pub struct Config {
    pub stage: String,
    pub log_level: String,
    pub port: u16,
    pub config_path: PathBuf,
    pub api_key: Option<String>,
    pub report_timeout: Duration,
    pub dry_run: bool,
    pub log_dir: Option<PathBuf>,
}

impl Config {
    fn from_env() -> Self {
        dotenv().ok();
        let stage = env::var("STAGE").unwrap_or_else(|_| "production".to_string());
        let log_level = env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
        let port = parse_var("PORT").unwrap_or(DEFAULT_PORT);
        let config_path = env::var("TRIPWIRE_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("tripwire.json"));
        let api_key = env::var("ABUSEIPDB_API_KEY")
            .ok()
            .filter(|key| !key.trim().is_empty());
        let report_timeout = Duration::from_secs(
            parse_var("REPORT_TIMEOUT_SECS").unwrap_or(DEFAULT_REPORT_TIMEOUT_SECS),
        );
        let dry_run = env::var("DRY_RUN")
            .map(|v| matches!(v.to_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(false);
        let log_dir = env::var("LOG_DIR").ok().map(PathBuf::from);
        Config {
            stage,
            log_level,
            port,
            config_path,
            api_key,
            report_timeout,
            dry_run,
            log_dir,
        }
    }
}

fn parse_var<T: std::str::FromStr>(key: &str) -> Option<T> {
    env::var(key).ok().and_then(|v| v.trim().parse().ok())
}

// Use lazy_static to create a globally accessible, read-only CONFIG instance.
lazy_static! {
    pub static ref CONFIG: Config = Config::from_env();
}

pub fn load() {
    let _ = &CONFIG.stage;
}
