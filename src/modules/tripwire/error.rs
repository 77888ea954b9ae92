// src/modules/tripwire/error.rs

use reqwest::StatusCode;
use std::path::PathBuf;
use thiserror::Error;

// Raised while building a handler. Any of these keeps the handler from activating.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("can't read settings file {path:?}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid settings: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("missing API key for AbuseIPDB; set `api_key` or ABUSEIPDB_API_KEY")]
    MissingApiKey,

    #[error("missing banned pattern; set `banned_pattern`")]
    MissingBannedPattern,

    #[error("`{field}` is not a valid regular expression: {source}")]
    InvalidPattern {
        field: &'static str,
        source: regex::Error,
    },

    #[error("can't build report client: {0}")]
    HttpClient(#[from] reqwest::Error),
}

#[derive(Error, Debug)]
pub enum TemplateError {
    #[error("template parse error: {0}")]
    Parse(String),

    #[error("template render error: {0}")]
    Render(String),
}

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("send report error: {0}")]
    Send(String),

    #[error("status code '{0}'; body = {1:?}")]
    Rejected(StatusCode, String),
}
