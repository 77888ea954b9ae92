// src/core/bootstrap.rs

use crate::common::env::CONFIG;
use crate::common::log::{LogLevel, get_log_path, log};
use crate::modules::tripwire::Tripwire;
use crate::modules::tripwire::config::Settings;
use crate::modules::tripwire::error::ConfigError;
use chrono::Local;
use std::sync::Arc;

pub fn init() {
    let cargo_version = env!("CARGO_PKG_VERSION");
    let timestamp = Local::now().format("%Y-%m-%d %H:%M:%S");

    println!();
    const MAGENTA: &str = "\x1b[35m";
    const RESET: &str = "\x1b[0m";

    println!("  {}{}{}{}", MAGENTA, "▲ Tripwire ", cargo_version, RESET);
    println!("  - Timestamp: {}", timestamp);
    println!("  - Environment:");
    println!("    ✓ stage {}", CONFIG.stage);
    println!("    ✓ settings {}", CONFIG.config_path.display());
    if let Some(path) = get_log_path() {
        println!("    ✓ logs {}", path.display());
    }
    if CONFIG.dry_run {
        println!("    ✓ dry run, reports are logged only");
    }
    println!();

    log(LogLevel::Info, "✓ Starting...");
}

// Loads and validates the handler settings. Any error here means the
// middleware must not be mounted.
pub fn build_tripwire() -> Result<Arc<Tripwire>, ConfigError> {
    let settings =
        Settings::load(&CONFIG.config_path)?.with_fallback_api_key(CONFIG.api_key.as_deref());
    let tripwire = Tripwire::from_settings(&settings, CONFIG.report_timeout, CONFIG.dry_run)?;

    for (kind, e) in tripwire.messages().check() {
        log(
            LogLevel::Warn,
            &format!("▲ {:?} template is broken, default text will be used: {}", kind, e),
        );
    }

    log(
        LogLevel::Info,
        &format!("✓ Guarding paths matching {}", settings.banned_pattern),
    );
    if !settings.whitelist_pattern.is_empty() {
        log(
            LogLevel::Info,
            &format!("✓ Whitelisted callers matching {}", settings.whitelist_pattern),
        );
    }
    Ok(Arc::new(tripwire))
}
