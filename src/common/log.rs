// src/common/log.rs

use crate::common::env;
use chrono::Local;
use lazy_static::lazy_static;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::sync::Mutex;
use std::thread;
use std::time::{Duration, Instant};
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

const FLUSH_THRESHOLD: usize = 10;
const FLUSH_INTERVAL: Duration = Duration::from_secs(10);

// --- Global State for Console Logging ---
lazy_static! {
    static ref LAST_LOG_TIME: Mutex<Option<Instant>> = Mutex::new(None);
    static ref LOG_SENDER: Mutex<Option<mpsc::Sender<String>>> = Mutex::new(None);
    static ref LOG_PATH: Mutex<Option<PathBuf>> = Mutex::new(None);
    static ref CONFIGURED_LOG_LEVEL: LogLevel = LogLevel::from_str(&env::CONFIG.log_level);
}

#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub enum LogLevel {
    Error = 3,
    Warn = 2,
    Info = 1,
    Debug = 0,
}

impl LogLevel {
    fn from_str(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "error" => LogLevel::Error,
            "warn" => LogLevel::Warn,
            "info" => LogLevel::Info,
            "debug" => LogLevel::Debug,
            _ => LogLevel::Info, // Default to Info if the value is invalid.
        }
    }
}

// Initializes both console and file logging systems.
pub fn init() {
    if let Ok(mut last) = LAST_LOG_TIME.lock() {
        *last = Some(Instant::now());
    }
    start_file_logger();
}

// Path of the current log file, if file logging could be set up.
pub fn get_log_path() -> Option<PathBuf> {
    LOG_PATH.lock().ok().and_then(|path| path.clone())
}

// Logs a formatted message to the console and a clean version to the file.
pub fn log(level: LogLevel, content: &str) {
    if (level as u8) < (*CONFIGURED_LOG_LEVEL as u8) {
        return;
    }

    // --- Console Logging ---
    let now = Instant::now();
    let time_diff_str = match LAST_LOG_TIME.lock() {
        Ok(mut last_time) => {
            let diff = (*last_time)
                .map(|prev| format_duration(now.duration_since(prev)))
                .unwrap_or_else(|| "0us".to_string());
            *last_time = Some(now);
            diff
        }
        Err(_) => "0us".to_string(),
    };

    let mut stdout = StandardStream::stdout(ColorChoice::Always);
    let time_str = Local::now().format("%H:%M:%S");

    let timestamp_color = match level {
        LogLevel::Info => Color::White,
        LogLevel::Debug => Color::Magenta,
        LogLevel::Warn => Color::Yellow,
        LogLevel::Error => Color::Red,
    };
    let diff_color = match level {
        LogLevel::Debug => Color::Blue,
        _ => Color::Yellow,
    };

    let _ = stdout.set_color(ColorSpec::new().set_fg(Some(timestamp_color)));
    let _ = write!(&mut stdout, "{} ", time_str);
    let _ = stdout.reset();
    let _ = write!(&mut stdout, "{} ", content);
    let _ = stdout.set_color(ColorSpec::new().set_fg(Some(diff_color)));
    let _ = writeln!(&mut stdout, "+{}\x1b[0m", time_diff_str);
    let _ = stdout.reset();

    // --- File Logging ---
    log_to_file(format!("{} {} +{}", time_str, content, time_diff_str));
}

// --- Internal Implementation ---

fn log_to_file(message: String) {
    if let Ok(sender) = LOG_SENDER.lock() {
        if let Some(sender) = &*sender {
            let _ = sender.send(message);
        }
    }
}

// Spawns the background thread responsible for writing logs to a file.
// Console logging keeps working if the log directory can't be created.
fn start_file_logger() {
    let log_path = match create_log_path() {
        Ok(path) => path,
        Err(e) => {
            log(LogLevel::Warn, &format!("▲ File logging disabled: {}", e));
            return;
        }
    };

    let (tx, rx) = mpsc::channel::<String>();
    if let Ok(mut sender) = LOG_SENDER.lock() {
        *sender = Some(tx);
    }
    if let Ok(mut path) = LOG_PATH.lock() {
        *path = Some(log_path.clone());
    }

    thread::spawn(move || {
        let mut buffer: Vec<String> = Vec::with_capacity(FLUSH_THRESHOLD);

        loop {
            match rx.recv_timeout(FLUSH_INTERVAL) {
                Ok(log_entry) => {
                    buffer.push(log_entry);
                    if buffer.len() >= FLUSH_THRESHOLD {
                        flush_buffer_to_file(&log_path, &mut buffer);
                    }
                }
                Err(mpsc::RecvTimeoutError::Timeout) => {
                    flush_buffer_to_file(&log_path, &mut buffer);
                }
                Err(mpsc::RecvTimeoutError::Disconnected) => {
                    flush_buffer_to_file(&log_path, &mut buffer);
                    break;
                }
            }
        }
    });
}

fn flush_buffer_to_file(path: &Path, buffer: &mut Vec<String>) {
    if buffer.is_empty() {
        return;
    }
    if let Ok(mut file) = fs::OpenOptions::new().create(true).append(true).open(path) {
        let _ = file.write_all(buffer.join("\n").as_bytes());
        let _ = file.write_all(b"\n");
    }
    buffer.clear();
}

// LOG_DIR wins over the default `~/.tripwire/logs`.
fn create_log_path() -> io::Result<PathBuf> {
    let root = match &env::CONFIG.log_dir {
        Some(dir) => dir.clone(),
        None => dirs::home_dir()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "Home directory not found"))?
            .join(".tripwire/logs"),
    };
    let now = Local::now();
    let dir = root.join(now.format("%Y-%m-%d").to_string());

    fs::create_dir_all(&dir)?;

    let file_name = now.format("%H-%M-%S.log").to_string();
    Ok(dir.join(file_name))
}

fn format_duration(duration: Duration) -> String {
    let micros = duration.as_micros();
    if micros < 1_000 {
        format!("{}us", micros)
    } else if micros < 1_000_000 {
        format!("{}ms", micros / 1_000)
    } else if micros < 60_000_000 {
        format!("{}s", micros / 1_000_000)
    } else if micros < 3_600_000_000 {
        format!("{:.2}m", micros as f64 / 60_000_000.0)
    } else if micros < 86_400_000_000 {
        format!("{:.2}h", micros as f64 / 3_600_000_000.0)
    } else {
        format!("{:.2}d", micros as f64 / 86_400_000_000.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_levels_case_insensitively() {
        assert_eq!(LogLevel::from_str("WARN"), LogLevel::Warn);
        assert_eq!(LogLevel::from_str("debug"), LogLevel::Debug);
        assert_eq!(LogLevel::from_str("verbose"), LogLevel::Info);
    }

    #[test]
    fn formats_durations_by_magnitude() {
        assert_eq!(format_duration(Duration::from_micros(12)), "12us");
        assert_eq!(format_duration(Duration::from_millis(250)), "250ms");
        assert_eq!(format_duration(Duration::from_secs(7)), "7s");
        assert_eq!(format_duration(Duration::from_secs(90)), "1.50m");
    }
}
