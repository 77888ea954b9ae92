// src/main.rs

mod common;
mod core;
mod middlewares;
mod modules;

use common::log::{self, LogLevel};
use std::process;

#[tokio::main]
async fn main() {
    common::env::load();
    common::log::init();
    core::bootstrap::init();

    let tripwire = match core::bootstrap::build_tripwire() {
        Ok(tripwire) => tripwire,
        Err(e) => {
            log::log(LogLevel::Error, &format!("✗ Refusing to start: {}", e));
            process::exit(1);
        }
    };

    modules::axum::core::start(tripwire).await;
}
