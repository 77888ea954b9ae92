// src/modules/app/root.rs

use crate::common::env::CONFIG;
use crate::core::response;
use axum::response::Response;
use serde_json::json;

// Handles requests to the root endpoint and returns project information.
pub async fn get_root_handler() -> Response {
    let cargo_version = env!("CARGO_PKG_VERSION");

    let response_data = json!({
        "name": "Tripwire",
        "version": cargo_version,
        "stage": CONFIG.stage,
        "dry_run": CONFIG.dry_run,
    });

    response::success(Some(response_data))
}
