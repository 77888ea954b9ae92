// src/modules/axum/core.rs

use crate::common::env::CONFIG;
use crate::common::log;
use crate::modules::router::entrance::app_router;
use crate::modules::tripwire::Tripwire;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;

// Starts the Axum web server with the tripwire in front of every route.
pub async fn start(tripwire: Arc<Tripwire>) {
    let app = app_router(tripwire);
    let port = CONFIG.port;
    let addr = format!("0.0.0.0:{}", port);

    let listener = match TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(e) => {
            log::log(
                log::LogLevel::Error,
                &format!("✗ Failed to bind to address {}: {}", addr, e),
            );
            return;
        }
    };

    log::log(
        log::LogLevel::Info,
        &format!("✓ Listening on http://localhost:{}", port),
    );
    log::log(log::LogLevel::Info, "✓ Ready to handle requests");

    // The peer address is what gets reported, so it must reach the middleware.
    let service = app.into_make_service_with_connect_info::<SocketAddr>();
    if let Err(e) = axum::serve(listener, service).await {
        log::log(
            log::LogLevel::Error,
            &format!("✗ Axum server error: {}", e),
        );
    }
}
