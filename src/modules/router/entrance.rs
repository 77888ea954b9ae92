// src/modules/router/entrance.rs

use crate::core::response;
use crate::middlewares;
use crate::modules::app;
use crate::modules::tripwire::Tripwire;
use axum::{Router, response::Response, routing::get};
use std::sync::Arc;

pub fn app_router(tripwire: Arc<Tripwire>) -> Router {
    let router = Router::new()
        .route("/", get(app::root::get_root_handler))
        .fallback(handler_404);
    middlewares::middleware::stack(router, tripwire)
}

async fn handler_404() -> Response {
    response::not_found()
}
