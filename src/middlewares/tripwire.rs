// src/middlewares/tripwire.rs

use crate::modules::tripwire::{RequestFacts, Tripwire};
use axum::{
    body::Body,
    extract::{ConnectInfo, State},
    http::Request,
    middleware::Next,
    response::Response,
};
use std::net::SocketAddr;
use std::sync::Arc;

pub async fn handler(
    State(tripwire): State<Arc<Tripwire>>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    req: Request<Body>,
    next: Next,
) -> Response {
    let facts = RequestFacts::from_request(&req, addr);
    tripwire.handle(facts, req, next).await
}
