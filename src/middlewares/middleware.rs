// src/middlewares/middleware.rs

use crate::middlewares::tripwire;
use crate::modules::tripwire::Tripwire;
use axum::{Router, middleware};
use std::sync::Arc;

// Applies the global middleware stack to a router.
// Request flow: Tripwire(forbid + report | pass) -> Router
pub fn stack(router: Router, guard: Arc<Tripwire>) -> Router {
    router.layer(middleware::from_fn_with_state(guard, tripwire::handler))
}
