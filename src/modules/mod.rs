// src/modules/mod.rs

pub mod app;
pub mod axum;
pub mod router;
pub mod tripwire;
