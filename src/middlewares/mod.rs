// src/middlewares/mod.rs

pub mod middleware;
pub mod tripwire;
