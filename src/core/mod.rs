// src/core/mod.rs

pub mod bootstrap;
pub mod response;
