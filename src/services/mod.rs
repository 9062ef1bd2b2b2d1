// src/services/mod.rs
pub mod cost;
pub mod dashboard;
pub mod rollup;
pub mod series;
pub mod store;
pub mod upstream;
pub mod window;
