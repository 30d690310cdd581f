pub mod access;
pub mod config;
pub mod error;
pub mod listings;
pub mod store;
pub mod telemetry;
