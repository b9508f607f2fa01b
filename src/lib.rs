pub mod claims;
pub mod config;
pub mod demo;
pub mod error;
pub mod telemetry;
