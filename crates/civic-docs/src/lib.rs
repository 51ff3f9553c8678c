//! Core services tracking citizen document requests for a local civic office.

pub mod config;
pub mod error;
pub mod requests;
pub mod telemetry;
