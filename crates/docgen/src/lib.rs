//! Officials development reports.
//!
//! Loads a registration roster export, works out each official's next steps
//! on the certification pathway, writes one report per official, then a
//! combined report and the manifest the mailer sends from.

pub mod config;
pub mod error;
pub mod pathway;
pub mod pipeline;
pub mod report;
pub mod roster;
pub mod telemetry;
