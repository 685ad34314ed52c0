//! Short-selling and pump-and-dump risk scoring for small-cap equities.

pub mod config;
pub mod droppiness;
pub mod error;
pub mod scoring;
pub mod telemetry;
