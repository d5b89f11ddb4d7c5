pub mod config;
pub mod data;
pub mod evaluate;
pub mod output;
pub mod scoring;
pub mod telemetry;
