pub mod config;
pub mod dashboard;
pub mod dispatch;
pub mod error;
pub mod reference;
pub mod telemetry;
