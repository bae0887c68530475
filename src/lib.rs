pub mod config;
pub mod error;
pub mod routes;
pub mod server;
pub mod submission;
pub mod telemetry;
pub mod upload;
