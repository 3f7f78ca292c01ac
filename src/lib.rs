// Infrastructure
pub mod config;
pub mod error;
pub mod postgres;

// Application layer
pub mod api;
pub mod server;

// Supporting modules
pub mod shutdown;
pub mod telemetry;
