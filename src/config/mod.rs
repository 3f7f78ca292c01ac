mod database;
mod settings;

pub use database::{DatabaseParams, DB_HOST, DB_NAME, DB_PASS, DB_USER};
pub use settings::{OtelConfig, ProbeConfig, ServerConfig, Settings};
