//! API layer - HTTP endpoint handlers.

mod health;
mod index;
mod routes;

pub use health::{db_health, DbHealthResponse};
pub use index::{index, Endpoints, IndexResponse};
pub use routes::api_routes;
