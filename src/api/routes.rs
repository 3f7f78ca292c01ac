use axum::{routing::get, Router};

use crate::server::AppState;

use super::health::db_health;
use super::index::index;

pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(index))
        .route("/db-health", get(db_health))
}
