use axum::Json;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct IndexResponse {
    pub message: &'static str,
    pub endpoints: Endpoints,
}

#[derive(Debug, Serialize)]
pub struct Endpoints {
    pub health_check: &'static str,
}

/// `GET /` - static service description.
pub async fn index() -> Json<IndexResponse> {
    Json(IndexResponse {
        message: "Welcome to the News API with DB Check!",
        endpoints: Endpoints {
            health_check: "GET /db-health",
        },
    })
}
