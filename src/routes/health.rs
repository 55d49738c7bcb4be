use axum::{response::IntoResponse, Json};
use serde::Serialize;

#[derive(Serialize)]
pub struct HealthResponse {
    pub ok: bool,
}

pub async fn healthz() -> impl IntoResponse {
    Json(HealthResponse { ok: true })
}
