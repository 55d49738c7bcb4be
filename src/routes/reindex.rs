use axum::{extract::State, response::IntoResponse, Json};
use serde::Serialize;
use tracing::instrument;

use crate::errors::AppError;
use crate::services::AppState;

#[derive(Serialize)]
pub struct ReindexResponse {
    pub status: String,
    pub message: String,
}

/// Force a full rebuild from the source document and swap it in.
/// On failure the previous snapshot keeps serving.
#[instrument(skip(state))]
pub async fn reindex(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let built = state
        .index_service
        .build(&state.pdf_path, &state.index_dir)
        .await?;
    state.install(built).await;

    Ok(Json(ReindexResponse {
        status: "ok".to_string(),
        message: "Index rebuilt.".to_string(),
    }))
}
