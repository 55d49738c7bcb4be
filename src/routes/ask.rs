use axum::{extract::State, response::IntoResponse, Json};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::errors::AppError;
use crate::services::AppState;

#[derive(Debug, Deserialize)]
pub struct AskRequest {
    pub question: Option<String>,
}

#[derive(Serialize)]
pub struct AskResponse {
    pub answer: String,
}

#[instrument(skip(state))]
pub async fn ask(
    State(state): State<AppState>,
    Json(payload): Json<AskRequest>,
) -> Result<impl IntoResponse, AppError> {
    let question = payload.question.unwrap_or_default().trim().to_string();
    if question.is_empty() {
        return Err(AppError::ValidationError("Question is required".to_string()));
    }

    // Missing snapshot is reported distinctly from failures during search
    let snapshot = state.snapshot().await.ok_or(AppError::IndexNotReady)?;

    let hits = state.retrieval_service.retrieve(&question, &snapshot, None).await?;
    let answer = state.answer_service.generate(&question, &hits).await?;

    Ok(Json(AskResponse { answer }))
}
