use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use serde::Deserialize;

use crate::auth::AuthUser;
use crate::response::AppError;
use crate::services::practice::ValidationResult;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SentenceInput {
    word: String,
    user_sentence: String,
}

pub async fn validate_sentence(
    State(state): State<AppState>,
    user: AuthUser,
    payload: Result<Json<SentenceInput>, JsonRejection>,
) -> Result<Json<ValidationResult>, AppError> {
    let Json(input) = payload.map_err(|rejection| AppError::validation(rejection.body_text()))?;

    let result = state
        .practice()
        .complete_current(&user.id, &input.word, &input.user_sentence)
        .await?;

    Ok(Json(result))
}
