use axum::extract::State;
use axum::Json;

use crate::auth::AuthUser;
use crate::response::AppError;
use crate::services::dashboard::{compute_summary, SummaryReport};
use crate::state::AppState;

pub async fn get_summary(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<SummaryReport>, AppError> {
    let store = state.store();
    let report = compute_summary(store.as_ref(), &user.id).await?;
    Ok(Json(report))
}
