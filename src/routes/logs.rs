use axum::extract::State;
use axum::Json;
use chrono::Utc;

use crate::auth::AuthUser;
use crate::response::AppError;
use crate::services::history::{today_logs, TodayLogItem};
use crate::state::AppState;

pub async fn get_today_logs(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<Vec<TodayLogItem>>, AppError> {
    let store = state.store();
    let items = today_logs(store.as_ref(), &user.id, Utc::now()).await?;
    Ok(Json(items))
}
