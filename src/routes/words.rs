use axum::extract::{Query, State};
use axum::Json;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Deserialize;

use crate::auth::AuthUser;
use crate::response::AppError;
use crate::services::practice::WordResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct WordQuery {
    #[serde(default)]
    state: Option<String>,
}

/// `state=fetch` (default) resumes the current word or starts one;
/// `state=gen` always abandons the current word and starts a new one.
pub async fn get_word(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<WordQuery>,
) -> Result<Json<WordResponse>, AppError> {
    let mut rng = StdRng::from_rng(&mut rand::rng());
    let practice = state.practice();

    let word = match query.state.as_deref().unwrap_or("fetch") {
        "fetch" => practice.fetch_or_generate(&user.id, &mut rng).await?,
        "gen" => practice.generate_new(&user.id, &mut rng).await?,
        other => {
            return Err(AppError::bad_request(format!(
                "Invalid state parameter '{other}'. Use 'fetch' or 'gen'."
            )))
        }
    };

    Ok(Json(word))
}
