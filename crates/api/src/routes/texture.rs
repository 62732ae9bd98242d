use axum::extract::State;
use axum::{routing::post, Json, Router};

use crate::error::AppResult;
use crate::generation::{handle_texture_request, TextureRequest, TextureResponse};
use crate::state::AppState;

/// POST /api/texture -- run one texturing job end to end.
async fn texture(
    State(state): State<AppState>,
    Json(request): Json<TextureRequest>,
) -> AppResult<Json<TextureResponse>> {
    let response = handle_texture_request(&state, request).await?;
    Ok(Json(response))
}

/// Mount texture routes (under `/api`).
pub fn router() -> Router<AppState> {
    Router::new().route("/texture", post(texture))
}
