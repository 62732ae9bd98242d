//! Route modules and the API route tree.

use axum::Router;

use crate::state::AppState;

pub mod health;
pub mod texture;

/// All routes mounted under `/api`.
pub fn api_routes() -> Router<AppState> {
    Router::new().merge(texture::router())
}
