mod client;
mod extract;
pub mod handlers;

use crate::state::AppState;
use axum::Router;

pub use client::{ChatModel, GeminiClient};

pub fn router() -> Router<AppState> {
    handlers::chatbot_routes()
}
