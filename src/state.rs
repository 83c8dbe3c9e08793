use std::sync::Arc;

use tracing::warn;

use crate::auth::jwt::JwtKeys;
use crate::chatbot::{ChatModel, GeminiClient};
use crate::config::AppConfig;
use crate::store::{self, PetStore};

/// Shared per-process state. Built once at startup and read-only afterwards.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub store: Arc<dyn PetStore>,
    pub chat: Arc<dyn ChatModel>,
    pub jwt: JwtKeys,
}

impl AppState {
    pub async fn init(config: Arc<AppConfig>) -> anyhow::Result<Self> {
        let store = store::connect(&config.database).await?;

        if config.gemini.api_key.is_none() {
            warn!("GEMINI_API_KEY not set; the chatbot will answer with its apology message");
        }
        let chat = Arc::new(GeminiClient::new(&config.gemini)?) as Arc<dyn ChatModel>;

        Ok(Self::from_parts(config, store, chat))
    }

    pub fn from_parts(
        config: Arc<AppConfig>,
        store: Arc<dyn PetStore>,
        chat: Arc<dyn ChatModel>,
    ) -> Self {
        let jwt = JwtKeys::new(&config.jwt);
        Self {
            config,
            store,
            chat,
            jwt,
        }
    }
}
