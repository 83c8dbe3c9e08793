use axum::{extract::State, routing::post, Json, Router};
use serde::{Deserialize, Serialize};
use tracing::{error, instrument};

use super::{client::ChatModel, extract::text_or_raw};
use crate::{
    error::{ApiError, ApiResult},
    extract::{lenient_string, ApiJson},
    state::AppState,
};

const PERSONA: &str = "Eres un asistente amable y servicial para una aplicación de búsqueda y registro de mascotas perdidas.
Tu función es:
1. Ayudar a los usuarios a encontrar sus mascotas perdidas.
2. Responder preguntas sobre el uso de la aplicación.
3. Mantener un tono empático y positivo.";

pub const APOLOGY: &str = "Lo siento, tuve un problema para conectarme con mi cerebro de IA. Por favor, inténtalo de nuevo más tarde.";

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    #[serde(default, deserialize_with = "lenient_string")]
    pub mensaje: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub respuesta: String,
}

pub fn chatbot_routes() -> Router<AppState> {
    Router::new().route("/chatbot", post(chatbot))
}

fn prompt_for(message: &str) -> String {
    format!("{PERSONA}\n\nUsuario: {message}")
}

/// Never fails: a failed call turns into the apology string.
pub async fn reply(model: &dyn ChatModel, message: &str) -> String {
    match model.generate(&prompt_for(message)).await {
        Ok(envelope) => text_or_raw(&envelope),
        Err(e) => {
            error!(error = ?e, "chat model call failed");
            APOLOGY.to_string()
        }
    }
}

#[instrument(skip_all)]
pub async fn chatbot(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<ChatRequest>,
) -> ApiResult<Json<ChatResponse>> {
    let Some(message) = payload.mensaje.as_deref().filter(|m| !m.is_empty()) else {
        return Err(ApiError::bad_request("Falta el mensaje"));
    };

    let respuesta = reply(state.chat.as_ref(), message).await;
    Ok(Json(ChatResponse { respuesta }))
}
