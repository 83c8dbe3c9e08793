use axum::{
    extract::{Query, State},
    routing::{get, post},
    Json, Router,
};
use tracing::{error, info, instrument};

use super::dto::CreatedPetResponse;
use crate::{
    auth::extractors::AuthUser,
    error::{ApiError, ApiResult},
    extract::ApiJson,
    state::AppState,
    store::{Pet, PetDraft, PetFilter},
};

pub fn read_routes() -> Router<AppState> {
    Router::new()
        .route("/mascotas", get(list_pets))
        .route("/mascotas/usuario", get(list_my_pets))
}

pub fn write_routes() -> Router<AppState> {
    Router::new().route("/mascotas", post(create_pet))
}

/// POST /mascotas: publishes a pet owned by the caller.
#[instrument(skip_all, fields(user_id = claims.id))]
pub async fn create_pet(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    ApiJson(draft): ApiJson<PetDraft>,
) -> ApiResult<Json<CreatedPetResponse>> {
    let pet = state.store.insert_pet(claims.id, draft).await.map_err(|e| {
        error!(error = %e, "insert_pet failed");
        ApiError::internal("Error al guardar la mascota")
    })?;

    info!(pet_id = pet.id, "pet published");
    Ok(Json(CreatedPetResponse {
        mensaje: "Mascota publicada correctamente",
        mascota: pet,
    }))
}

/// GET /mascotas?tipo=&estado=&raza=&color_principal=&ubicacion_ultima=
#[instrument(skip(state))]
pub async fn list_pets(
    State(state): State<AppState>,
    Query(filter): Query<PetFilter>,
) -> ApiResult<Json<Vec<Pet>>> {
    let pets = state.store.list_pets(&filter).await.map_err(|e| {
        error!(error = %e, "list_pets failed");
        ApiError::internal("Error al obtener mascotas")
    })?;
    Ok(Json(pets))
}

/// GET /mascotas/usuario: the caller's pets, newest first.
#[instrument(skip_all, fields(user_id = claims.id))]
pub async fn list_my_pets(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
) -> ApiResult<Json<Vec<Pet>>> {
    let pets = state
        .store
        .list_pets_by_owner(claims.id)
        .await
        .map_err(|e| {
            error!(error = %e, "list_pets_by_owner failed");
            ApiError::internal("Error al obtener tus mascotas")
        })?;
    Ok(Json(pets))
}
