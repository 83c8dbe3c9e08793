use axum::{
    extract::{FromRef, State},
    routing::{get, post},
    Json, Router,
};
use tracing::{error, info, instrument, warn};

use crate::{
    auth::{
        dto::{required, LoginRequest, LoginResponse, PublicUser, RegisterRequest, RegisterResponse},
        extractors::AuthUser,
        jwt::JwtKeys,
        password::{hash_password, verify_password},
    },
    error::{ApiError, ApiResult},
    extract::ApiJson,
    state::AppState,
    store::{NewUser, StoreError, User},
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/registro", post(register))
        .route("/login", post(login))
}

pub fn profile_routes() -> Router<AppState> {
    Router::new().route("/perfil", get(get_profile))
}

/// Emails are compared trimmed and lowercased.
fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<RegisterRequest>,
) -> ApiResult<Json<RegisterResponse>> {
    let (Some(name), Some(email), Some(password)) = (
        required(&payload.name),
        required(&payload.email),
        required(&payload.password),
    ) else {
        warn!("registration with missing fields");
        return Err(ApiError::bad_request("Faltan campos obligatorios"));
    };
    let email = normalize_email(email);

    let password_hash = hash_password(password).map_err(|e| {
        error!(error = %e, "hash_password failed");
        ApiError::internal("Error al registrar el usuario")
    })?;

    let new_user = NewUser {
        name: name.to_string(),
        email: email.clone(),
        password_hash,
        phone: payload.phone,
        address: payload.address,
    };
    let user = state.store.insert_user(new_user).await.map_err(|e| match e {
        StoreError::DuplicateEmail => {
            warn!(email = %email, "email already registered");
            ApiError::bad_request("El email ya está registrado")
        }
        other => {
            error!(error = %other, "create user failed");
            ApiError::internal("Error al registrar el usuario")
        }
    })?;

    info!(user_id = user.id, email = %user.email, "user registered");
    Ok(Json(RegisterResponse {
        mensaje: "Usuario registrado correctamente",
        usuario: user,
    }))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<LoginRequest>,
) -> ApiResult<Json<LoginResponse>> {
    let (Some(email), Some(password)) = (required(&payload.email), required(&payload.password))
    else {
        return Err(ApiError::bad_request("Email y contraseña requeridos"));
    };
    let email = normalize_email(email);

    let user = state
        .store
        .find_user_by_email(&email)
        .await
        .map_err(|e| {
            error!(error = %e, "find_user_by_email failed");
            ApiError::internal("Error en el servidor")
        })?
        .ok_or_else(|| {
            warn!(email = %email, "login unknown email");
            ApiError::not_found("Usuario no encontrado")
        })?;

    let ok = verify_password(password, &user.password_hash).map_err(|e| {
        error!(error = %e, user_id = user.id, "verify_password failed");
        ApiError::internal("Error en el servidor")
    })?;
    if !ok {
        warn!(user_id = user.id, "login invalid password");
        return Err(ApiError::unauthorized("Contraseña incorrecta"));
    }

    let keys = JwtKeys::from_ref(&state);
    let token = keys.sign(user.id, &user.email).map_err(|e| {
        error!(error = %e, "jwt sign failed");
        ApiError::internal("Error en el servidor")
    })?;

    info!(user_id = user.id, "user logged in");
    Ok(Json(LoginResponse {
        mensaje: "Login exitoso",
        token,
        usuario: PublicUser::from(&user),
    }))
}

#[instrument(skip_all, fields(user_id = claims.id))]
pub async fn get_profile(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
) -> ApiResult<Json<User>> {
    let user = state
        .store
        .find_user_by_id(claims.id)
        .await
        .map_err(|e| {
            error!(error = %e, "find_user_by_id failed");
            ApiError::internal("Error al obtener el perfil")
        })?
        .ok_or_else(|| ApiError::not_found("Usuario no encontrado"))?;

    Ok(Json(user))
}
