use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;
use tracing::{info, warn};

use crate::config::{DatabaseConfig, DbBackend};
use crate::extract::lenient_string;

mod filter;
#[cfg(test)]
pub mod memory;
mod mysql;
mod postgres;

pub use filter::{MatchMode, PetFilter};
pub use mysql::MySqlStore;
pub use postgres::PgStore;

/// Registered user row (`usuarios`).
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct User {
    pub id: i64,
    #[serde(rename = "nombre")]
    #[sqlx(rename = "nombre")]
    pub name: String,
    pub email: String,
    #[serde(skip_serializing)]
    #[sqlx(rename = "password")]
    pub password_hash: String, // argon2 PHC string
    #[serde(rename = "telefono")]
    #[sqlx(rename = "telefono")]
    pub phone: Option<String>,
    #[serde(rename = "direccion")]
    #[sqlx(rename = "direccion")]
    pub address: Option<String>,
    #[serde(rename = "creado_en", with = "time::serde::rfc3339")]
    #[sqlx(rename = "creado_en")]
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub phone: Option<String>,
    pub address: Option<String>,
}

/// Pet listing row (`mascotas`).
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Pet {
    pub id: i64,
    #[serde(rename = "usuario_id")]
    #[sqlx(rename = "usuario_id")]
    pub owner_id: i64,
    #[serde(rename = "nombre")]
    #[sqlx(rename = "nombre")]
    pub name: Option<String>,
    #[serde(rename = "tipo")]
    #[sqlx(rename = "tipo")]
    pub kind: Option<String>,
    #[serde(rename = "raza")]
    #[sqlx(rename = "raza")]
    pub breed: Option<String>,
    #[serde(rename = "color_principal")]
    #[sqlx(rename = "color_principal")]
    pub color: Option<String>,
    #[serde(rename = "edad_aproximada")]
    #[sqlx(rename = "edad_aproximada")]
    pub approx_age: Option<String>,
    #[serde(rename = "descripcion")]
    #[sqlx(rename = "descripcion")]
    pub description: Option<String>,
    #[serde(rename = "foto_url")]
    #[sqlx(rename = "foto_url")]
    pub photo_url: Option<String>,
    #[serde(rename = "estado")]
    #[sqlx(rename = "estado")]
    pub status: Option<String>,
    #[serde(rename = "ubicacion_ultima")]
    #[sqlx(rename = "ubicacion_ultima")]
    pub last_location: Option<String>,
    #[serde(rename = "creado_en", with = "time::serde::rfc3339")]
    #[sqlx(rename = "creado_en")]
    pub created_at: OffsetDateTime,
}

/// Pet attributes as posted by the owner. Nothing is required.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PetDraft {
    #[serde(default, rename = "nombre", deserialize_with = "lenient_string")]
    pub name: Option<String>,
    #[serde(default, rename = "tipo", deserialize_with = "lenient_string")]
    pub kind: Option<String>,
    #[serde(default, rename = "raza", deserialize_with = "lenient_string")]
    pub breed: Option<String>,
    #[serde(default, rename = "color_principal", deserialize_with = "lenient_string")]
    pub color: Option<String>,
    #[serde(default, rename = "edad_aproximada", deserialize_with = "lenient_string")]
    pub approx_age: Option<String>,
    #[serde(default, rename = "descripcion", deserialize_with = "lenient_string")]
    pub description: Option<String>,
    #[serde(default, rename = "foto_url", deserialize_with = "lenient_string")]
    pub photo_url: Option<String>,
    #[serde(default, rename = "estado", deserialize_with = "lenient_string")]
    pub status: Option<String>,
    #[serde(default, rename = "ubicacion_ultima", deserialize_with = "lenient_string")]
    pub last_location: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("email already registered")]
    DuplicateEmail,
    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

impl StoreError {
    /// Maps a unique-key violation on `usuarios.email` to `DuplicateEmail`.
    pub(crate) fn from_user_insert(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::Database(db) if db.is_unique_violation() => Self::DuplicateEmail,
            _ => Self::Database(err),
        }
    }
}

/// Persistence operations the HTTP layer needs. Implemented once per SQL
/// dialect.
#[async_trait]
pub trait PetStore: Send + Sync {
    async fn insert_user(&self, user: NewUser) -> Result<User, StoreError>;
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;
    async fn find_user_by_id(&self, id: i64) -> Result<Option<User>, StoreError>;
    async fn insert_pet(&self, owner_id: i64, pet: PetDraft) -> Result<Pet, StoreError>;
    /// All pets matching every supplied filter, by ascending id.
    async fn list_pets(&self, filter: &PetFilter) -> Result<Vec<Pet>, StoreError>;
    /// Pets owned by `owner_id`, newest first.
    async fn list_pets_by_owner(&self, owner_id: i64) -> Result<Vec<Pet>, StoreError>;
}

/// Opens the pool for the configured backend and applies its migrations.
pub async fn connect(cfg: &DatabaseConfig) -> anyhow::Result<Arc<dyn PetStore>> {
    let store: Arc<dyn PetStore> = match cfg.backend {
        DbBackend::Postgres => {
            let store = PgStore::connect(cfg).await?;
            if let Err(e) = store.migrate().await {
                warn!(error = %e, "postgres migrations failed; continuing");
            }
            Arc::new(store)
        }
        DbBackend::MySql => {
            let store = MySqlStore::connect(cfg).await?;
            if let Err(e) = store.migrate().await {
                warn!(error = %e, "mariadb migrations failed; continuing");
            }
            Arc::new(store)
        }
    };
    info!(backend = ?cfg.backend, pool_size = cfg.pool_size, "database ready");
    Ok(store)
}
