use anyhow::{bail, Context};
use async_trait::async_trait;
use sqlx::{postgres::PgPoolOptions, PgPool, Postgres, QueryBuilder};

use super::{MatchMode, NewUser, Pet, PetDraft, PetFilter, PetStore, StoreError, User};
use crate::config::{DatabaseConfig, DbTarget};

/// PostgreSQL (e.g. Supabase) backend.
#[derive(Clone)]
pub struct PgStore {
    db: PgPool,
}

impl PgStore {
    pub async fn connect(cfg: &DatabaseConfig) -> anyhow::Result<Self> {
        let DbTarget::Url(url) = &cfg.target else {
            bail!("postgres needs DATABASE_URL");
        };
        let db = PgPoolOptions::new()
            .max_connections(cfg.pool_size)
            .connect(url)
            .await
            .context("connect to postgres")?;
        Ok(Self { db })
    }

    pub async fn migrate(&self) -> anyhow::Result<()> {
        sqlx::migrate!("./migrations/postgres")
            .run(&self.db)
            .await
            .context("run postgres migrations")?;
        Ok(())
    }
}

/// Public listing: one `AND` clause per supplied filter, `ILIKE` for substrings.
fn list_query(filter: &PetFilter) -> QueryBuilder<'static, Postgres> {
    let mut qb = QueryBuilder::new(
        "SELECT id, usuario_id, nombre, tipo, raza, color_principal, edad_aproximada, \
         descripcion, foto_url, estado, ubicacion_ultima, creado_en \
         FROM mascotas WHERE 1=1",
    );
    for pred in filter.predicates() {
        qb.push(" AND ").push(pred.column);
        qb.push(match pred.mode {
            MatchMode::Exact => " = ",
            MatchMode::Contains => " ILIKE ",
        });
        qb.push_bind(pred.bind_value());
    }
    qb.push(" ORDER BY id");
    qb
}

#[async_trait]
impl PetStore for PgStore {
    async fn insert_user(&self, user: NewUser) -> Result<User, StoreError> {
        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO usuarios (nombre, email, password, telefono, direccion)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, nombre, email, password, telefono, direccion, creado_en
            "#,
        )
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.phone)
        .bind(&user.address)
        .fetch_one(&self.db)
        .await
        .map_err(StoreError::from_user_insert)
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, nombre, email, password, telefono, direccion, creado_en
            FROM usuarios
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.db)
        .await?;
        Ok(user)
    }

    async fn find_user_by_id(&self, id: i64) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, nombre, email, password, telefono, direccion, creado_en
            FROM usuarios
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?;
        Ok(user)
    }

    async fn insert_pet(&self, owner_id: i64, pet: PetDraft) -> Result<Pet, StoreError> {
        let row = sqlx::query_as::<_, Pet>(
            r#"
            INSERT INTO mascotas
                (usuario_id, nombre, tipo, raza, color_principal, edad_aproximada,
                 descripcion, foto_url, estado, ubicacion_ultima)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING id, usuario_id, nombre, tipo, raza, color_principal, edad_aproximada,
                      descripcion, foto_url, estado, ubicacion_ultima, creado_en
            "#,
        )
        .bind(owner_id)
        .bind(pet.name)
        .bind(pet.kind)
        .bind(pet.breed)
        .bind(pet.color)
        .bind(pet.approx_age)
        .bind(pet.description)
        .bind(pet.photo_url)
        .bind(pet.status)
        .bind(pet.last_location)
        .fetch_one(&self.db)
        .await?;
        Ok(row)
    }

    async fn list_pets(&self, filter: &PetFilter) -> Result<Vec<Pet>, StoreError> {
        let rows = list_query(filter)
            .build_query_as::<Pet>()
            .fetch_all(&self.db)
            .await?;
        Ok(rows)
    }

    async fn list_pets_by_owner(&self, owner_id: i64) -> Result<Vec<Pet>, StoreError> {
        let rows = sqlx::query_as::<_, Pet>(
            r#"
            SELECT id, usuario_id, nombre, tipo, raza, color_principal, edad_aproximada,
                   descripcion, foto_url, estado, ubicacion_ultima, creado_en
            FROM mascotas
            WHERE usuario_id = $1
            ORDER BY creado_en DESC, id DESC
            "#,
        )
        .bind(owner_id)
        .fetch_all(&self.db)
        .await?;
        Ok(rows)
    }
}
