use std::str::FromStr;

use anyhow::Context;
use async_trait::async_trait;
use sqlx::{
    mysql::{MySqlConnectOptions, MySqlPoolOptions},
    MySql, MySqlPool, QueryBuilder,
};

use super::{MatchMode, NewUser, Pet, PetDraft, PetFilter, PetStore, StoreError, User};
use crate::config::{DatabaseConfig, DbTarget};

/// MariaDB/MySQL backend. No `RETURNING`, so inserts re-read the row by
/// `LAST_INSERT_ID()`.
#[derive(Clone)]
pub struct MySqlStore {
    db: MySqlPool,
}

impl MySqlStore {
    pub async fn connect(cfg: &DatabaseConfig) -> anyhow::Result<Self> {
        let db = MySqlPoolOptions::new()
            .max_connections(cfg.pool_size)
            .connect_with(connect_options(&cfg.target)?)
            .await
            .context("connect to mariadb")?;
        Ok(Self { db })
    }

    pub async fn migrate(&self) -> anyhow::Result<()> {
        sqlx::migrate!("./migrations/mysql")
            .run(&self.db)
            .await
            .context("run mariadb migrations")?;
        Ok(())
    }

    async fn pet_by_id(&self, id: i64) -> Result<Pet, StoreError> {
        let pet = sqlx::query_as::<_, Pet>(
            r#"
            SELECT id, usuario_id, nombre, tipo, raza, color_principal, edad_aproximada,
                   descripcion, foto_url, estado, ubicacion_ultima, creado_en
            FROM mascotas
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_one(&self.db)
        .await?;
        Ok(pet)
    }
}

fn connect_options(target: &DbTarget) -> anyhow::Result<MySqlConnectOptions> {
    match target {
        DbTarget::Url(url) => {
            // sqlx only understands the mysql scheme
            let url = match url.strip_prefix("mariadb://") {
                Some(rest) => format!("mysql://{rest}"),
                None => url.clone(),
            };
            MySqlConnectOptions::from_str(&url).context("parse mariadb url")
        }
        DbTarget::MariaDbParts {
            host,
            port,
            user,
            password,
            database,
        } => Ok(MySqlConnectOptions::new()
            .host(host)
            .port(*port)
            .username(user)
            .password(password)
            .database(database)),
    }
}

/// Public listing: one `AND` clause per supplied filter, `LIKE` for substrings.
fn list_query(filter: &PetFilter) -> QueryBuilder<'static, MySql> {
    let mut qb = QueryBuilder::new(
        "SELECT id, usuario_id, nombre, tipo, raza, color_principal, edad_aproximada, \
         descripcion, foto_url, estado, ubicacion_ultima, creado_en \
         FROM mascotas WHERE 1=1",
    );
    for pred in filter.predicates() {
        qb.push(" AND ").push(pred.column);
        // LIKE is case-insensitive under the default utf8mb4 collation
        qb.push(match pred.mode {
            MatchMode::Exact => " = ",
            MatchMode::Contains => " LIKE ",
        });
        qb.push_bind(pred.bind_value());
    }
    qb.push(" ORDER BY id");
    qb
}

#[async_trait]
impl PetStore for MySqlStore {
    async fn insert_user(&self, user: NewUser) -> Result<User, StoreError> {
        let done = sqlx::query(
            r#"
            INSERT INTO usuarios (nombre, email, password, telefono, direccion)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.phone)
        .bind(&user.address)
        .execute(&self.db)
        .await
        .map_err(StoreError::from_user_insert)?;

        let id = done.last_insert_id() as i64;
        let created = sqlx::query_as::<_, User>(
            r#"
            SELECT id, nombre, email, password, telefono, direccion, creado_en
            FROM usuarios
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_one(&self.db)
        .await?;
        Ok(created)
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, nombre, email, password, telefono, direccion, creado_en
            FROM usuarios
            WHERE email = ?
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
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?;
        Ok(user)
    }

    async fn insert_pet(&self, owner_id: i64, pet: PetDraft) -> Result<Pet, StoreError> {
        let done = sqlx::query(
            r#"
            INSERT INTO mascotas
                (usuario_id, nombre, tipo, raza, color_principal, edad_aproximada,
                 descripcion, foto_url, estado, ubicacion_ultima)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
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
        .execute(&self.db)
        .await?;

        self.pet_by_id(done.last_insert_id() as i64).await
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
            WHERE usuario_id = ?
            ORDER BY creado_en DESC, id DESC
            "#,
        )
        .bind(owner_id)
        .fetch_all(&self.db)
        .await?;
        Ok(rows)
    }
}
