use serde::{Deserialize, Serialize};

use crate::{extract::lenient_string, store::User};

/// Request body for `POST /api/registro`.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    #[serde(default, rename = "nombre", deserialize_with = "lenient_string")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub password: Option<String>,
    #[serde(default, rename = "telefono", deserialize_with = "lenient_string")]
    pub phone: Option<String>,
    #[serde(default, rename = "direccion", deserialize_with = "lenient_string")]
    pub address: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub mensaje: &'static str,
    pub usuario: User,
}

/// Request body for `POST /api/login`.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default, deserialize_with = "lenient_string")]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub password: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub mensaje: &'static str,
    pub token: String,
    pub usuario: PublicUser,
}

/// Public part of the user returned after login.
#[derive(Debug, Serialize)]
pub struct PublicUser {
    pub id: i64,
    pub nombre: String,
    pub email: String,
}

impl From<&User> for PublicUser {
    fn from(u: &User) -> Self {
        Self {
            id: u.id,
            nombre: u.name.clone(),
            email: u.email.clone(),
        }
    }
}

/// Treats missing and empty strings alike.
pub(crate) fn required(field: &Option<String>) -> Option<&str> {
    field.as_deref().filter(|v| !v.is_empty())
}
