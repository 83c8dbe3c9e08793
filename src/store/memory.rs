use std::sync::Mutex;

use async_trait::async_trait;
use time::OffsetDateTime;

use super::filter::Predicate;
use super::{MatchMode, NewUser, Pet, PetDraft, PetFilter, PetStore, StoreError, User};

#[derive(Default)]
struct Tables {
    users: Vec<User>,
    pets: Vec<Pet>,
}

/// In-process store for router tests. Filters follow the PostgreSQL
/// backend: exact matches are case-sensitive, substrings are not.
#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
    failing: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store whose every call fails like an unreachable database.
    pub fn failing() -> Self {
        Self {
            failing: true,
            ..Self::default()
        }
    }

    fn check(&self) -> Result<(), StoreError> {
        if self.failing {
            return Err(StoreError::Database(sqlx::Error::PoolTimedOut));
        }
        Ok(())
    }
}

fn column<'p>(pet: &'p Pet, name: &str) -> Option<&'p str> {
    match name {
        "tipo" => pet.kind.as_deref(),
        "estado" => pet.status.as_deref(),
        "raza" => pet.breed.as_deref(),
        "color_principal" => pet.color.as_deref(),
        "ubicacion_ultima" => pet.last_location.as_deref(),
        _ => None,
    }
}

fn matches(pet: &Pet, pred: &Predicate<'_>) -> bool {
    let Some(field) = column(pet, pred.column) else {
        return false;
    };
    match pred.mode {
        MatchMode::Exact => field == pred.value,
        MatchMode::Contains => field
            .to_lowercase()
            .contains(&pred.value.to_lowercase()),
    }
}

#[async_trait]
impl PetStore for MemoryStore {
    async fn insert_user(&self, user: NewUser) -> Result<User, StoreError> {
        self.check()?;
        let mut t = self.tables.lock().unwrap();
        if t.users.iter().any(|u| u.email == user.email) {
            return Err(StoreError::DuplicateEmail);
        }
        let row = User {
            id: t.users.len() as i64 + 1,
            name: user.name,
            email: user.email,
            password_hash: user.password_hash,
            phone: user.phone,
            address: user.address,
            created_at: OffsetDateTime::now_utc(),
        };
        t.users.push(row.clone());
        Ok(row)
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        self.check()?;
        let t = self.tables.lock().unwrap();
        Ok(t.users.iter().find(|u| u.email == email).cloned())
    }

    async fn find_user_by_id(&self, id: i64) -> Result<Option<User>, StoreError> {
        self.check()?;
        let t = self.tables.lock().unwrap();
        Ok(t.users.iter().find(|u| u.id == id).cloned())
    }

    async fn insert_pet(&self, owner_id: i64, pet: PetDraft) -> Result<Pet, StoreError> {
        self.check()?;
        let mut t = self.tables.lock().unwrap();
        let row = Pet {
            id: t.pets.len() as i64 + 1,
            owner_id,
            name: pet.name,
            kind: pet.kind,
            breed: pet.breed,
            color: pet.color,
            approx_age: pet.approx_age,
            description: pet.description,
            photo_url: pet.photo_url,
            status: pet.status,
            last_location: pet.last_location,
            created_at: OffsetDateTime::now_utc(),
        };
        t.pets.push(row.clone());
        Ok(row)
    }

    async fn list_pets(&self, filter: &PetFilter) -> Result<Vec<Pet>, StoreError> {
        self.check()?;
        let preds = filter.predicates();
        let t = self.tables.lock().unwrap();
        Ok(t.pets
            .iter()
            .filter(|p| preds.iter().all(|pred| matches(p, pred)))
            .cloned()
            .collect())
    }

    async fn list_pets_by_owner(&self, owner_id: i64) -> Result<Vec<Pet>, StoreError> {
        self.check()?;
        let t = self.tables.lock().unwrap();
        let mut rows: Vec<Pet> = t
            .pets
            .iter()
            .filter(|p| p.owner_id == owner_id)
            .cloned()
            .collect();
        rows.sort_by(|a, b| (b.created_at, b.id).cmp(&(a.created_at, a.id)));
        Ok(rows)
    }
}
