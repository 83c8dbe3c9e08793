use serde::Serialize;

use crate::store::Pet;

#[derive(Debug, Serialize)]
pub struct CreatedPetResponse {
    pub mensaje: &'static str,
    pub mascota: Pet,
}
