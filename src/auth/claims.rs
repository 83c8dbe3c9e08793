use serde::{Deserialize, Serialize};

/// JWT payload. Not persisted; rebuilt from the bearer header per request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Claims {
    pub id: i64,       // user ID
    pub email: String, // user email at login time
    pub iat: usize,    // issued at (unix timestamp)
    pub exp: usize,    // expires at (unix timestamp)
}
