//! Domain request types for account operations.

use serde::{Deserialize, Serialize};

/// Everything needed to create an account
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Signup {
    pub name: String,
    pub email: String,
    pub password: String,
}

/// Profile changes; the password is validated and re-hashed only when a new
/// value is supplied.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProfileChanges {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}
