use serde::{Deserialize, Serialize};

/// A persisted account row.
///
/// The digest and token columns never leave the backend: they are skipped
/// when an account is serialized for an API response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    /// Database primary key
    pub id: i64,
    /// Publicly accessible id (cuid2)
    pub public_id: String,
    /// Display name
    pub name: String,
    /// Email address, stored lower-cased
    pub email: String,
    /// Argon2 digest of the password
    #[serde(skip_serializing)]
    pub password_digest: String,
    /// Digest of the persistent-login token
    #[serde(skip_serializing)]
    pub remember_digest: String,
    /// One-time password-reset token, if one is outstanding
    #[serde(skip_serializing)]
    pub password_reset_token: Option<String>,
    /// When the outstanding reset token was issued
    pub password_reset_sent_at: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// Payload for inserting a new account row.
///
/// Callers hand over digests only; plaintext passwords and remember tokens
/// stop at the domain layer.
#[derive(Debug, Clone)]
pub struct NewAccountRecord {
    pub name: String,
    pub email: String,
    pub password_digest: String,
    pub remember_digest: String,
}

/// Partial update of an account row.
#[derive(Debug, Clone, Default)]
pub struct AccountChanges {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password_digest: Option<String>,
}
