use serde::{Deserialize, Serialize};

/// A short post owned by an account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Micropost {
    pub id: i64,
    pub account_id: i64,
    pub content: String,
    pub created_at: String,
}

/// Payload for inserting a new micropost.
#[derive(Debug, Clone)]
pub struct NewMicropost {
    pub account_id: i64,
    pub content: String,
}
