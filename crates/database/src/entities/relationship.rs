use serde::{Deserialize, Serialize};

/// A directed follow edge between two accounts.
///
/// Owned by the follower; at most one edge exists per
/// (follower_id, followed_id) pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Relationship {
    pub id: i64,
    pub follower_id: i64,
    pub followed_id: i64,
    pub created_at: String,
}
