//! Follow-edge repository for database operations.

use crate::entities::{Account, Relationship};
use crate::types::{FollowError, FollowResult};
use chrono::Utc;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};

use super::account_repository::account_from_row;

/// Repository for follow-edge database operations
#[derive(Clone)]
pub struct RelationshipRepository {
    pool: SqlitePool,
}

fn relationship_from_row(row: &SqliteRow) -> Relationship {
    Relationship {
        id: row.get("id"),
        follower_id: row.get("follower_id"),
        followed_id: row.get("followed_id"),
        created_at: row.get("created_at"),
    }
}

impl RelationshipRepository {
    /// Create a new relationship repository
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    async fn find_by_id(&self, id: i64) -> FollowResult<Option<Relationship>> {
        let row = sqlx::query(
            "SELECT id, follower_id, followed_id, created_at FROM relationships WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(relationship_from_row))
    }

    /// Insert a follow edge.
    ///
    /// The schema enforces one edge per pair and rejects self-edges; both
    /// violations surface as typed errors rather than being pre-checked.
    pub async fn create(&self, follower_id: i64, followed_id: i64) -> FollowResult<Relationship> {
        let now = Utc::now().to_rfc3339();

        let result = sqlx::query(
            "INSERT INTO relationships (follower_id, followed_id, created_at) VALUES (?, ?, ?)",
        )
        .bind(follower_id)
        .bind(followed_id)
        .bind(&now)
        .execute(&self.pool)
        .await?;

        let relationship_id = result.last_insert_rowid();
        self.find_by_id(relationship_id).await?.ok_or_else(|| {
            FollowError::DatabaseError("failed to retrieve created relationship".to_string())
        })
    }

    /// Remove a follow edge; `NotFollowing` when no edge exists
    pub async fn delete(&self, follower_id: i64, followed_id: i64) -> FollowResult<()> {
        let result =
            sqlx::query("DELETE FROM relationships WHERE follower_id = ? AND followed_id = ?")
                .bind(follower_id)
                .bind(followed_id)
                .execute(&self.pool)
                .await?;

        if result.rows_affected() == 0 {
            return Err(FollowError::NotFollowing);
        }

        Ok(())
    }

    /// Check whether a follow edge exists
    pub async fn exists(&self, follower_id: i64, followed_id: i64) -> FollowResult<bool> {
        let count: Option<i64> = sqlx::query_scalar(
            "SELECT COUNT(*) FROM relationships WHERE follower_id = ? AND followed_id = ?",
        )
        .bind(follower_id)
        .bind(followed_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(count.unwrap_or(0) > 0)
    }

    /// Accounts following the given account, newest edge first
    pub async fn followers_of(&self, account_id: i64) -> FollowResult<Vec<Account>> {
        let rows = sqlx::query(
            r#"
            SELECT a.id, a.public_id, a.name, a.email, a.password_digest, a.remember_digest,
                   a.password_reset_token, a.password_reset_sent_at, a.created_at, a.updated_at
            FROM accounts a
            JOIN relationships r ON r.follower_id = a.id
            WHERE r.followed_id = ?
            ORDER BY r.created_at DESC, r.id DESC
            "#,
        )
        .bind(account_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(account_from_row).collect())
    }

    /// Accounts the given account follows, newest edge first
    pub async fn followed_by(&self, account_id: i64) -> FollowResult<Vec<Account>> {
        let rows = sqlx::query(
            r#"
            SELECT a.id, a.public_id, a.name, a.email, a.password_digest, a.remember_digest,
                   a.password_reset_token, a.password_reset_sent_at, a.created_at, a.updated_at
            FROM accounts a
            JOIN relationships r ON r.followed_id = a.id
            WHERE r.follower_id = ?
            ORDER BY r.created_at DESC, r.id DESC
            "#,
        )
        .bind(account_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(account_from_row).collect())
    }

    /// Number of followers of the given account
    pub async fn count_followers(&self, account_id: i64) -> FollowResult<i64> {
        let count: Option<i64> =
            sqlx::query_scalar("SELECT COUNT(*) FROM relationships WHERE followed_id = ?")
                .bind(account_id)
                .fetch_one(&self.pool)
                .await?;

        Ok(count.unwrap_or(0))
    }

    /// Number of accounts the given account follows
    pub async fn count_followed(&self, account_id: i64) -> FollowResult<i64> {
        let count: Option<i64> =
            sqlx::query_scalar("SELECT COUNT(*) FROM relationships WHERE follower_id = ?")
                .bind(account_id)
                .fetch_one(&self.pool)
                .await?;

        Ok(count.unwrap_or(0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connection::prepare_database;
    use crate::migrations::run_migrations;
    use crate::repos::AccountRepository;
    use crate::entities::NewAccountRecord;
    use feedline_config::DatabaseConfig;
    use tempfile::TempDir;

    async fn create_test_pool() -> (SqlitePool, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("test.db");

        let config = DatabaseConfig {
            url: format!("sqlite://{}", db_path.display()),
            max_connections: 1,
        };

        let pool = prepare_database(&config).await.unwrap();
        run_migrations(&pool).await.unwrap();
        (pool, temp_dir)
    }

    async fn create_account(pool: &SqlitePool, name: &str, email: &str) -> i64 {
        let repo = AccountRepository::new(pool.clone());
        repo.create(&NewAccountRecord {
            name: name.to_string(),
            email: email.to_string(),
            password_digest: format!("digest-for-{email}"),
            remember_digest: format!("remember-for-{email}"),
        })
        .await
        .unwrap()
        .id
    }

    #[tokio::test]
    async fn test_follow_and_unfollow_round_trip() {
        let (pool, _temp_dir) = create_test_pool().await;
        let repo = RelationshipRepository::new(pool.clone());

        let alice = create_account(&pool, "Alice", "alice@example.com").await;
        let bob = create_account(&pool, "Bob", "bob@example.com").await;

        assert!(!repo.exists(alice, bob).await.unwrap());

        let edge = repo.create(alice, bob).await.unwrap();
        assert_eq!(edge.follower_id, alice);
        assert_eq!(edge.followed_id, bob);
        assert!(repo.exists(alice, bob).await.unwrap());
        // the reverse direction is a separate edge
        assert!(!repo.exists(bob, alice).await.unwrap());

        repo.delete(alice, bob).await.unwrap();
        assert!(!repo.exists(alice, bob).await.unwrap());
    }

    #[tokio::test]
    async fn test_duplicate_edge_is_rejected() {
        let (pool, _temp_dir) = create_test_pool().await;
        let repo = RelationshipRepository::new(pool.clone());

        let alice = create_account(&pool, "Alice", "alice@example.com").await;
        let bob = create_account(&pool, "Bob", "bob@example.com").await;

        repo.create(alice, bob).await.unwrap();
        let result = repo.create(alice, bob).await;
        assert!(matches!(result, Err(FollowError::AlreadyFollowing)));
    }

    #[tokio::test]
    async fn test_unfollow_without_edge() {
        let (pool, _temp_dir) = create_test_pool().await;
        let repo = RelationshipRepository::new(pool.clone());

        let alice = create_account(&pool, "Alice", "alice@example.com").await;
        let bob = create_account(&pool, "Bob", "bob@example.com").await;

        let result = repo.delete(alice, bob).await;
        assert!(matches!(result, Err(FollowError::NotFollowing)));
    }

    #[tokio::test]
    async fn test_follow_missing_account() {
        let (pool, _temp_dir) = create_test_pool().await;
        let repo = RelationshipRepository::new(pool.clone());

        let alice = create_account(&pool, "Alice", "alice@example.com").await;

        let result = repo.create(alice, 9999).await;
        assert!(matches!(result, Err(FollowError::AccountNotFound)));
    }

    #[tokio::test]
    async fn test_self_edge_is_rejected_by_schema() {
        let (pool, _temp_dir) = create_test_pool().await;
        let repo = RelationshipRepository::new(pool.clone());

        let alice = create_account(&pool, "Alice", "alice@example.com").await;

        let result = repo.create(alice, alice).await;
        assert!(matches!(result, Err(FollowError::SelfFollow)));
    }

    #[tokio::test]
    async fn test_follower_and_followed_lists() {
        let (pool, _temp_dir) = create_test_pool().await;
        let repo = RelationshipRepository::new(pool.clone());

        let alice = create_account(&pool, "Alice", "alice@example.com").await;
        let bob = create_account(&pool, "Bob", "bob@example.com").await;
        let carol = create_account(&pool, "Carol", "carol@example.com").await;

        repo.create(alice, carol).await.unwrap();
        repo.create(bob, carol).await.unwrap();
        repo.create(carol, alice).await.unwrap();

        let followers = repo.followers_of(carol).await.unwrap();
        let follower_ids: Vec<i64> = followers.iter().map(|a| a.id).collect();
        assert_eq!(followers.len(), 2);
        assert!(follower_ids.contains(&alice));
        assert!(follower_ids.contains(&bob));

        let followed = repo.followed_by(carol).await.unwrap();
        assert_eq!(followed.len(), 1);
        assert_eq!(followed[0].id, alice);

        assert_eq!(repo.count_followers(carol).await.unwrap(), 2);
        assert_eq!(repo.count_followed(carol).await.unwrap(), 1);
    }
}
