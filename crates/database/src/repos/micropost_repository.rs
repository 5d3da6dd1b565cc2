//! Micropost repository for database operations.

use crate::entities::{Micropost, NewMicropost};
use crate::types::{MicropostError, MicropostResult};
use chrono::Utc;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};

/// Repository for micropost database operations
#[derive(Clone)]
pub struct MicropostRepository {
    pool: SqlitePool,
}

fn micropost_from_row(row: &SqliteRow) -> Micropost {
    Micropost {
        id: row.get("id"),
        account_id: row.get("account_id"),
        content: row.get("content"),
        created_at: row.get("created_at"),
    }
}

impl MicropostRepository {
    /// Create a new micropost repository
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert a new micropost
    pub async fn create(&self, post: &NewMicropost) -> MicropostResult<Micropost> {
        let now = Utc::now().to_rfc3339();

        let result =
            sqlx::query("INSERT INTO microposts (account_id, content, created_at) VALUES (?, ?, ?)")
                .bind(post.account_id)
                .bind(&post.content)
                .bind(&now)
                .execute(&self.pool)
                .await?;

        let micropost_id = result.last_insert_rowid();
        self.find_by_id(micropost_id).await?.ok_or_else(|| {
            MicropostError::DatabaseError("failed to retrieve created micropost".to_string())
        })
    }

    /// Find micropost by ID
    pub async fn find_by_id(&self, id: i64) -> MicropostResult<Option<Micropost>> {
        let row =
            sqlx::query("SELECT id, account_id, content, created_at FROM microposts WHERE id = ?")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        Ok(row.as_ref().map(micropost_from_row))
    }

    /// All posts by one account, newest first
    pub async fn for_account(&self, account_id: i64) -> MicropostResult<Vec<Micropost>> {
        let rows = sqlx::query(
            "SELECT id, account_id, content, created_at FROM microposts WHERE account_id = ? ORDER BY created_at DESC, id DESC"
        )
        .bind(account_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(micropost_from_row).collect())
    }

    /// The feed: posts authored by accounts the given account follows, plus
    /// the account's own posts, newest first.
    pub async fn feed_for(&self, account_id: i64, limit: u32) -> MicropostResult<Vec<Micropost>> {
        let rows = sqlx::query(
            r#"
            SELECT id, account_id, content, created_at
            FROM microposts
            WHERE account_id IN (SELECT followed_id FROM relationships WHERE follower_id = ?)
               OR account_id = ?
            ORDER BY created_at DESC, id DESC
            LIMIT ?
            "#,
        )
        .bind(account_id)
        .bind(account_id)
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(micropost_from_row).collect())
    }

    /// Number of posts owned by one account
    pub async fn count_for(&self, account_id: i64) -> MicropostResult<i64> {
        let count: Option<i64> =
            sqlx::query_scalar("SELECT COUNT(*) FROM microposts WHERE account_id = ?")
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
    use crate::repos::{AccountRepository, RelationshipRepository};
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

    async fn post(repo: &MicropostRepository, account_id: i64, content: &str) -> Micropost {
        repo.create(&NewMicropost {
            account_id,
            content: content.to_string(),
        })
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn test_create_and_list() {
        let (pool, _temp_dir) = create_test_pool().await;
        let repo = MicropostRepository::new(pool.clone());

        let alice = create_account(&pool, "Alice", "alice@example.com").await;

        post(&repo, alice, "first").await;
        post(&repo, alice, "second").await;

        let posts = repo.for_account(alice).await.unwrap();
        assert_eq!(posts.len(), 2);
        // newest first
        assert_eq!(posts[0].content, "second");
        assert_eq!(posts[1].content, "first");
        assert_eq!(repo.count_for(alice).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_post_for_missing_account() {
        let (pool, _temp_dir) = create_test_pool().await;
        let repo = MicropostRepository::new(pool);

        let result = repo
            .create(&NewMicropost {
                account_id: 404,
                content: "orphan".to_string(),
            })
            .await;
        assert!(matches!(result, Err(MicropostError::AccountNotFound)));
    }

    #[tokio::test]
    async fn test_feed_spans_followed_accounts_and_self() {
        let (pool, _temp_dir) = create_test_pool().await;
        let microposts = MicropostRepository::new(pool.clone());
        let relationships = RelationshipRepository::new(pool.clone());

        let alice = create_account(&pool, "Alice", "alice@example.com").await;
        let bob = create_account(&pool, "Bob", "bob@example.com").await;
        let carol = create_account(&pool, "Carol", "carol@example.com").await;

        relationships.create(alice, bob).await.unwrap();

        post(&microposts, alice, "from alice").await;
        post(&microposts, bob, "from bob").await;
        post(&microposts, carol, "from carol").await;

        let feed = microposts.feed_for(alice, 50).await.unwrap();
        let contents: Vec<&str> = feed.iter().map(|p| p.content.as_str()).collect();

        assert_eq!(feed.len(), 2);
        assert!(contents.contains(&"from alice"));
        assert!(contents.contains(&"from bob"));
        assert!(!contents.contains(&"from carol"));
    }

    #[tokio::test]
    async fn test_feed_orders_newest_first_and_honours_limit() {
        let (pool, _temp_dir) = create_test_pool().await;
        let microposts = MicropostRepository::new(pool.clone());

        let alice = create_account(&pool, "Alice", "alice@example.com").await;

        for i in 0..5 {
            post(&microposts, alice, &format!("post {i}")).await;
        }

        let feed = microposts.feed_for(alice, 3).await.unwrap();
        assert_eq!(feed.len(), 3);
        assert_eq!(feed[0].content, "post 4");
        assert_eq!(feed[1].content, "post 3");
        assert_eq!(feed[2].content, "post 2");
    }
}
