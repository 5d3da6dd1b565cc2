//! Account repository for database operations.

use crate::entities::{Account, AccountChanges, NewAccountRecord};
use crate::types::{AccountError, AccountResult};
use chrono::Utc;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};

/// Repository for account database operations
#[derive(Clone)]
pub struct AccountRepository {
    pool: SqlitePool,
}

pub(crate) fn account_from_row(row: &SqliteRow) -> Account {
    Account {
        id: row.get("id"),
        public_id: row.get("public_id"),
        name: row.get("name"),
        email: row.get("email"),
        password_digest: row.get("password_digest"),
        remember_digest: row.get("remember_digest"),
        password_reset_token: row.get("password_reset_token"),
        password_reset_sent_at: row.get("password_reset_sent_at"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

impl AccountRepository {
    /// Create a new account repository
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Find account by ID
    pub async fn find_by_id(&self, id: i64) -> AccountResult<Option<Account>> {
        let row = sqlx::query(
            "SELECT id, public_id, name, email, password_digest, remember_digest, password_reset_token, password_reset_sent_at, created_at, updated_at FROM accounts WHERE id = ?"
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(account_from_row))
    }

    /// Find account by public ID
    pub async fn find_by_public_id(&self, public_id: &str) -> AccountResult<Option<Account>> {
        let row = sqlx::query(
            "SELECT id, public_id, name, email, password_digest, remember_digest, password_reset_token, password_reset_sent_at, created_at, updated_at FROM accounts WHERE public_id = ?"
        )
        .bind(public_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(account_from_row))
    }

    /// Find account by email. The email column carries NOCASE collation, so
    /// the lookup is case-insensitive regardless of how the caller spells it.
    pub async fn find_by_email(&self, email: &str) -> AccountResult<Option<Account>> {
        let row = sqlx::query(
            "SELECT id, public_id, name, email, password_digest, remember_digest, password_reset_token, password_reset_sent_at, created_at, updated_at FROM accounts WHERE email = ?"
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(account_from_row))
    }

    /// Find account holding an outstanding password-reset token
    pub async fn find_by_reset_token(&self, token: &str) -> AccountResult<Option<Account>> {
        let row = sqlx::query(
            "SELECT id, public_id, name, email, password_digest, remember_digest, password_reset_token, password_reset_sent_at, created_at, updated_at FROM accounts WHERE password_reset_token = ?"
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(account_from_row))
    }

    /// Check whether any account already holds this email (case-insensitive)
    pub async fn email_taken(&self, email: &str) -> AccountResult<bool> {
        let count: Option<i64> =
            sqlx::query_scalar("SELECT COUNT(*) FROM accounts WHERE email = ?")
                .bind(email)
                .fetch_one(&self.pool)
                .await?;

        Ok(count.unwrap_or(0) > 0)
    }

    /// Insert a new account row.
    ///
    /// Uniqueness of email and remember digest is enforced by the schema;
    /// a violation comes back as `EmailTaken` or `TokenCollision` rather
    /// than being pre-checked here.
    pub async fn create(&self, record: &NewAccountRecord) -> AccountResult<Account> {
        let now = Utc::now().to_rfc3339();
        let public_id = cuid2::cuid();

        let result = sqlx::query(
            "INSERT INTO accounts (public_id, name, email, password_digest, remember_digest, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?)"
        )
        .bind(&public_id)
        .bind(&record.name)
        .bind(&record.email)
        .bind(&record.password_digest)
        .bind(&record.remember_digest)
        .bind(&now)
        .bind(&now)
        .execute(&self.pool)
        .await?;

        let account_id = result.last_insert_rowid();
        self.find_by_id(account_id).await?.ok_or_else(|| {
            AccountError::DatabaseError("failed to retrieve created account".to_string())
        })
    }

    /// Apply a partial update, bumping `updated_at`
    pub async fn update(&self, account_id: i64, changes: &AccountChanges) -> AccountResult<Account> {
        let now = Utc::now().to_rfc3339();

        let mut query_parts = Vec::new();
        let mut values = Vec::new();

        if let Some(ref name) = changes.name {
            query_parts.push("name = ?");
            values.push(name.clone());
        }

        if let Some(ref email) = changes.email {
            query_parts.push("email = ?");
            values.push(email.clone());
        }

        if let Some(ref password_digest) = changes.password_digest {
            query_parts.push("password_digest = ?");
            values.push(password_digest.clone());
        }

        if query_parts.is_empty() {
            return self
                .find_by_id(account_id)
                .await?
                .ok_or(AccountError::AccountNotFound);
        }

        query_parts.push("updated_at = ?");
        values.push(now);

        let query_str = format!("UPDATE accounts SET {} WHERE id = ?", query_parts.join(", "));

        let mut query = sqlx::query(&query_str);
        for value in values {
            query = query.bind(value);
        }

        let result = query.bind(account_id).execute(&self.pool).await?;
        if result.rows_affected() == 0 {
            return Err(AccountError::AccountNotFound);
        }

        self.find_by_id(account_id)
            .await?
            .ok_or(AccountError::AccountNotFound)
    }

    /// Replace the stored remember digest
    pub async fn rotate_remember_digest(&self, account_id: i64, digest: &str) -> AccountResult<()> {
        let now = Utc::now().to_rfc3339();

        let result =
            sqlx::query("UPDATE accounts SET remember_digest = ?, updated_at = ? WHERE id = ?")
                .bind(digest)
                .bind(&now)
                .bind(account_id)
                .execute(&self.pool)
                .await?;

        if result.rows_affected() == 0 {
            return Err(AccountError::AccountNotFound);
        }

        Ok(())
    }

    /// Store a fresh password-reset token and its issue timestamp
    pub async fn store_reset_token(
        &self,
        account_id: i64,
        token: &str,
        sent_at: &str,
    ) -> AccountResult<()> {
        let now = Utc::now().to_rfc3339();

        let result = sqlx::query(
            "UPDATE accounts SET password_reset_token = ?, password_reset_sent_at = ?, updated_at = ? WHERE id = ?"
        )
        .bind(token)
        .bind(sent_at)
        .bind(&now)
        .bind(account_id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AccountError::AccountNotFound);
        }

        Ok(())
    }

    /// Clear any outstanding password-reset token
    pub async fn clear_reset_token(&self, account_id: i64) -> AccountResult<()> {
        let now = Utc::now().to_rfc3339();

        let result = sqlx::query(
            "UPDATE accounts SET password_reset_token = NULL, password_reset_sent_at = NULL, updated_at = ? WHERE id = ?"
        )
        .bind(&now)
        .bind(account_id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AccountError::AccountNotFound);
        }

        Ok(())
    }

    /// Replace the stored password digest
    pub async fn update_password(&self, account_id: i64, password_digest: &str) -> AccountResult<()> {
        let now = Utc::now().to_rfc3339();

        let result =
            sqlx::query("UPDATE accounts SET password_digest = ?, updated_at = ? WHERE id = ?")
                .bind(password_digest)
                .bind(&now)
                .bind(account_id)
                .execute(&self.pool)
                .await?;

        if result.rows_affected() == 0 {
            return Err(AccountError::AccountNotFound);
        }

        Ok(())
    }

    /// Delete an account and everything it owns in one transaction:
    /// microposts, follow edges in both directions, then the row itself.
    /// The schema's ON DELETE CASCADE rules back this up, but the sequence
    /// is explicit so the contract doesn't depend on pragma state.
    pub async fn delete(&self, account_id: i64) -> AccountResult<()> {
        let mut tx = self.pool.begin().await.map_err(AccountError::from)?;

        sqlx::query("DELETE FROM microposts WHERE account_id = ?")
            .bind(account_id)
            .execute(&mut *tx)
            .await?;

        sqlx::query("DELETE FROM relationships WHERE follower_id = ? OR followed_id = ?")
            .bind(account_id)
            .bind(account_id)
            .execute(&mut *tx)
            .await?;

        let result = sqlx::query("DELETE FROM accounts WHERE id = ?")
            .bind(account_id)
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() == 0 {
            // dropping the transaction rolls it back
            return Err(AccountError::AccountNotFound);
        }

        tx.commit().await.map_err(AccountError::from)?;
        Ok(())
    }

    /// Get account count
    pub async fn count(&self) -> AccountResult<i64> {
        let count: Option<i64> = sqlx::query_scalar("SELECT COUNT(*) FROM accounts")
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
    use crate::repos::{MicropostRepository, RelationshipRepository};
    use crate::entities::NewMicropost;
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

    fn test_record(name: &str, email: &str) -> NewAccountRecord {
        NewAccountRecord {
            name: name.to_string(),
            email: email.to_string(),
            password_digest: format!("digest-for-{email}"),
            remember_digest: format!("remember-for-{email}"),
        }
    }

    #[tokio::test]
    async fn test_account_creation_and_retrieval() {
        let (pool, _temp_dir) = create_test_pool().await;
        let repo = AccountRepository::new(pool);

        let created = repo
            .create(&test_record("Test Account", "test@example.com"))
            .await
            .unwrap();
        assert!(created.id > 0);
        assert!(!created.public_id.is_empty());
        assert_eq!(created.email, "test@example.com");
        assert!(created.password_reset_token.is_none());

        let found = repo.find_by_id(created.id).await.unwrap().unwrap();
        assert_eq!(found.email, created.email);

        let by_public_id = repo
            .find_by_public_id(&created.public_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(by_public_id.id, created.id);
    }

    #[tokio::test]
    async fn test_email_lookup_is_case_insensitive() {
        let (pool, _temp_dir) = create_test_pool().await;
        let repo = AccountRepository::new(pool);

        repo.create(&test_record("Test Account", "test@example.com"))
            .await
            .unwrap();

        let found = repo.find_by_email("TEST@EXAMPLE.COM").await.unwrap();
        assert!(found.is_some());

        assert!(repo.email_taken("Test@Example.Com").await.unwrap());
        assert!(!repo.email_taken("other@example.com").await.unwrap());
    }

    #[tokio::test]
    async fn test_duplicate_email_differs_only_by_case() {
        let (pool, _temp_dir) = create_test_pool().await;
        let repo = AccountRepository::new(pool);

        repo.create(&test_record("First", "taken@example.com"))
            .await
            .unwrap();

        let result = repo.create(&test_record("Second", "TAKEN@example.com")).await;
        assert!(matches!(result, Err(AccountError::EmailTaken)));
    }

    #[tokio::test]
    async fn test_remember_digest_collision_is_reported() {
        let (pool, _temp_dir) = create_test_pool().await;
        let repo = AccountRepository::new(pool);

        let mut first = test_record("First", "first@example.com");
        first.remember_digest = "same-digest".to_string();
        repo.create(&first).await.unwrap();

        let mut second = test_record("Second", "second@example.com");
        second.remember_digest = "same-digest".to_string();
        let result = repo.create(&second).await;
        assert!(matches!(result, Err(AccountError::TokenCollision)));
    }

    #[tokio::test]
    async fn test_partial_update() {
        let (pool, _temp_dir) = create_test_pool().await;
        let repo = AccountRepository::new(pool);

        let account = repo
            .create(&test_record("Before", "update@example.com"))
            .await
            .unwrap();

        let updated = repo
            .update(
                account.id,
                &AccountChanges {
                    name: Some("After".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.name, "After");
        assert_eq!(updated.email, account.email);
        assert_eq!(updated.password_digest, account.password_digest);
    }

    #[tokio::test]
    async fn test_update_to_taken_email_fails() {
        let (pool, _temp_dir) = create_test_pool().await;
        let repo = AccountRepository::new(pool);

        repo.create(&test_record("First", "first@example.com"))
            .await
            .unwrap();
        let second = repo
            .create(&test_record("Second", "second@example.com"))
            .await
            .unwrap();

        let result = repo
            .update(
                second.id,
                &AccountChanges {
                    email: Some("FIRST@example.com".to_string()),
                    ..Default::default()
                },
            )
            .await;
        assert!(matches!(result, Err(AccountError::EmailTaken)));
    }

    #[tokio::test]
    async fn test_reset_token_round_trip() {
        let (pool, _temp_dir) = create_test_pool().await;
        let repo = AccountRepository::new(pool);

        let account = repo
            .create(&test_record("Reset", "reset@example.com"))
            .await
            .unwrap();

        let sent_at = Utc::now().to_rfc3339();
        repo.store_reset_token(account.id, "reset-token", &sent_at)
            .await
            .unwrap();

        let found = repo.find_by_reset_token("reset-token").await.unwrap().unwrap();
        assert_eq!(found.id, account.id);
        assert_eq!(found.password_reset_sent_at.as_deref(), Some(sent_at.as_str()));

        repo.clear_reset_token(account.id).await.unwrap();
        assert!(repo.find_by_reset_token("reset-token").await.unwrap().is_none());

        let cleared = repo.find_by_id(account.id).await.unwrap().unwrap();
        assert!(cleared.password_reset_token.is_none());
        assert!(cleared.password_reset_sent_at.is_none());
    }

    #[tokio::test]
    async fn test_delete_cascades_to_owned_rows() {
        let (pool, _temp_dir) = create_test_pool().await;
        let accounts = AccountRepository::new(pool.clone());
        let relationships = RelationshipRepository::new(pool.clone());
        let microposts = MicropostRepository::new(pool);

        let a = accounts
            .create(&test_record("A", "a@example.com"))
            .await
            .unwrap();
        let b = accounts
            .create(&test_record("B", "b@example.com"))
            .await
            .unwrap();
        let c = accounts
            .create(&test_record("C", "c@example.com"))
            .await
            .unwrap();

        relationships.create(a.id, b.id).await.unwrap();
        relationships.create(c.id, a.id).await.unwrap();
        microposts
            .create(&NewMicropost {
                account_id: a.id,
                content: "hello".to_string(),
            })
            .await
            .unwrap();

        assert_eq!(accounts.count().await.unwrap(), 3);

        accounts.delete(a.id).await.unwrap();

        assert_eq!(accounts.count().await.unwrap(), 2);
        assert!(accounts.find_by_id(a.id).await.unwrap().is_none());
        assert!(!relationships.exists(a.id, b.id).await.unwrap());
        assert!(!relationships.exists(c.id, a.id).await.unwrap());
        assert_eq!(microposts.count_for(a.id).await.unwrap(), 0);

        // the other endpoints survive
        assert!(accounts.find_by_id(b.id).await.unwrap().is_some());
        assert!(accounts.find_by_id(c.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_delete_missing_account() {
        let (pool, _temp_dir) = create_test_pool().await;
        let repo = AccountRepository::new(pool);

        let result = repo.delete(12345).await;
        assert!(matches!(result, Err(AccountError::AccountNotFound)));
    }
}
