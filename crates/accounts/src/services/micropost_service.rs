//! Micropost service: posting and the aggregated feed.

use feedline_database::{
    Micropost, MicropostError, MicropostRepository, MicropostResult, NewMicropost,
};
use sqlx::sqlite::SqlitePool;

use super::mock_repositories::MockMicropostRepository;
use crate::utils::validation::validate_content;

/// Upper bound on a single feed page
pub const FEED_LIMIT_MAX: u32 = 100;

/// Service for micropost operations
pub struct MicropostService<R> {
    microposts: R,
}

impl MicropostService<MicropostRepository> {
    /// Create a micropost service backed by the real database repository
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            microposts: MicropostRepository::new(pool),
        }
    }
}

impl<R> MicropostService<R>
where
    R: MicropostRepo,
{
    /// Assemble a service from an explicit repository
    pub fn with_parts(microposts: R) -> Self {
        Self { microposts }
    }

    /// Publish a post for an account
    pub async fn post(&self, author_id: i64, content: &str) -> MicropostResult<Micropost> {
        if let Some(error) = validate_content(content) {
            return Err(MicropostError::Invalid(vec![error]));
        }

        self.microposts
            .create(&NewMicropost {
                account_id: author_id,
                content: content.to_string(),
            })
            .await
    }

    /// All posts by one account, newest first
    pub async fn timeline(&self, account_id: i64) -> MicropostResult<Vec<Micropost>> {
        self.microposts.for_account(account_id).await
    }

    /// The feed: posts from followed accounts plus the account's own,
    /// newest first.
    pub async fn feed(&self, account_id: i64, limit: u32) -> MicropostResult<Vec<Micropost>> {
        let limit = limit.min(FEED_LIMIT_MAX);
        self.microposts.feed_for(account_id, limit).await
    }

    /// Number of posts owned by one account
    pub async fn count(&self, account_id: i64) -> MicropostResult<i64> {
        self.microposts.count_for(account_id).await
    }
}

/// Trait for micropost repositories to allow generic usage
pub trait MicropostRepo {
    async fn create(&self, post: &NewMicropost) -> MicropostResult<Micropost>;
    async fn for_account(&self, account_id: i64) -> MicropostResult<Vec<Micropost>>;
    async fn feed_for(&self, account_id: i64, limit: u32) -> MicropostResult<Vec<Micropost>>;
    async fn count_for(&self, account_id: i64) -> MicropostResult<i64>;
}

impl MicropostRepo for MicropostRepository {
    async fn create(&self, post: &NewMicropost) -> MicropostResult<Micropost> {
        self.create(post).await
    }

    async fn for_account(&self, account_id: i64) -> MicropostResult<Vec<Micropost>> {
        self.for_account(account_id).await
    }

    async fn feed_for(&self, account_id: i64, limit: u32) -> MicropostResult<Vec<Micropost>> {
        self.feed_for(account_id, limit).await
    }

    async fn count_for(&self, account_id: i64) -> MicropostResult<i64> {
        self.count_for(account_id).await
    }
}

impl MicropostRepo for MockMicropostRepository {
    async fn create(&self, post: &NewMicropost) -> MicropostResult<Micropost> {
        self.create(post).await
    }

    async fn for_account(&self, account_id: i64) -> MicropostResult<Vec<Micropost>> {
        self.for_account(account_id).await
    }

    async fn feed_for(&self, account_id: i64, limit: u32) -> MicropostResult<Vec<Micropost>> {
        self.feed_for(account_id, limit).await
    }

    async fn count_for(&self, account_id: i64) -> MicropostResult<i64> {
        self.count_for(account_id).await
    }
}
