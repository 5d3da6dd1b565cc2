//! Follow-graph service.

use feedline_database::{
    Account, FollowError, FollowResult, Relationship, RelationshipRepository,
};
use sqlx::sqlite::SqlitePool;
use tracing::debug;

use super::mock_repositories::MockFollowRepository;

/// Service for the directed follow graph between accounts
pub struct FollowService<R> {
    relationships: R,
}

impl FollowService<RelationshipRepository> {
    /// Create a follow service backed by the real database repository
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            relationships: RelationshipRepository::new(pool),
        }
    }
}

impl<R> FollowService<R>
where
    R: FollowRepo,
{
    /// Assemble a service from an explicit repository
    pub fn with_parts(relationships: R) -> Self {
        Self { relationships }
    }

    /// Create a follow edge from `follower_id` to `followed_id`.
    ///
    /// Following twice is an error, as is following oneself.
    pub async fn follow(&self, follower_id: i64, followed_id: i64) -> FollowResult<Relationship> {
        if follower_id == followed_id {
            return Err(FollowError::SelfFollow);
        }

        let relationship = self.relationships.create(follower_id, followed_id).await?;
        debug!(follower_id, followed_id, "follow edge created");
        Ok(relationship)
    }

    /// Remove the follow edge from `follower_id` to `followed_id`.
    ///
    /// Returns `NotFollowing` when no such edge exists.
    pub async fn unfollow(&self, follower_id: i64, followed_id: i64) -> FollowResult<()> {
        self.relationships.delete(follower_id, followed_id).await?;
        debug!(follower_id, followed_id, "follow edge removed");
        Ok(())
    }

    /// Whether a follow edge from `follower_id` to `followed_id` exists
    pub async fn is_following(&self, follower_id: i64, followed_id: i64) -> FollowResult<bool> {
        self.relationships.exists(follower_id, followed_id).await
    }

    /// Accounts following the given account
    pub async fn followers(&self, account_id: i64) -> FollowResult<Vec<Account>> {
        self.relationships.followers_of(account_id).await
    }

    /// Accounts the given account follows
    pub async fn following(&self, account_id: i64) -> FollowResult<Vec<Account>> {
        self.relationships.followed_by(account_id).await
    }

    /// Number of followers of the given account
    pub async fn follower_count(&self, account_id: i64) -> FollowResult<i64> {
        self.relationships.count_followers(account_id).await
    }

    /// Number of accounts the given account follows
    pub async fn following_count(&self, account_id: i64) -> FollowResult<i64> {
        self.relationships.count_followed(account_id).await
    }
}

/// Trait for follow-edge repositories to allow generic usage
pub trait FollowRepo {
    async fn create(&self, follower_id: i64, followed_id: i64) -> FollowResult<Relationship>;
    async fn delete(&self, follower_id: i64, followed_id: i64) -> FollowResult<()>;
    async fn exists(&self, follower_id: i64, followed_id: i64) -> FollowResult<bool>;
    async fn followers_of(&self, account_id: i64) -> FollowResult<Vec<Account>>;
    async fn followed_by(&self, account_id: i64) -> FollowResult<Vec<Account>>;
    async fn count_followers(&self, account_id: i64) -> FollowResult<i64>;
    async fn count_followed(&self, account_id: i64) -> FollowResult<i64>;
}

impl FollowRepo for RelationshipRepository {
    async fn create(&self, follower_id: i64, followed_id: i64) -> FollowResult<Relationship> {
        self.create(follower_id, followed_id).await
    }

    async fn delete(&self, follower_id: i64, followed_id: i64) -> FollowResult<()> {
        self.delete(follower_id, followed_id).await
    }

    async fn exists(&self, follower_id: i64, followed_id: i64) -> FollowResult<bool> {
        self.exists(follower_id, followed_id).await
    }

    async fn followers_of(&self, account_id: i64) -> FollowResult<Vec<Account>> {
        self.followers_of(account_id).await
    }

    async fn followed_by(&self, account_id: i64) -> FollowResult<Vec<Account>> {
        self.followed_by(account_id).await
    }

    async fn count_followers(&self, account_id: i64) -> FollowResult<i64> {
        self.count_followers(account_id).await
    }

    async fn count_followed(&self, account_id: i64) -> FollowResult<i64> {
        self.count_followed(account_id).await
    }
}

impl FollowRepo for MockFollowRepository {
    async fn create(&self, follower_id: i64, followed_id: i64) -> FollowResult<Relationship> {
        self.create(follower_id, followed_id).await
    }

    async fn delete(&self, follower_id: i64, followed_id: i64) -> FollowResult<()> {
        self.delete(follower_id, followed_id).await
    }

    async fn exists(&self, follower_id: i64, followed_id: i64) -> FollowResult<bool> {
        self.exists(follower_id, followed_id).await
    }

    async fn followers_of(&self, account_id: i64) -> FollowResult<Vec<Account>> {
        self.followers_of(account_id).await
    }

    async fn followed_by(&self, account_id: i64) -> FollowResult<Vec<Account>> {
        self.followed_by(account_id).await
    }

    async fn count_followers(&self, account_id: i64) -> FollowResult<i64> {
        self.count_followers(account_id).await
    }

    async fn count_followed(&self, account_id: i64) -> FollowResult<i64> {
        self.count_followed(account_id).await
    }
}
