//! Mock repository implementations for testing core service functionality

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use feedline_database::{
    Account, AccountChanges, AccountError, AccountResult, FollowError, FollowResult, Micropost,
    MicropostError, MicropostResult, NewAccountRecord, NewMicropost, Relationship,
};
use tokio::sync::RwLock;

/// Mock account repository for testing
#[derive(Clone)]
pub struct MockAccountRepository {
    accounts: Arc<RwLock<HashMap<i64, Account>>>,
    next_id: Arc<RwLock<i64>>,
    fail_reset_store: Arc<RwLock<bool>>,
}

impl MockAccountRepository {
    pub fn new() -> Self {
        Self {
            accounts: Arc::new(RwLock::new(HashMap::new())),
            next_id: Arc::new(RwLock::new(1)),
            fail_reset_store: Arc::new(RwLock::new(false)),
        }
    }

    /// Make the next `store_reset_token` call fail like a dropped connection
    pub async fn set_fail_reset_store(&self, fail: bool) {
        *self.fail_reset_store.write().await = fail;
    }

    pub async fn find_by_id(&self, account_id: i64) -> AccountResult<Option<Account>> {
        let accounts = self.accounts.read().await;
        Ok(accounts.get(&account_id).cloned())
    }

    pub async fn find_by_public_id(&self, public_id: &str) -> AccountResult<Option<Account>> {
        let accounts = self.accounts.read().await;
        Ok(accounts.values().find(|a| a.public_id == public_id).cloned())
    }

    pub async fn find_by_email(&self, email: &str) -> AccountResult<Option<Account>> {
        let needle = email.to_lowercase();
        let accounts = self.accounts.read().await;
        Ok(accounts
            .values()
            .find(|a| a.email.to_lowercase() == needle)
            .cloned())
    }

    pub async fn email_taken(&self, email: &str) -> AccountResult<bool> {
        Ok(self.find_by_email(email).await?.is_some())
    }

    pub async fn create(&self, record: &NewAccountRecord) -> AccountResult<Account> {
        let mut accounts = self.accounts.write().await;

        let email = record.email.to_lowercase();
        if accounts.values().any(|a| a.email.to_lowercase() == email) {
            return Err(AccountError::EmailTaken);
        }
        if accounts
            .values()
            .any(|a| a.remember_digest == record.remember_digest)
        {
            return Err(AccountError::TokenCollision);
        }

        let mut next_id = self.next_id.write().await;
        let account_id = *next_id;
        *next_id += 1;

        let now = Utc::now().to_rfc3339();
        let account = Account {
            id: account_id,
            public_id: format!("acct_{account_id}"),
            name: record.name.clone(),
            email: record.email.clone(),
            password_digest: record.password_digest.clone(),
            remember_digest: record.remember_digest.clone(),
            password_reset_token: None,
            password_reset_sent_at: None,
            created_at: now.clone(),
            updated_at: now,
        };

        accounts.insert(account_id, account.clone());
        Ok(account)
    }

    pub async fn update(
        &self,
        account_id: i64,
        changes: &AccountChanges,
    ) -> AccountResult<Account> {
        let mut accounts = self.accounts.write().await;

        if let Some(ref email) = changes.email {
            let needle = email.to_lowercase();
            if accounts
                .values()
                .any(|a| a.id != account_id && a.email.to_lowercase() == needle)
            {
                return Err(AccountError::EmailTaken);
            }
        }

        let account = accounts
            .get_mut(&account_id)
            .ok_or(AccountError::AccountNotFound)?;

        if let Some(ref name) = changes.name {
            account.name = name.clone();
        }
        if let Some(ref email) = changes.email {
            account.email = email.clone();
        }
        if let Some(ref password_digest) = changes.password_digest {
            account.password_digest = password_digest.clone();
        }

        account.updated_at = Utc::now().to_rfc3339();
        Ok(account.clone())
    }

    pub async fn rotate_remember_digest(&self, account_id: i64, digest: &str) -> AccountResult<()> {
        let mut accounts = self.accounts.write().await;

        if accounts
            .values()
            .any(|a| a.id != account_id && a.remember_digest == digest)
        {
            return Err(AccountError::TokenCollision);
        }

        let account = accounts
            .get_mut(&account_id)
            .ok_or(AccountError::AccountNotFound)?;
        account.remember_digest = digest.to_string();
        account.updated_at = Utc::now().to_rfc3339();
        Ok(())
    }

    pub async fn store_reset_token(
        &self,
        account_id: i64,
        token: &str,
        sent_at: &str,
    ) -> AccountResult<()> {
        if *self.fail_reset_store.read().await {
            return Err(AccountError::DatabaseError(
                "simulated write failure".to_string(),
            ));
        }

        let mut accounts = self.accounts.write().await;

        if accounts
            .values()
            .any(|a| a.id != account_id && a.password_reset_token.as_deref() == Some(token))
        {
            return Err(AccountError::TokenCollision);
        }

        let account = accounts
            .get_mut(&account_id)
            .ok_or(AccountError::AccountNotFound)?;
        account.password_reset_token = Some(token.to_string());
        account.password_reset_sent_at = Some(sent_at.to_string());
        account.updated_at = Utc::now().to_rfc3339();
        Ok(())
    }

    pub async fn clear_reset_token(&self, account_id: i64) -> AccountResult<()> {
        let mut accounts = self.accounts.write().await;
        let account = accounts
            .get_mut(&account_id)
            .ok_or(AccountError::AccountNotFound)?;
        account.password_reset_token = None;
        account.password_reset_sent_at = None;
        account.updated_at = Utc::now().to_rfc3339();
        Ok(())
    }

    pub async fn find_by_reset_token(&self, token: &str) -> AccountResult<Option<Account>> {
        let accounts = self.accounts.read().await;
        Ok(accounts
            .values()
            .find(|a| a.password_reset_token.as_deref() == Some(token))
            .cloned())
    }

    pub async fn update_password(
        &self,
        account_id: i64,
        password_digest: &str,
    ) -> AccountResult<()> {
        let mut accounts = self.accounts.write().await;
        let account = accounts
            .get_mut(&account_id)
            .ok_or(AccountError::AccountNotFound)?;
        account.password_digest = password_digest.to_string();
        account.updated_at = Utc::now().to_rfc3339();
        Ok(())
    }

    pub async fn delete(&self, account_id: i64) -> AccountResult<()> {
        let mut accounts = self.accounts.write().await;
        accounts
            .remove(&account_id)
            .map(|_| ())
            .ok_or(AccountError::AccountNotFound)
    }

    pub async fn count(&self) -> AccountResult<i64> {
        Ok(self.accounts.read().await.len() as i64)
    }
}

impl Default for MockAccountRepository {
    fn default() -> Self {
        Self::new()
    }
}

/// Mock follow-edge repository for testing
#[derive(Clone)]
pub struct MockFollowRepository {
    accounts: Arc<RwLock<HashMap<i64, Account>>>,
    edges: Arc<RwLock<Vec<Relationship>>>,
    next_id: Arc<RwLock<i64>>,
}

impl MockFollowRepository {
    pub fn new() -> Self {
        Self {
            accounts: Arc::new(RwLock::new(HashMap::new())),
            edges: Arc::new(RwLock::new(Vec::new())),
            next_id: Arc::new(RwLock::new(1)),
        }
    }

    /// Seed an account the graph can reference
    pub async fn register_account(&self, id: i64, name: &str, email: &str) {
        let now = Utc::now().to_rfc3339();
        let account = Account {
            id,
            public_id: format!("acct_{id}"),
            name: name.to_string(),
            email: email.to_string(),
            password_digest: String::new(),
            remember_digest: format!("remember-{id}"),
            password_reset_token: None,
            password_reset_sent_at: None,
            created_at: now.clone(),
            updated_at: now,
        };
        self.accounts.write().await.insert(id, account);
    }

    pub async fn create(&self, follower_id: i64, followed_id: i64) -> FollowResult<Relationship> {
        let accounts = self.accounts.read().await;
        if !accounts.contains_key(&follower_id) || !accounts.contains_key(&followed_id) {
            return Err(FollowError::AccountNotFound);
        }
        drop(accounts);

        if follower_id == followed_id {
            return Err(FollowError::SelfFollow);
        }

        let mut edges = self.edges.write().await;
        if edges
            .iter()
            .any(|e| e.follower_id == follower_id && e.followed_id == followed_id)
        {
            return Err(FollowError::AlreadyFollowing);
        }

        let mut next_id = self.next_id.write().await;
        let edge = Relationship {
            id: *next_id,
            follower_id,
            followed_id,
            created_at: Utc::now().to_rfc3339(),
        };
        *next_id += 1;

        edges.push(edge.clone());
        Ok(edge)
    }

    pub async fn delete(&self, follower_id: i64, followed_id: i64) -> FollowResult<()> {
        let mut edges = self.edges.write().await;
        let before = edges.len();
        edges.retain(|e| !(e.follower_id == follower_id && e.followed_id == followed_id));

        if edges.len() == before {
            return Err(FollowError::NotFollowing);
        }
        Ok(())
    }

    pub async fn exists(&self, follower_id: i64, followed_id: i64) -> FollowResult<bool> {
        let edges = self.edges.read().await;
        Ok(edges
            .iter()
            .any(|e| e.follower_id == follower_id && e.followed_id == followed_id))
    }

    pub async fn followers_of(&self, account_id: i64) -> FollowResult<Vec<Account>> {
        let edges = self.edges.read().await;
        let accounts = self.accounts.read().await;
        Ok(edges
            .iter()
            .rev()
            .filter(|e| e.followed_id == account_id)
            .filter_map(|e| accounts.get(&e.follower_id).cloned())
            .collect())
    }

    pub async fn followed_by(&self, account_id: i64) -> FollowResult<Vec<Account>> {
        let edges = self.edges.read().await;
        let accounts = self.accounts.read().await;
        Ok(edges
            .iter()
            .rev()
            .filter(|e| e.follower_id == account_id)
            .filter_map(|e| accounts.get(&e.followed_id).cloned())
            .collect())
    }

    pub async fn count_followers(&self, account_id: i64) -> FollowResult<i64> {
        let edges = self.edges.read().await;
        Ok(edges.iter().filter(|e| e.followed_id == account_id).count() as i64)
    }

    pub async fn count_followed(&self, account_id: i64) -> FollowResult<i64> {
        let edges = self.edges.read().await;
        Ok(edges.iter().filter(|e| e.follower_id == account_id).count() as i64)
    }
}

impl Default for MockFollowRepository {
    fn default() -> Self {
        Self::new()
    }
}

/// Mock micropost repository for testing
#[derive(Clone)]
pub struct MockMicropostRepository {
    known_accounts: Arc<RwLock<Vec<i64>>>,
    follows: Arc<RwLock<Vec<(i64, i64)>>>,
    posts: Arc<RwLock<Vec<Micropost>>>,
    next_id: Arc<RwLock<i64>>,
}

impl MockMicropostRepository {
    pub fn new() -> Self {
        Self {
            known_accounts: Arc::new(RwLock::new(Vec::new())),
            follows: Arc::new(RwLock::new(Vec::new())),
            posts: Arc::new(RwLock::new(Vec::new())),
            next_id: Arc::new(RwLock::new(1)),
        }
    }

    pub async fn register_account(&self, account_id: i64) {
        self.known_accounts.write().await.push(account_id);
    }

    /// Seed a follow edge the feed can traverse
    pub async fn follow(&self, follower_id: i64, followed_id: i64) {
        self.follows.write().await.push((follower_id, followed_id));
    }

    pub async fn create(&self, post: &NewMicropost) -> MicropostResult<Micropost> {
        if !self
            .known_accounts
            .read()
            .await
            .contains(&post.account_id)
        {
            return Err(MicropostError::AccountNotFound);
        }

        let mut next_id = self.next_id.write().await;
        let micropost = Micropost {
            id: *next_id,
            account_id: post.account_id,
            content: post.content.clone(),
            created_at: Utc::now().to_rfc3339(),
        };
        *next_id += 1;

        self.posts.write().await.push(micropost.clone());
        Ok(micropost)
    }

    pub async fn for_account(&self, account_id: i64) -> MicropostResult<Vec<Micropost>> {
        let posts = self.posts.read().await;
        Ok(posts
            .iter()
            .rev()
            .filter(|p| p.account_id == account_id)
            .cloned()
            .collect())
    }

    pub async fn feed_for(&self, account_id: i64, limit: u32) -> MicropostResult<Vec<Micropost>> {
        let follows = self.follows.read().await;
        let followed: Vec<i64> = follows
            .iter()
            .filter(|(follower, _)| *follower == account_id)
            .map(|(_, followed)| *followed)
            .collect();

        let posts = self.posts.read().await;
        Ok(posts
            .iter()
            .rev()
            .filter(|p| p.account_id == account_id || followed.contains(&p.account_id))
            .take(limit as usize)
            .cloned()
            .collect())
    }

    pub async fn count_for(&self, account_id: i64) -> MicropostResult<i64> {
        let posts = self.posts.read().await;
        Ok(posts.iter().filter(|p| p.account_id == account_id).count() as i64)
    }
}

impl Default for MockMicropostRepository {
    fn default() -> Self {
        Self::new()
    }
}
