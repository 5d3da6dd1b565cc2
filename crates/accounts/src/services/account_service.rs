//! Account service for signup, credentials, tokens, and deletion.

use chrono::{DateTime, Duration, Utc};
use feedline_config::MailerConfig;
use feedline_database::{
    Account, AccountChanges, AccountError, AccountRepository, AccountResult, NewAccountRecord,
};
use sqlx::sqlite::SqlitePool;
use tracing::{info, warn};

use super::mailer::{LogMailer, Mailer, MockMailer};
use super::mock_repositories::MockAccountRepository;
use crate::entities::{ProfileChanges, Signup};
use crate::utils::password::{hash_password, verify_password};
use crate::utils::token;
use crate::utils::validation::{
    validate_email, validate_name, validate_password, validate_signup,
};

/// How often a colliding random token is re-drawn before giving up.
///
/// The token columns carry unique indexes, so a collision surfaces as a
/// constraint violation on the write itself; there is no pre-check.
const TOKEN_ATTEMPTS: usize = 3;

/// An issued reset token goes stale after this long
const RESET_TOKEN_TTL_HOURS: i64 = 2;

/// Service for account operations
pub struct AccountService<R, M> {
    accounts: R,
    mailer: M,
}

impl AccountService<AccountRepository, LogMailer> {
    /// Create an account service backed by the real database repository
    pub fn new(pool: SqlitePool, mailer_config: MailerConfig) -> Self {
        Self {
            accounts: AccountRepository::new(pool),
            mailer: LogMailer::new(mailer_config),
        }
    }
}

impl AccountService<MockAccountRepository, MockMailer> {
    /// Create an account service over in-memory doubles for testing
    pub fn new_for_testing() -> Self {
        Self {
            accounts: MockAccountRepository::new(),
            mailer: MockMailer::new(),
        }
    }
}

impl<R, M> AccountService<R, M>
where
    R: AccountRepo,
    M: Mailer,
{
    /// Assemble a service from an explicit repository and mailer
    pub fn with_parts(accounts: R, mailer: M) -> Self {
        Self { accounts, mailer }
    }

    /// Get an account by ID
    pub async fn get_account(&self, account_id: i64) -> AccountResult<Account> {
        self.accounts
            .find_by_id(account_id)
            .await?
            .ok_or(AccountError::AccountNotFound)
    }

    /// Get an account by public ID
    pub async fn get_by_public_id(&self, public_id: &str) -> AccountResult<Account> {
        self.accounts
            .find_by_public_id(public_id)
            .await?
            .ok_or(AccountError::AccountNotFound)
    }

    /// Get an account by email, case-insensitively
    pub async fn get_by_email(&self, email: &str) -> AccountResult<Option<Account>> {
        self.accounts.find_by_email(&email.to_lowercase()).await
    }

    /// Create a new account.
    ///
    /// Validation failures come back as a list of field errors. The email is
    /// lower-cased before it is stored, and the account is created with a
    /// fresh remember-token digest.
    pub async fn sign_up(&self, signup: Signup) -> AccountResult<Account> {
        let errors = validate_signup(&signup.name, &signup.email, &signup.password);
        if !errors.is_empty() {
            return Err(AccountError::Invalid(errors));
        }

        let email = signup.email.to_lowercase();

        if self.accounts.email_taken(&email).await? {
            return Err(AccountError::EmailTaken);
        }

        let password_digest = hash_password(&signup.password)?;

        for _ in 0..TOKEN_ATTEMPTS {
            let record = NewAccountRecord {
                name: signup.name.clone(),
                email: email.clone(),
                password_digest: password_digest.clone(),
                remember_digest: token::digest(&token::new_token()),
            };

            match self.accounts.create(&record).await {
                Ok(account) => {
                    info!(account = %account.public_id, "account created");
                    return Ok(account);
                }
                Err(AccountError::TokenCollision) => continue,
                Err(e) => return Err(e),
            }
        }

        Err(AccountError::TokenCollision)
    }

    /// Update name, email, or password.
    ///
    /// The password is validated and re-hashed only when a new value is
    /// supplied; omitting it leaves the stored digest untouched.
    pub async fn update_profile(
        &self,
        account_id: i64,
        changes: ProfileChanges,
    ) -> AccountResult<Account> {
        self.get_account(account_id).await?;

        let mut errors = Vec::new();
        if let Some(ref name) = changes.name {
            errors.extend(validate_name(name));
        }
        if let Some(ref email) = changes.email {
            errors.extend(validate_email(email));
        }
        if let Some(ref password) = changes.password {
            errors.extend(validate_password(password));
        }
        if !errors.is_empty() {
            return Err(AccountError::Invalid(errors));
        }

        let password_digest = match changes.password {
            Some(ref password) => Some(hash_password(password)?),
            None => None,
        };

        let record = AccountChanges {
            name: changes.name,
            email: changes.email.map(|e| e.to_lowercase()),
            password_digest,
        };

        self.accounts.update(account_id, &record).await
    }

    /// Check credentials; `InvalidCredentials` hides whether the email exists
    pub async fn authenticate(&self, email: &str, password: &str) -> AccountResult<Account> {
        let Some(account) = self.accounts.find_by_email(&email.to_lowercase()).await? else {
            return Err(AccountError::InvalidCredentials);
        };

        if !verify_password(password, &account.password_digest) {
            return Err(AccountError::InvalidCredentials);
        }

        Ok(account)
    }

    /// Issue a fresh remember token for persistent login.
    ///
    /// Returns the plaintext token for the client; only its digest is stored.
    pub async fn rotate_remember_token(&self, account_id: i64) -> AccountResult<String> {
        self.get_account(account_id).await?;

        for _ in 0..TOKEN_ATTEMPTS {
            let candidate = token::new_token();
            match self
                .accounts
                .rotate_remember_digest(account_id, &token::digest(&candidate))
                .await
            {
                Ok(()) => return Ok(candidate),
                Err(AccountError::TokenCollision) => continue,
                Err(e) => return Err(e),
            }
        }

        Err(AccountError::TokenCollision)
    }

    /// Check a presented remember token against the stored digest
    pub async fn remember_token_matches(
        &self,
        account_id: i64,
        presented: &str,
    ) -> AccountResult<bool> {
        let account = self.get_account(account_id).await?;
        Ok(account.remember_digest == token::digest(presented))
    }

    /// Issue a password-reset token and dispatch the reset email.
    ///
    /// The token and its timestamp are persisted first; if that write fails
    /// the whole operation aborts and no mail goes out. One call dispatches
    /// exactly one email.
    pub async fn send_password_reset(&self, email: &str) -> AccountResult<()> {
        let account = self
            .accounts
            .find_by_email(&email.to_lowercase())
            .await?
            .ok_or(AccountError::AccountNotFound)?;

        let sent_at = Utc::now().to_rfc3339();

        let mut stored = None;
        for _ in 0..TOKEN_ATTEMPTS {
            let candidate = token::new_token();
            match self
                .accounts
                .store_reset_token(account.id, &candidate, &sent_at)
                .await
            {
                Ok(()) => {
                    stored = Some(candidate);
                    break;
                }
                Err(AccountError::TokenCollision) => continue,
                Err(e) => return Err(e),
            }
        }
        let reset_token = stored.ok_or(AccountError::TokenCollision)?;

        info!(account = %account.public_id, "password reset token issued");

        self.mailer
            .send_password_reset_email(&account, &reset_token)
            .await
            .map_err(|e| AccountError::MailDispatchFailed(e.to_string()))
    }

    /// Redeem a reset token: store the new password and consume the token
    pub async fn reset_password(
        &self,
        reset_token: &str,
        new_password: &str,
    ) -> AccountResult<Account> {
        let account = self
            .accounts
            .find_by_reset_token(reset_token)
            .await?
            .ok_or(AccountError::InvalidResetToken)?;

        if reset_token_expired(account.password_reset_sent_at.as_deref()) {
            return Err(AccountError::ResetTokenExpired);
        }

        if let Some(error) = validate_password(new_password) {
            return Err(AccountError::Invalid(vec![error]));
        }

        let digest = hash_password(new_password)?;
        self.accounts.update_password(account.id, &digest).await?;
        self.accounts.clear_reset_token(account.id).await?;

        info!(account = %account.public_id, "password reset completed");
        self.get_account(account.id).await
    }

    /// Delete an account together with its follow edges and microposts
    pub async fn delete_account(&self, account_id: i64) -> AccountResult<()> {
        let account = self.get_account(account_id).await?;

        self.accounts.delete(account_id).await?;

        warn!(account = %account.public_id, "account deleted");
        Ok(())
    }
}

fn reset_token_expired(sent_at: Option<&str>) -> bool {
    let Some(sent_at) = sent_at else {
        return true;
    };

    match DateTime::parse_from_rfc3339(sent_at) {
        Ok(at) => Utc::now().signed_duration_since(at) > Duration::hours(RESET_TOKEN_TTL_HOURS),
        Err(_) => true,
    }
}

/// Trait for account repositories to allow generic usage
pub trait AccountRepo {
    async fn find_by_id(&self, account_id: i64) -> AccountResult<Option<Account>>;
    async fn find_by_public_id(&self, public_id: &str) -> AccountResult<Option<Account>>;
    async fn find_by_email(&self, email: &str) -> AccountResult<Option<Account>>;
    async fn email_taken(&self, email: &str) -> AccountResult<bool>;
    async fn create(&self, record: &NewAccountRecord) -> AccountResult<Account>;
    async fn update(&self, account_id: i64, changes: &AccountChanges) -> AccountResult<Account>;
    async fn rotate_remember_digest(&self, account_id: i64, digest: &str) -> AccountResult<()>;
    async fn store_reset_token(
        &self,
        account_id: i64,
        token: &str,
        sent_at: &str,
    ) -> AccountResult<()>;
    async fn clear_reset_token(&self, account_id: i64) -> AccountResult<()>;
    async fn find_by_reset_token(&self, token: &str) -> AccountResult<Option<Account>>;
    async fn update_password(&self, account_id: i64, password_digest: &str) -> AccountResult<()>;
    async fn delete(&self, account_id: i64) -> AccountResult<()>;
}

impl AccountRepo for AccountRepository {
    async fn find_by_id(&self, account_id: i64) -> AccountResult<Option<Account>> {
        self.find_by_id(account_id).await
    }

    async fn find_by_public_id(&self, public_id: &str) -> AccountResult<Option<Account>> {
        self.find_by_public_id(public_id).await
    }

    async fn find_by_email(&self, email: &str) -> AccountResult<Option<Account>> {
        self.find_by_email(email).await
    }

    async fn email_taken(&self, email: &str) -> AccountResult<bool> {
        self.email_taken(email).await
    }

    async fn create(&self, record: &NewAccountRecord) -> AccountResult<Account> {
        self.create(record).await
    }

    async fn update(&self, account_id: i64, changes: &AccountChanges) -> AccountResult<Account> {
        self.update(account_id, changes).await
    }

    async fn rotate_remember_digest(&self, account_id: i64, digest: &str) -> AccountResult<()> {
        self.rotate_remember_digest(account_id, digest).await
    }

    async fn store_reset_token(
        &self,
        account_id: i64,
        token: &str,
        sent_at: &str,
    ) -> AccountResult<()> {
        self.store_reset_token(account_id, token, sent_at).await
    }

    async fn clear_reset_token(&self, account_id: i64) -> AccountResult<()> {
        self.clear_reset_token(account_id).await
    }

    async fn find_by_reset_token(&self, token: &str) -> AccountResult<Option<Account>> {
        self.find_by_reset_token(token).await
    }

    async fn update_password(&self, account_id: i64, password_digest: &str) -> AccountResult<()> {
        self.update_password(account_id, password_digest).await
    }

    async fn delete(&self, account_id: i64) -> AccountResult<()> {
        self.delete(account_id).await
    }
}

impl AccountRepo for MockAccountRepository {
    async fn find_by_id(&self, account_id: i64) -> AccountResult<Option<Account>> {
        self.find_by_id(account_id).await
    }

    async fn find_by_public_id(&self, public_id: &str) -> AccountResult<Option<Account>> {
        self.find_by_public_id(public_id).await
    }

    async fn find_by_email(&self, email: &str) -> AccountResult<Option<Account>> {
        self.find_by_email(email).await
    }

    async fn email_taken(&self, email: &str) -> AccountResult<bool> {
        self.email_taken(email).await
    }

    async fn create(&self, record: &NewAccountRecord) -> AccountResult<Account> {
        self.create(record).await
    }

    async fn update(&self, account_id: i64, changes: &AccountChanges) -> AccountResult<Account> {
        self.update(account_id, changes).await
    }

    async fn rotate_remember_digest(&self, account_id: i64, digest: &str) -> AccountResult<()> {
        self.rotate_remember_digest(account_id, digest).await
    }

    async fn store_reset_token(
        &self,
        account_id: i64,
        token: &str,
        sent_at: &str,
    ) -> AccountResult<()> {
        self.store_reset_token(account_id, token, sent_at).await
    }

    async fn clear_reset_token(&self, account_id: i64) -> AccountResult<()> {
        self.clear_reset_token(account_id).await
    }

    async fn find_by_reset_token(&self, token: &str) -> AccountResult<Option<Account>> {
        self.find_by_reset_token(token).await
    }

    async fn update_password(&self, account_id: i64, password_digest: &str) -> AccountResult<()> {
        self.update_password(account_id, password_digest).await
    }

    async fn delete(&self, account_id: i64) -> AccountResult<()> {
        self.delete(account_id).await
    }
}
