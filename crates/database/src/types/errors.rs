//! Error types for the persistence layer

use thiserror::Error;

/// A single field-level validation failure.
///
/// Validation is run explicitly before every write and reported as a list of
/// these, never raised mid-save.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

impl FieldError {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl std::fmt::Display for FieldError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.field, self.message)
    }
}

fn summarize(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(FieldError::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// General database error
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("database connection error: {0}")]
    ConnectionError(String),

    #[error("database migration error: {0}")]
    MigrationError(String),

    #[error("database query error: {0}")]
    QueryError(String),
}

/// Account-specific errors
#[derive(Debug, Error)]
pub enum AccountError {
    #[error("account not found")]
    AccountNotFound,

    #[error("email already taken")]
    EmailTaken,

    #[error("generated token collided with a stored one")]
    TokenCollision,

    #[error("validation failed: {}", summarize(.0))]
    Invalid(Vec<FieldError>),

    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("password reset token is unknown")]
    InvalidResetToken,

    #[error("password reset token has expired")]
    ResetTokenExpired,

    #[error("password hashing failed")]
    PasswordHashingFailed,

    #[error("reset mail dispatch failed: {0}")]
    MailDispatchFailed(String),

    #[error("database error: {0}")]
    DatabaseError(String),
}

/// Follow-graph errors
#[derive(Debug, Error)]
pub enum FollowError {
    #[error("account not found")]
    AccountNotFound,

    #[error("already following this account")]
    AlreadyFollowing,

    #[error("not following this account")]
    NotFollowing,

    #[error("accounts cannot follow themselves")]
    SelfFollow,

    #[error("database error: {0}")]
    DatabaseError(String),
}

/// Micropost errors
#[derive(Debug, Error)]
pub enum MicropostError {
    #[error("account not found")]
    AccountNotFound,

    #[error("micropost not found")]
    MicropostNotFound,

    #[error("validation failed: {}", summarize(.0))]
    Invalid(Vec<FieldError>),

    #[error("database error: {0}")]
    DatabaseError(String),
}

impl From<sqlx::Error> for AccountError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => AccountError::AccountNotFound,
            sqlx::Error::Database(db_err) => {
                let message = db_err.message();
                if message.contains("UNIQUE constraint failed") {
                    if message.contains("accounts.email") {
                        AccountError::EmailTaken
                    } else if message.contains("accounts.remember_digest")
                        || message.contains("accounts.password_reset_token")
                    {
                        AccountError::TokenCollision
                    } else {
                        AccountError::DatabaseError(message.to_string())
                    }
                } else {
                    AccountError::DatabaseError(message.to_string())
                }
            }
            _ => AccountError::DatabaseError(err.to_string()),
        }
    }
}

impl From<sqlx::Error> for FollowError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => FollowError::NotFollowing,
            sqlx::Error::Database(db_err) => {
                let message = db_err.message();
                if message.contains("UNIQUE constraint failed") {
                    FollowError::AlreadyFollowing
                } else if message.contains("FOREIGN KEY constraint failed") {
                    FollowError::AccountNotFound
                } else if message.contains("CHECK constraint failed") {
                    FollowError::SelfFollow
                } else {
                    FollowError::DatabaseError(message.to_string())
                }
            }
            _ => FollowError::DatabaseError(err.to_string()),
        }
    }
}

impl From<sqlx::Error> for MicropostError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => MicropostError::MicropostNotFound,
            sqlx::Error::Database(db_err) => {
                let message = db_err.message();
                if message.contains("FOREIGN KEY constraint failed") {
                    MicropostError::AccountNotFound
                } else {
                    MicropostError::DatabaseError(message.to_string())
                }
            }
            _ => MicropostError::DatabaseError(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        assert_eq!(AccountError::AccountNotFound.to_string(), "account not found");
        assert_eq!(FollowError::NotFollowing.to_string(), "not following this account");

        let invalid = AccountError::Invalid(vec![
            FieldError::new("name", "can't be blank"),
            FieldError::new("password", "is too short (minimum is 6 characters)"),
        ]);
        assert_eq!(
            invalid.to_string(),
            "validation failed: name can't be blank, password is too short (minimum is 6 characters)"
        );
    }

    #[test]
    fn test_row_not_found_maps_per_domain() {
        assert!(matches!(
            AccountError::from(sqlx::Error::RowNotFound),
            AccountError::AccountNotFound
        ));
        assert!(matches!(
            FollowError::from(sqlx::Error::RowNotFound),
            FollowError::NotFollowing
        ));
        assert!(matches!(
            MicropostError::from(sqlx::Error::RowNotFound),
            MicropostError::MicropostNotFound
        ));
    }
}
