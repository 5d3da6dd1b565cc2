//! # Feedline Accounts Crate
//!
//! This crate provides the account domain for the Feedline backend: signup
//! with explicit validation, password credentials, remember and reset
//! tokens, the directed follow graph, and microposts with an aggregated
//! feed.
//!
//! ## Architecture
//!
//! - **Entities**: Domain request types (Signup, ProfileChanges)
//! - **Services**: Business logic layer, generic over repository traits
//! - **Utils**: Validation, password hashing, token material
//!
//! Row entities and repositories live in `feedline-database` and are
//! re-exported here for convenience.
//!
//! ## Usage
//!
//! ```no_run
//! use feedline_accounts::{AccountService, Signup};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let config = feedline_config::load()?;
//! let pool = feedline_database::initialize_database(&config.database).await?;
//!
//! let service = AccountService::new(pool, config.mailer);
//! let account = service
//!     .sign_up(Signup {
//!         name: "Ada".to_string(),
//!         email: "Ada@Example.com".to_string(),
//!         password: "correct horse".to_string(),
//!     })
//!     .await?;
//! assert_eq!(account.email, "ada@example.com");
//! # Ok(())
//! # }
//! ```

pub mod entities;
pub mod services;
pub mod utils;

// Re-export database types and repositories
pub use feedline_database::{
    Account, AccountChanges, AccountError, AccountRepository, AccountResult, FieldError,
    FollowError, FollowResult, Micropost, MicropostError, MicropostRepository, MicropostResult,
    NewAccountRecord, NewMicropost, Relationship, RelationshipRepository,
};

// Re-export main types for convenience
pub use entities::{ProfileChanges, Signup};
pub use services::{
    AccountRepo, AccountService, FollowRepo, FollowService, LogMailer, MailError, Mailer,
    MicropostRepo, MicropostService,
};
