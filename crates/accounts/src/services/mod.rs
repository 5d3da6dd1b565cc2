//! Business logic layer

pub mod account_service;
pub mod follow_service;
pub mod mailer;
pub mod micropost_service;
pub mod mock_repositories;

pub use account_service::{AccountRepo, AccountService};
pub use follow_service::{FollowRepo, FollowService};
pub use mailer::{LogMailer, MailError, Mailer, MockMailer};
pub use micropost_service::{MicropostRepo, MicropostService, FEED_LIMIT_MAX};
pub use mock_repositories::{
    MockAccountRepository, MockFollowRepository, MockMicropostRepository,
};
