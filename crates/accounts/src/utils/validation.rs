//! Input validation utilities.
//!
//! Every write path runs these explicitly and collects the failures into a
//! list of field-level errors; nothing is validated implicitly at save time.

use feedline_database::FieldError;
use regex::Regex;
use std::sync::OnceLock;

pub const NAME_MAX: usize = 50;
pub const EMAIL_MAX: usize = 255;
pub const PASSWORD_MIN: usize = 6;
pub const PASSWORD_MAX: usize = 128;
pub const CONTENT_MAX: usize = 140;

fn email_regex() -> &'static Regex {
    static EMAIL_REGEX: OnceLock<Regex> = OnceLock::new();
    EMAIL_REGEX.get_or_init(|| {
        Regex::new(r"(?i)^[\w+\-.]+@[a-z\d\-]+(?:\.[a-z\d\-]+)*\.[a-z]+$").unwrap()
    })
}

/// Validate a display name
pub fn validate_name(name: &str) -> Option<FieldError> {
    if name.trim().is_empty() {
        return Some(FieldError::new("name", "can't be blank"));
    }

    if name.chars().count() > NAME_MAX {
        return Some(FieldError::new(
            "name",
            format!("is too long (maximum is {NAME_MAX} characters)"),
        ));
    }

    None
}

/// Validate email format
pub fn validate_email(email: &str) -> Option<FieldError> {
    if email.trim().is_empty() {
        return Some(FieldError::new("email", "can't be blank"));
    }

    if email.len() > EMAIL_MAX {
        return Some(FieldError::new(
            "email",
            format!("is too long (maximum is {EMAIL_MAX} characters)"),
        ));
    }

    if !email_regex().is_match(email) {
        return Some(FieldError::new("email", "is invalid"));
    }

    None
}

/// Validate a password value.
///
/// Callers decide when a password is required: always on signup, on update
/// only when a new value is supplied.
pub fn validate_password(password: &str) -> Option<FieldError> {
    if password.is_empty() {
        return Some(FieldError::new("password", "can't be blank"));
    }

    if password.chars().count() < PASSWORD_MIN {
        return Some(FieldError::new(
            "password",
            format!("is too short (minimum is {PASSWORD_MIN} characters)"),
        ));
    }

    if password.chars().count() > PASSWORD_MAX {
        return Some(FieldError::new(
            "password",
            format!("is too long (maximum is {PASSWORD_MAX} characters)"),
        ));
    }

    None
}

/// Validate micropost content
pub fn validate_content(content: &str) -> Option<FieldError> {
    if content.trim().is_empty() {
        return Some(FieldError::new("content", "can't be blank"));
    }

    if content.chars().count() > CONTENT_MAX {
        return Some(FieldError::new(
            "content",
            format!("is too long (maximum is {CONTENT_MAX} characters)"),
        ));
    }

    None
}

/// Validate a full signup, collecting every field failure
pub fn validate_signup(name: &str, email: &str, password: &str) -> Vec<FieldError> {
    [
        validate_name(name),
        validate_email(email),
        validate_password(password),
    ]
    .into_iter()
    .flatten()
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_validation() {
        assert!(validate_name("Jo").is_none());
        assert!(validate_name(&"a".repeat(50)).is_none());

        assert!(validate_name("").is_some());
        assert!(validate_name("   ").is_some());
        assert!(validate_name(&"a".repeat(51)).is_some());
    }

    #[test]
    fn test_email_validation() {
        assert!(validate_email("test@example.com").is_none());
        assert!(validate_email("user.name+tag@domain.co.uk").is_none());
        assert!(validate_email("UPPER@EXAMPLE.COM").is_none());

        assert!(validate_email("invalid-email").is_some());
        assert!(validate_email("@example.com").is_some());
        assert!(validate_email("test@").is_some());
        assert!(validate_email("test@example,com").is_some());
        assert!(validate_email("foo@bar_baz.com").is_some());
        assert!(validate_email(&format!("{}@example.com", "a".repeat(250))).is_some());
    }

    #[test]
    fn test_password_validation() {
        // six characters is the floor
        assert!(validate_password("12345").is_some());
        assert!(validate_password("123456").is_none());
        assert!(validate_password("perfectly long password").is_none());

        assert!(validate_password("").is_some());
        assert!(validate_password(&"a".repeat(129)).is_some());
    }

    #[test]
    fn test_content_validation() {
        assert!(validate_content("hello world").is_none());
        assert!(validate_content(&"a".repeat(140)).is_none());

        assert!(validate_content("").is_some());
        assert!(validate_content("  ").is_some());
        assert!(validate_content(&"a".repeat(141)).is_some());
    }

    #[test]
    fn test_signup_validation_collects_all_failures() {
        let errors = validate_signup("", "not-an-email", "123");
        let fields: Vec<&str> = errors.iter().map(|e| e.field).collect();

        assert_eq!(fields, vec!["name", "email", "password"]);

        assert!(validate_signup("Jo", "jo@example.com", "123456").is_empty());
    }
}
