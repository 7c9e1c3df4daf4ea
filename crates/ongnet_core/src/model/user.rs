//! User account model.
//!
//! # Invariants
//! - `email` is the login identifier and is unique in storage.
//! - `username` is required.
//! - `role` defaults to `UserRole::Individual`.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

pub const EMAIL_MAX_LEN: usize = 254;
pub const USERNAME_MAX_LEN: usize = 150;

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("valid email regex")
});

pub type UserId = Uuid;

/// Account classification.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    /// A person using the network on their own behalf.
    #[default]
    Individual,
    /// A non-governmental organization account.
    Ong,
    /// Platform administrator.
    Admin,
}

impl UserRole {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Individual => "individual",
            Self::Ong => "ong",
            Self::Admin => "admin",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "individual" => Some(Self::Individual),
            "ong" => Some(Self::Ong),
            "admin" => Some(Self::Admin),
            _ => None,
        }
    }
}

/// Registered account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub email: String,
    pub username: String,
    pub role: UserRole,
    pub is_active: bool,
    /// Epoch milliseconds, assigned by storage on insert.
    pub date_joined: i64,
}

impl User {
    /// Builds an active individual account with a fresh id.
    ///
    /// `date_joined` is `0` until the row is read back from storage.
    pub fn new(email: impl Into<String>, username: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            email: normalize_email(&email.into()),
            username: username.into(),
            role: UserRole::default(),
            is_active: true,
            date_joined: 0,
        }
    }

    pub fn with_role(mut self, role: UserRole) -> Self {
        self.role = role;
        self
    }

    pub fn validate(&self) -> Result<(), UserValidationError> {
        let email = self.email.trim();
        if email.is_empty() {
            return Err(UserValidationError::EmptyEmail);
        }
        if email.chars().count() > EMAIL_MAX_LEN {
            return Err(UserValidationError::EmailTooLong(email.chars().count()));
        }
        if !EMAIL_RE.is_match(email) {
            return Err(UserValidationError::InvalidEmail(email.to_string()));
        }

        let username = self.username.trim();
        if username.is_empty() {
            return Err(UserValidationError::EmptyUsername);
        }
        if username.chars().count() > USERNAME_MAX_LEN {
            return Err(UserValidationError::UsernameTooLong(username.chars().count()));
        }
        Ok(())
    }
}

impl Display for User {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.email)
    }
}

/// Trims the address and lowercases its domain part.
///
/// The local part is case-sensitive by RFC and stays untouched. Input without
/// an `@` is only trimmed.
pub fn normalize_email(email: &str) -> String {
    let trimmed = email.trim();
    match trimmed.rsplit_once('@') {
        Some((local, domain)) => format!("{local}@{}", domain.to_lowercase()),
        None => trimmed.to_string(),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserValidationError {
    EmptyEmail,
    EmailTooLong(usize),
    InvalidEmail(String),
    EmptyUsername,
    UsernameTooLong(usize),
}

impl Display for UserValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyEmail => write!(f, "email is required"),
            Self::EmailTooLong(len) => {
                write!(f, "email has {len} characters; maximum is {EMAIL_MAX_LEN}")
            }
            Self::InvalidEmail(value) => write!(f, "invalid email address `{value}`"),
            Self::EmptyUsername => write!(f, "username is required"),
            Self::UsernameTooLong(len) => {
                write!(f, "username has {len} characters; maximum is {USERNAME_MAX_LEN}")
            }
        }
    }
}

impl Error for UserValidationError {}

#[cfg(test)]
mod tests {
    use super::{normalize_email, User, UserRole, UserValidationError};

    #[test]
    fn normalize_email_lowercases_domain_only() {
        assert_eq!(normalize_email("  Ana.Silva@Example.ORG "), "Ana.Silva@example.org");
        assert_eq!(normalize_email("no-at-sign"), "no-at-sign");
    }

    #[test]
    fn new_user_defaults_to_active_individual() {
        let user = User::new("ana@example.org", "ana");
        assert_eq!(user.role, UserRole::Individual);
        assert!(user.is_active);
        assert_eq!(user.to_string(), "ana@example.org");
    }

    #[test]
    fn validate_rejects_malformed_email_and_blank_username() {
        let bad_email = User::new("not-an-email", "ana");
        assert!(matches!(
            bad_email.validate(),
            Err(UserValidationError::InvalidEmail(_))
        ));

        let blank_name = User::new("ana@example.org", "   ");
        assert_eq!(blank_name.validate(), Err(UserValidationError::EmptyUsername));
    }

    #[test]
    fn role_string_mapping_is_stable() {
        for role in [UserRole::Individual, UserRole::Ong, UserRole::Admin] {
            assert_eq!(UserRole::parse(role.as_str()), Some(role));
        }
        assert_eq!(UserRole::parse("user"), None);
    }
}
