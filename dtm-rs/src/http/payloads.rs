//! Request and response bodies for the `/users` surface.

use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::users::User;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

/// OAuth2-style password login form.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct Token {
    pub access_token: String,
    pub token_type: &'static str,
}

impl Token {
    pub fn bearer(access_token: String) -> Self {
        Self {
            access_token,
            token_type: "bearer",
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct UserRegister {
    pub username: String,
    pub email_address: String,
    pub password: String,
    pub name: String,
}

impl UserRegister {
    /// Field validation before any storage access. The first failing rule
    /// wins.
    pub fn validate(&self) -> Result<(), String> {
        if self.username.chars().count() < 4 {
            return Err(String::from("Username must be at least 4 characters long"));
        }
        if !is_valid_email(&self.email_address) {
            return Err(String::from("value is not a valid email address"));
        }
        if self.password.chars().count() < 8 {
            return Err(String::from("Password must be at least 8 characters long"));
        }
        if self.name.is_empty() {
            return Err(String::from("name cannot be empty"));
        }
        Ok(())
    }
}

/// Projection safe for external exposure; the password hash never leaves the
/// store layer.
#[derive(Debug, Serialize)]
pub struct UserPublic {
    pub username: String,
    pub email_address: String,
    pub is_active: bool,
    pub is_superuser: bool,
    pub name: String,
}

impl From<User> for UserPublic {
    fn from(user: User) -> Self {
        Self {
            username: user.username,
            email_address: user.email_address,
            is_active: user.is_active,
            is_superuser: user.is_superuser,
            name: user.name,
        }
    }
}

fn is_valid_email(value: &str) -> bool {
    static EMAIL: OnceLock<Regex> = OnceLock::new();
    EMAIL
        .get_or_init(|| {
            Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("email pattern is valid")
        })
        .is_match(value)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::UserRegister;

    fn registration() -> UserRegister {
        UserRegister {
            username: String::from("alice"),
            email_address: String::from("alice@example.com"),
            password: String::from("password123"),
            name: String::from("Alice"),
        }
    }

    #[test]
    fn valid_registration_passes() {
        assert!(registration().validate().is_ok());
    }

    #[test]
    fn short_username_is_rejected() {
        let mut payload = registration();
        payload.username = String::from("abc");
        assert_eq!(
            payload.validate().unwrap_err(),
            "Username must be at least 4 characters long"
        );
    }

    #[test]
    fn malformed_email_is_rejected() {
        let mut payload = registration();
        payload.email_address = String::from("not-an-email");
        assert!(payload.validate().is_err());
    }

    #[test]
    fn short_password_is_rejected() {
        let mut payload = registration();
        payload.password = String::from("short");
        assert_eq!(
            payload.validate().unwrap_err(),
            "Password must be at least 8 characters long"
        );
    }

    #[test]
    fn empty_name_is_rejected() {
        let mut payload = registration();
        payload.name = String::new();
        assert_eq!(payload.validate().unwrap_err(), "name cannot be empty");
    }
}
