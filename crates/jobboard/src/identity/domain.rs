use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::ids::UserId;

/// Account kind. Applicants apply for jobs; companies post jobs and review applications.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Applicant,
    Company,
}

impl Role {
    pub const fn label(self) -> &'static str {
        match self {
            Role::Applicant => "applicant",
            Role::Company => "company",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Stored account record. The password hash never leaves the identity module;
/// responses go through [`UserView`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn view(&self) -> UserView {
        UserView {
            id: self.id.clone(),
            name: self.name.clone(),
            email: self.email.clone(),
            role: self.role,
            created_at: self.created_at,
        }
    }
}

/// Sanitized account shape returned by the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserView {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SignUpRequest {
    #[validate(custom(function = "validate_name"))]
    pub name: String,
    #[validate(email(message = "invalid email format"))]
    pub email: String,
    #[validate(custom(function = "validate_password"))]
    pub password: String,
    pub role: Role,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email(message = "invalid email format"))]
    pub email: String,
    #[validate(length(min = 1, message = "password is required"))]
    pub password: String,
}

/// Token plus the account it was issued for.
#[derive(Debug, Clone, Serialize)]
pub struct AuthSession {
    pub token: String,
    pub user: UserView,
}

const PASSWORD_SPECIALS: &str = "!@#$%^&*()_+-=[]{};':\"\\|,.<>/?";

/// Letters and spaces only, 2 to 100 characters once trimmed.
pub(crate) fn validate_name(name: &str) -> Result<(), ValidationError> {
    let trimmed = name.trim();
    let length = trimmed.chars().count();
    if !(2..=100).contains(&length) {
        return Err(with_message("name_length", "name must be 2 to 100 characters"));
    }
    if !trimmed
        .chars()
        .all(|c| c.is_ascii_alphabetic() || c.is_whitespace())
    {
        return Err(with_message(
            "name_charset",
            "name must contain only letters and spaces",
        ));
    }
    Ok(())
}

/// At least 8 characters with an uppercase letter, a lowercase letter, a digit
/// and a special character.
pub(crate) fn validate_password(password: &str) -> Result<(), ValidationError> {
    let long_enough = password.chars().count() >= 8;
    let upper = password.chars().any(|c| c.is_ascii_uppercase());
    let lower = password.chars().any(|c| c.is_ascii_lowercase());
    let digit = password.chars().any(|c| c.is_ascii_digit());
    let special = password.chars().any(|c| PASSWORD_SPECIALS.contains(c));

    if long_enough && upper && lower && digit && special {
        Ok(())
    } else {
        Err(with_message(
            "password_strength",
            "password must be at least 8 characters long and contain an uppercase letter, a lowercase letter, a number, and a special character",
        ))
    }
}

fn with_message(code: &'static str, message: &'static str) -> ValidationError {
    let mut error = ValidationError::new(code);
    error.message = Some(message.into());
    error
}

pub(crate) fn normalize_email(email: &str) -> String {
    email.trim().to_ascii_lowercase()
}
