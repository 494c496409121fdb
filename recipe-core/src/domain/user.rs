//! User domain model

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::result::{Error, Result};
use super::MAX_FIELD_LEN;

/// An account, identified by its email address
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    /// Normalized (lower-cased) email, unique across users
    pub email: String,
    /// Argon2 PHC string, never the plaintext
    #[serde(skip_serializing, default)]
    pub password: String,
    pub name: String,
    pub is_active: bool,
    pub is_staff: bool,
    pub is_superuser: bool,
    pub last_login: Option<DateTime<Utc>>,
}

impl fmt::Display for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.email)
    }
}

/// Optional fields accepted on top of email and password when creating a user
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserFields {
    pub name: Option<String>,
    pub is_active: Option<bool>,
    pub is_staff: Option<bool>,
    pub is_superuser: Option<bool>,
}

impl UserFields {
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn staff(mut self, is_staff: bool) -> Self {
        self.is_staff = Some(is_staff);
        self
    }

    pub fn superuser(mut self, is_superuser: bool) -> Self {
        self.is_superuser = Some(is_superuser);
        self
    }

    pub fn active(mut self, is_active: bool) -> Self {
        self.is_active = Some(is_active);
        self
    }
}

/// A validated user that has not been persisted yet
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub password: String,
    pub name: String,
    pub is_active: bool,
    pub is_staff: bool,
    pub is_superuser: bool,
}

impl NewUser {
    /// Build a user draft from a normalized email, a password hash and the extra fields
    pub fn new(email: String, password_hash: String, fields: UserFields) -> Result<Self> {
        let name = fields.name.unwrap_or_default();
        if name.chars().count() > MAX_FIELD_LEN {
            return Err(Error::validation(format!(
                "name must be at most {} characters",
                MAX_FIELD_LEN
            )));
        }
        Ok(Self {
            email,
            password: password_hash,
            name,
            is_active: fields.is_active.unwrap_or(true),
            is_staff: fields.is_staff.unwrap_or(false),
            is_superuser: fields.is_superuser.unwrap_or(false),
        })
    }

    /// Attach the identifier assigned by the repository
    pub fn into_user(self, id: i64) -> User {
        User {
            id,
            email: self.email,
            password: self.password,
            name: self.name,
            is_active: self.is_active,
            is_staff: self.is_staff,
            is_superuser: self.is_superuser,
            last_login: None,
        }
    }
}

/// Normalize an email for storage and lookup.
///
/// The whole address is trimmed and lower-cased, so `test@GMAIL.COM` and
/// `TEST@gmail.com` name the same account. A missing, empty or blank email
/// is rejected.
pub fn normalize_email(email: Option<&str>) -> Result<String> {
    let email = email
        .map(str::trim)
        .filter(|e| !e.is_empty())
        .ok_or_else(|| Error::validation("Users must have an email address"))?;

    if email.chars().count() > MAX_FIELD_LEN {
        return Err(Error::validation(format!(
            "email must be at most {} characters",
            MAX_FIELD_LEN
        )));
    }

    Ok(email.to_lowercase())
}
