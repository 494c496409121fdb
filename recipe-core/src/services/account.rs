//! Account manager - user creation, validation and authentication

use std::sync::Arc;

use chrono::Utc;

use crate::domain::result::{Error, Result};
use crate::domain::{normalize_email, NewUser, User, UserFields};
use crate::ports::Repository;

use super::CredentialStore;

/// Creates and authenticates user accounts
///
/// Every create call is all-or-nothing: the email is validated and
/// normalized and the password hashed before anything is written, and the
/// write itself is a single insert.
pub struct AccountManager {
    repository: Arc<dyn Repository>,
    credentials: CredentialStore,
}

impl AccountManager {
    pub fn new(repository: Arc<dyn Repository>, credentials: CredentialStore) -> Self {
        Self {
            repository,
            credentials,
        }
    }

    /// Create a regular user.
    ///
    /// Fails with `Error::Validation` when the email is missing or blank and
    /// with `Error::Uniqueness` when the normalized email is taken. The
    /// returned user's `password` is the hash, never the plaintext.
    pub fn create_user(
        &self,
        email: Option<&str>,
        password: &str,
        extra_fields: UserFields,
    ) -> Result<User> {
        let email = normalize_email(email)?;

        if self.repository.find_user_by_email(&email)?.is_some() {
            return Err(Error::uniqueness(format!(
                "A user with email {} already exists",
                email
            )));
        }

        let password_hash = self.credentials.hash(password)?;
        let draft = NewUser::new(email, password_hash, extra_fields)?;
        let id = self.repository.insert_user(&draft)?;

        Ok(draft.into_user(id))
    }

    /// Create a user with staff and superuser rights
    pub fn create_superuser(&self, email: Option<&str>, password: &str) -> Result<User> {
        let fields = UserFields::default().staff(true).superuser(true);
        self.create_user(email, password, fields)
    }

    /// Check a plaintext password against a user's stored hash
    pub fn check_password(&self, user: &User, password: &str) -> bool {
        self.credentials.verify(password, &user.password)
    }

    /// Look up a user by email and check the password.
    ///
    /// Returns `None` for unknown emails, wrong passwords and inactive
    /// users. On success `last_login` is set to the current time.
    pub fn authenticate(&self, email: &str, password: &str) -> Result<Option<User>> {
        let email = normalize_email(Some(email))?;
        let Some(mut user) = self.repository.find_user_by_email(&email)? else {
            return Ok(None);
        };

        if !user.is_active || !self.check_password(&user, password) {
            return Ok(None);
        }

        let now = Utc::now();
        self.repository.update_last_login(user.id, now)?;
        user.last_login = Some(now);
        Ok(Some(user))
    }

    /// Replace a user's password
    pub fn set_password(&self, user_id: i64, password: &str) -> Result<User> {
        if password.is_empty() {
            return Err(Error::validation("Password must not be empty"));
        }
        let mut user = self.require_user(user_id)?;
        let hash = self.credentials.hash(password)?;
        self.repository.update_password(user_id, &hash)?;
        user.password = hash;
        Ok(user)
    }

    pub fn get_user(&self, id: i64) -> Result<Option<User>> {
        self.repository.get_user(id)
    }

    /// Find a user by email, applying the same normalization as creation
    pub fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        let email = normalize_email(Some(email))?;
        self.repository.find_user_by_email(&email)
    }

    pub fn list_users(&self) -> Result<Vec<User>> {
        self.repository.list_users()
    }

    /// Delete a user and everything they own. Returns false if no such user.
    pub fn delete_user(&self, id: i64) -> Result<bool> {
        self.repository.delete_user_cascade(id)
    }

    pub(crate) fn require_user(&self, id: i64) -> Result<User> {
        self.repository
            .get_user(id)?
            .ok_or_else(|| Error::not_found(format!("User {}", id)))
    }
}
