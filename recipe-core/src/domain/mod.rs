//! Core domain entities
//!
//! All business entities are defined here. These are pure data structures
//! with validation logic - no I/O or external dependencies.

pub mod admin;
pub mod credential;
mod ingredient;
mod recipe;
pub mod result;
mod tag;
mod user;

pub use admin::{AddUserForm, UserAdmin};
pub use credential::{Argon2Params, HashSummary};
pub use ingredient::{Ingredient, NewIngredient};
pub use recipe::{NewRecipe, Recipe, RecipeDetail};
pub use tag::{NewTag, Tag};
pub use user::{normalize_email, NewUser, User, UserFields};

use result::{Error, Result};

/// Maximum length of the free-text fields (email, names, titles, links)
pub const MAX_FIELD_LEN: usize = 255;

/// Reject text longer than `MAX_FIELD_LEN` characters
pub(crate) fn validate_text(field: &str, value: &str) -> Result<()> {
    if value.chars().count() > MAX_FIELD_LEN {
        return Err(Error::validation(format!(
            "{} must be at most {} characters",
            field, MAX_FIELD_LEN
        )));
    }
    Ok(())
}
