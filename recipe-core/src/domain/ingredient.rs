//! Ingredient domain model

use std::fmt;

use serde::{Deserialize, Serialize};

use super::result::Result;
use super::validate_text;

/// An ingredient in a user's pantry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ingredient {
    pub id: i64,
    pub user_id: i64,
    pub name: String,
}

impl fmt::Display for Ingredient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

#[derive(Debug, Clone)]
pub struct NewIngredient {
    pub user_id: i64,
    pub name: String,
}

impl NewIngredient {
    pub fn new(user_id: i64, name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        validate_text("ingredient name", &name)?;
        Ok(Self { user_id, name })
    }

    pub fn into_ingredient(self, id: i64) -> Ingredient {
        Ingredient {
            id,
            user_id: self.user_id,
            name: self.name,
        }
    }
}
