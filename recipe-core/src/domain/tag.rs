//! Tag domain model

use std::fmt;

use serde::{Deserialize, Serialize};

use super::result::Result;
use super::validate_text;

/// A label a user attaches to their recipes (e.g. "Vegan")
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub id: i64,
    pub user_id: i64,
    pub name: String,
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// A validated tag that has not been persisted yet
#[derive(Debug, Clone)]
pub struct NewTag {
    pub user_id: i64,
    pub name: String,
}

impl NewTag {
    pub fn new(user_id: i64, name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        validate_text("tag name", &name)?;
        Ok(Self { user_id, name })
    }

    pub fn into_tag(self, id: i64) -> Tag {
        Tag {
            id,
            user_id: self.user_id,
            name: self.name,
        }
    }
}
