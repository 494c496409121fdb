//! Recipe domain model

use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::result::{Error, Result};
use super::{validate_text, Ingredient, Tag};

/// Number of fractional digits stored for a cost
pub const COST_DECIMAL_PLACES: u32 = 2;

/// Largest cost a recipe can carry (five digits, two of them fractional)
pub fn max_cost() -> Decimal {
    Decimal::new(99_999, COST_DECIMAL_PLACES)
}

/// A recipe owned by a user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recipe {
    pub id: i64,
    pub user_id: i64,
    pub title: String,
    pub time_minutes: i32,
    pub cost: Decimal,
    pub link: Option<String>,
}

impl fmt::Display for Recipe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.title)
    }
}

/// A validated recipe that has not been persisted yet
#[derive(Debug, Clone)]
pub struct NewRecipe {
    pub user_id: i64,
    pub title: String,
    pub time_minutes: i32,
    pub cost: Decimal,
    pub link: Option<String>,
}

impl NewRecipe {
    /// Validate the recipe fields.
    ///
    /// `time_minutes` must be between 0 and `i32::MAX`; `cost` must be between
    /// 0 and 999.99 with at most two fractional digits. The stored cost always
    /// carries two decimal places (`5` becomes `5.00`).
    pub fn new(
        user_id: i64,
        title: impl Into<String>,
        time_minutes: i64,
        cost: Decimal,
    ) -> Result<Self> {
        let title = title.into();
        validate_text("title", &title)?;

        if time_minutes < 0 {
            return Err(Error::validation("time_minutes must not be negative"));
        }
        let time_minutes = i32::try_from(time_minutes)
            .map_err(|_| Error::validation("time_minutes is too large"))?;

        Ok(Self {
            user_id,
            title,
            time_minutes,
            cost: normalize_cost(cost)?,
            link: None,
        })
    }

    pub fn with_link(mut self, link: impl Into<String>) -> Result<Self> {
        let link = link.into();
        validate_text("link", &link)?;
        self.link = if link.trim().is_empty() { None } else { Some(link) };
        Ok(self)
    }

    pub fn into_recipe(self, id: i64) -> Recipe {
        Recipe {
            id,
            user_id: self.user_id,
            title: self.title,
            time_minutes: self.time_minutes,
            cost: self.cost,
            link: self.link,
        }
    }
}

fn normalize_cost(cost: Decimal) -> Result<Decimal> {
    if cost.is_sign_negative() && !cost.is_zero() {
        return Err(Error::validation("cost must not be negative"));
    }
    if cost.normalize().scale() > COST_DECIMAL_PLACES {
        return Err(Error::validation(format!(
            "cost must have at most {} decimal places",
            COST_DECIMAL_PLACES
        )));
    }
    if cost > max_cost() {
        return Err(Error::validation(format!(
            "cost must not exceed {}",
            max_cost()
        )));
    }

    let mut cost = cost.abs();
    cost.rescale(COST_DECIMAL_PLACES);
    Ok(cost)
}

/// A recipe together with the tags and ingredients linked to it
#[derive(Debug, Clone, Serialize)]
pub struct RecipeDetail {
    #[serde(flatten)]
    pub recipe: Recipe,
    pub tags: Vec<Tag>,
    pub ingredients: Vec<Ingredient>,
}
