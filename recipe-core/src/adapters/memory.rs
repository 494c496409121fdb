//! In-memory repository
//!
//! Implements the Repository port with plain collections behind a mutex.
//! Used by service tests and by callers that want a scratch store without
//! touching disk. Enforces the same invariants as the DuckDB adapter.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Utc};

use crate::domain::result::{Error, Result};
use crate::domain::{Ingredient, NewIngredient, NewRecipe, NewTag, NewUser, Recipe, Tag, User};
use crate::ports::Repository;

#[derive(Debug, Default)]
struct State {
    next_id: i64,
    users: BTreeMap<i64, User>,
    tags: BTreeMap<i64, Tag>,
    ingredients: BTreeMap<i64, Ingredient>,
    recipes: BTreeMap<i64, Recipe>,
    recipe_tags: BTreeSet<(i64, i64)>,
    recipe_ingredients: BTreeSet<(i64, i64)>,
}

impl State {
    fn allocate_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }
}

/// Repository backed by in-process collections
#[derive(Debug, Default)]
pub struct InMemoryRepository {
    state: Mutex<State>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, State>> {
        self.state
            .lock()
            .map_err(|e| Error::database(format!("Lock poisoned: {}", e)))
    }
}

fn sorted_by_name<T, F>(mut items: Vec<T>, key: F) -> Vec<T>
where
    F: Fn(&T) -> (String, i64),
{
    items.sort_by_key(|item| key(item));
    items
}

impl Repository for InMemoryRepository {
    fn insert_user(&self, user: &NewUser) -> Result<i64> {
        let mut state = self.lock()?;
        if state.users.values().any(|u| u.email == user.email) {
            return Err(Error::uniqueness(format!(
                "A user with email {} already exists",
                user.email
            )));
        }
        let id = state.allocate_id();
        state.users.insert(id, user.clone().into_user(id));
        Ok(id)
    }

    fn find_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let state = self.lock()?;
        Ok(state.users.values().find(|u| u.email == email).cloned())
    }

    fn get_user(&self, id: i64) -> Result<Option<User>> {
        Ok(self.lock()?.users.get(&id).cloned())
    }

    fn list_users(&self) -> Result<Vec<User>> {
        Ok(self.lock()?.users.values().cloned().collect())
    }

    fn update_last_login(&self, id: i64, at: DateTime<Utc>) -> Result<()> {
        let mut state = self.lock()?;
        let user = state
            .users
            .get_mut(&id)
            .ok_or_else(|| Error::not_found(format!("User {}", id)))?;
        user.last_login = Some(at);
        Ok(())
    }

    fn update_password(&self, id: i64, password_hash: &str) -> Result<()> {
        let mut state = self.lock()?;
        let user = state
            .users
            .get_mut(&id)
            .ok_or_else(|| Error::not_found(format!("User {}", id)))?;
        user.password = password_hash.to_string();
        Ok(())
    }

    fn delete_user_cascade(&self, id: i64) -> Result<bool> {
        let mut state = self.lock()?;
        let owned_recipes: BTreeSet<i64> = state
            .recipes
            .values()
            .filter(|r| r.user_id == id)
            .map(|r| r.id)
            .collect();

        state
            .recipe_tags
            .retain(|(recipe_id, _)| !owned_recipes.contains(recipe_id));
        state
            .recipe_ingredients
            .retain(|(recipe_id, _)| !owned_recipes.contains(recipe_id));
        state.recipes.retain(|_, r| r.user_id != id);
        state.tags.retain(|_, t| t.user_id != id);
        state.ingredients.retain(|_, i| i.user_id != id);

        Ok(state.users.remove(&id).is_some())
    }

    fn insert_tag(&self, tag: &NewTag) -> Result<i64> {
        let mut state = self.lock()?;
        let id = state.allocate_id();
        state.tags.insert(id, tag.clone().into_tag(id));
        Ok(id)
    }

    fn get_tag(&self, id: i64) -> Result<Option<Tag>> {
        Ok(self.lock()?.tags.get(&id).cloned())
    }

    fn list_tags(&self, user_id: i64) -> Result<Vec<Tag>> {
        let state = self.lock()?;
        let tags: Vec<Tag> = state
            .tags
            .values()
            .filter(|t| t.user_id == user_id)
            .cloned()
            .collect();
        Ok(sorted_by_name(tags, |t: &Tag| (t.name.clone(), t.id)))
    }

    fn insert_ingredient(&self, ingredient: &NewIngredient) -> Result<i64> {
        let mut state = self.lock()?;
        let id = state.allocate_id();
        state
            .ingredients
            .insert(id, ingredient.clone().into_ingredient(id));
        Ok(id)
    }

    fn get_ingredient(&self, id: i64) -> Result<Option<Ingredient>> {
        Ok(self.lock()?.ingredients.get(&id).cloned())
    }

    fn list_ingredients(&self, user_id: i64) -> Result<Vec<Ingredient>> {
        let state = self.lock()?;
        let ingredients: Vec<Ingredient> = state
            .ingredients
            .values()
            .filter(|i| i.user_id == user_id)
            .cloned()
            .collect();
        Ok(sorted_by_name(ingredients, |i: &Ingredient| {
            (i.name.clone(), i.id)
        }))
    }

    fn insert_recipe(&self, recipe: &NewRecipe) -> Result<i64> {
        let mut state = self.lock()?;
        let id = state.allocate_id();
        state.recipes.insert(id, recipe.clone().into_recipe(id));
        Ok(id)
    }

    fn get_recipe(&self, id: i64) -> Result<Option<Recipe>> {
        Ok(self.lock()?.recipes.get(&id).cloned())
    }

    fn list_recipes(&self, user_id: i64) -> Result<Vec<Recipe>> {
        let state = self.lock()?;
        Ok(state
            .recipes
            .values()
            .filter(|r| r.user_id == user_id)
            .cloned()
            .collect())
    }

    fn link_recipe_tag(&self, recipe_id: i64, tag_id: i64) -> Result<()> {
        self.lock()?.recipe_tags.insert((recipe_id, tag_id));
        Ok(())
    }

    fn link_recipe_ingredient(&self, recipe_id: i64, ingredient_id: i64) -> Result<()> {
        self.lock()?
            .recipe_ingredients
            .insert((recipe_id, ingredient_id));
        Ok(())
    }

    fn recipe_tags(&self, recipe_id: i64) -> Result<Vec<Tag>> {
        let state = self.lock()?;
        let tags: Vec<Tag> = state
            .recipe_tags
            .iter()
            .filter(|(r, _)| *r == recipe_id)
            .filter_map(|(_, t)| state.tags.get(t).cloned())
            .collect();
        Ok(sorted_by_name(tags, |t: &Tag| (t.name.clone(), t.id)))
    }

    fn recipe_ingredients(&self, recipe_id: i64) -> Result<Vec<Ingredient>> {
        let state = self.lock()?;
        let ingredients: Vec<Ingredient> = state
            .recipe_ingredients
            .iter()
            .filter(|(r, _)| *r == recipe_id)
            .filter_map(|(_, i)| state.ingredients.get(i).cloned())
            .collect();
        Ok(sorted_by_name(ingredients, |i: &Ingredient| {
            (i.name.clone(), i.id)
        }))
    }
}
