//! Repository port - persistence abstraction

use chrono::{DateTime, Utc};

use crate::domain::result::Result;
use crate::domain::{Ingredient, NewIngredient, NewRecipe, NewTag, NewUser, Recipe, Tag, User};

/// Persistence abstraction for users and the entities they own
///
/// Implementations (adapters) enforce email uniqueness: inserting a user
/// whose email already exists fails with `Error::Uniqueness`, even when two
/// callers race past the service's own lookup. Inserts either persist the
/// whole record or nothing.
pub trait Repository: Send + Sync {
    // === Users ===

    /// Insert a new user and return its identifier
    fn insert_user(&self, user: &NewUser) -> Result<i64>;

    /// Find a user by (already normalized) email
    fn find_user_by_email(&self, email: &str) -> Result<Option<User>>;

    /// Get a user by identifier
    fn get_user(&self, id: i64) -> Result<Option<User>>;

    /// All users, ordered by identifier
    fn list_users(&self) -> Result<Vec<User>>;

    /// Record a successful login
    fn update_last_login(&self, id: i64, at: DateTime<Utc>) -> Result<()>;

    /// Replace the stored password hash
    fn update_password(&self, id: i64, password_hash: &str) -> Result<()>;

    /// Delete a user together with their tags, ingredients, recipes and
    /// recipe links. Returns false when the user does not exist.
    fn delete_user_cascade(&self, id: i64) -> Result<bool>;

    // === Tags ===

    fn insert_tag(&self, tag: &NewTag) -> Result<i64>;

    fn get_tag(&self, id: i64) -> Result<Option<Tag>>;

    /// Tags owned by a user, ordered by name
    fn list_tags(&self, user_id: i64) -> Result<Vec<Tag>>;

    // === Ingredients ===

    fn insert_ingredient(&self, ingredient: &NewIngredient) -> Result<i64>;

    fn get_ingredient(&self, id: i64) -> Result<Option<Ingredient>>;

    /// Ingredients owned by a user, ordered by name
    fn list_ingredients(&self, user_id: i64) -> Result<Vec<Ingredient>>;

    // === Recipes ===

    fn insert_recipe(&self, recipe: &NewRecipe) -> Result<i64>;

    fn get_recipe(&self, id: i64) -> Result<Option<Recipe>>;

    /// Recipes owned by a user, ordered by identifier
    fn list_recipes(&self, user_id: i64) -> Result<Vec<Recipe>>;

    /// Link a tag to a recipe (no-op when already linked)
    fn link_recipe_tag(&self, recipe_id: i64, tag_id: i64) -> Result<()>;

    /// Link an ingredient to a recipe (no-op when already linked)
    fn link_recipe_ingredient(&self, recipe_id: i64, ingredient_id: i64) -> Result<()>;

    /// Tags linked to a recipe, ordered by name
    fn recipe_tags(&self, recipe_id: i64) -> Result<Vec<Tag>>;

    /// Ingredients linked to a recipe, ordered by name
    fn recipe_ingredients(&self, recipe_id: i64) -> Result<Vec<Ingredient>>;
}
