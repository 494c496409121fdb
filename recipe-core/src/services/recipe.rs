//! Recipe service - tags, ingredients and recipes owned by a user

use std::sync::Arc;

use rust_decimal::Decimal;

use crate::domain::result::{Error, Result};
use crate::domain::{
    Ingredient, NewIngredient, NewRecipe, NewTag, Recipe, RecipeDetail, Tag, User,
};
use crate::ports::Repository;

/// Recipe service for user-owned entities
pub struct RecipeService {
    repository: Arc<dyn Repository>,
}

impl RecipeService {
    pub fn new(repository: Arc<dyn Repository>) -> Self {
        Self { repository }
    }

    pub fn create_tag(&self, user: &User, name: &str) -> Result<Tag> {
        self.require_owner(user.id)?;
        let draft = NewTag::new(user.id, name)?;
        let id = self.repository.insert_tag(&draft)?;
        Ok(draft.into_tag(id))
    }

    pub fn create_ingredient(&self, user: &User, name: &str) -> Result<Ingredient> {
        self.require_owner(user.id)?;
        let draft = NewIngredient::new(user.id, name)?;
        let id = self.repository.insert_ingredient(&draft)?;
        Ok(draft.into_ingredient(id))
    }

    /// Create a recipe with no link
    pub fn create_recipe(
        &self,
        user: &User,
        title: &str,
        time_minutes: i64,
        cost: Decimal,
    ) -> Result<Recipe> {
        let draft = NewRecipe::new(user.id, title, time_minutes, cost)?;
        self.insert_recipe(draft)
    }

    /// Persist a recipe built with `NewRecipe`, e.g. one carrying a link
    pub fn insert_recipe(&self, draft: NewRecipe) -> Result<Recipe> {
        self.require_owner(draft.user_id)?;
        let id = self.repository.insert_recipe(&draft)?;
        Ok(draft.into_recipe(id))
    }

    pub fn list_tags(&self, user: &User) -> Result<Vec<Tag>> {
        self.repository.list_tags(user.id)
    }

    pub fn list_ingredients(&self, user: &User) -> Result<Vec<Ingredient>> {
        self.repository.list_ingredients(user.id)
    }

    pub fn list_recipes(&self, user: &User) -> Result<Vec<Recipe>> {
        self.repository.list_recipes(user.id)
    }

    pub fn get_recipe(&self, id: i64) -> Result<Option<Recipe>> {
        self.repository.get_recipe(id)
    }

    /// Attach a tag to a recipe. Both must belong to the same user.
    /// Attaching a tag that is already attached does nothing.
    pub fn add_tag_to_recipe(&self, recipe_id: i64, tag_id: i64) -> Result<()> {
        let recipe = self.require_recipe(recipe_id)?;
        let tag = self
            .repository
            .get_tag(tag_id)?
            .ok_or_else(|| Error::not_found(format!("Tag {}", tag_id)))?;

        if tag.user_id != recipe.user_id {
            return Err(Error::validation(format!(
                "Tag {} does not belong to the owner of recipe {}",
                tag_id, recipe_id
            )));
        }
        self.repository.link_recipe_tag(recipe_id, tag_id)
    }

    /// Attach an ingredient to a recipe. Both must belong to the same user.
    pub fn add_ingredient_to_recipe(&self, recipe_id: i64, ingredient_id: i64) -> Result<()> {
        let recipe = self.require_recipe(recipe_id)?;
        let ingredient = self
            .repository
            .get_ingredient(ingredient_id)?
            .ok_or_else(|| Error::not_found(format!("Ingredient {}", ingredient_id)))?;

        if ingredient.user_id != recipe.user_id {
            return Err(Error::validation(format!(
                "Ingredient {} does not belong to the owner of recipe {}",
                ingredient_id, recipe_id
            )));
        }
        self.repository
            .link_recipe_ingredient(recipe_id, ingredient_id)
    }

    /// A recipe with its tags and ingredients, both sorted by name
    pub fn recipe_detail(&self, recipe_id: i64) -> Result<RecipeDetail> {
        let recipe = self.require_recipe(recipe_id)?;
        Ok(RecipeDetail {
            tags: self.repository.recipe_tags(recipe_id)?,
            ingredients: self.repository.recipe_ingredients(recipe_id)?,
            recipe,
        })
    }

    fn require_owner(&self, user_id: i64) -> Result<()> {
        match self.repository.get_user(user_id)? {
            Some(_) => Ok(()),
            None => Err(Error::not_found(format!("User {}", user_id))),
        }
    }

    fn require_recipe(&self, recipe_id: i64) -> Result<Recipe> {
        self.repository
            .get_recipe(recipe_id)?
            .ok_or_else(|| Error::not_found(format!("Recipe {}", recipe_id)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::InMemoryRepository;
    use crate::domain::UserFields;
    use crate::services::credential::fast_params;
    use crate::services::{AccountManager, CredentialStore};

    fn setup() -> (AccountManager, RecipeService) {
        let repository: Arc<dyn Repository> = Arc::new(InMemoryRepository::new());
        let accounts = AccountManager::new(
            Arc::clone(&repository),
            CredentialStore::new(fast_params()),
        );
        (accounts, RecipeService::new(repository))
    }

    fn sample_user(accounts: &AccountManager, email: &str) -> User {
        accounts
            .create_user(Some(email), "testpass", UserFields::default())
            .unwrap()
    }

    #[test]
    fn test_tag_str() {
        let (accounts, recipes) = setup();
        let user = sample_user(&accounts, "test@gmail.com");
        let tag = recipes.create_tag(&user, "Vegan").unwrap();

        assert_eq!(tag.to_string(), tag.name);
        assert_eq!(tag.user_id, user.id);
    }

    #[test]
    fn test_ingredient_str() {
        let (accounts, recipes) = setup();
        let user = sample_user(&accounts, "test@gmail.com");
        let ingredient = recipes.create_ingredient(&user, "Cucumber").unwrap();

        assert_eq!(ingredient.to_string(), ingredient.name);
    }

    #[test]
    fn test_recipe_str() {
        let (accounts, recipes) = setup();
        let user = sample_user(&accounts, "test@gmail.com");
        let recipe = recipes
            .create_recipe(&user, "Steak and mushroom sauce", 5, Decimal::new(500, 2))
            .unwrap();

        assert_eq!(recipe.to_string(), recipe.title);
        assert_eq!(recipe.cost.to_string(), "5.00");
        assert_eq!(recipe.time_minutes, 5);
    }

    #[test]
    fn test_recipe_rejects_negative_values() {
        let (accounts, recipes) = setup();
        let user = sample_user(&accounts, "test@gmail.com");

        assert!(recipes
            .create_recipe(&user, "Soup", -1, Decimal::ONE)
            .unwrap_err()
            .is_validation());
        assert!(recipes
            .create_recipe(&user, "Soup", 10, Decimal::new(-100, 2))
            .unwrap_err()
            .is_validation());
        assert!(recipes.list_recipes(&user).unwrap().is_empty());
    }

    #[test]
    fn test_unknown_owner_is_not_found() {
        let (accounts, recipes) = setup();
        let mut ghost = sample_user(&accounts, "ghost@gmail.com");
        accounts.delete_user(ghost.id).unwrap();
        ghost.id = 4242;

        assert!(matches!(
            recipes.create_tag(&ghost, "Vegan"),
            Err(Error::NotFound(_))
        ));
        assert!(matches!(
            recipes.create_recipe(&ghost, "Soup", 1, Decimal::ONE),
            Err(Error::NotFound(_))
        ));
    }

    #[test]
    fn test_recipe_detail_with_links() {
        let (accounts, recipes) = setup();
        let user = sample_user(&accounts, "test@gmail.com");
        let recipe = recipes
            .insert_recipe(
                NewRecipe::new(user.id, "Curry", 30, Decimal::new(1250, 2))
                    .unwrap()
                    .with_link("https://example.com/curry")
                    .unwrap(),
            )
            .unwrap();
        let vegan = recipes.create_tag(&user, "Vegan").unwrap();
        let dinner = recipes.create_tag(&user, "Dinner").unwrap();
        let rice = recipes.create_ingredient(&user, "Rice").unwrap();

        recipes.add_tag_to_recipe(recipe.id, vegan.id).unwrap();
        recipes.add_tag_to_recipe(recipe.id, dinner.id).unwrap();
        recipes.add_tag_to_recipe(recipe.id, vegan.id).unwrap();
        recipes.add_ingredient_to_recipe(recipe.id, rice.id).unwrap();

        let detail = recipes.recipe_detail(recipe.id).unwrap();
        assert_eq!(detail.recipe.link.as_deref(), Some("https://example.com/curry"));
        let tag_names: Vec<&str> = detail.tags.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(tag_names, vec!["Dinner", "Vegan"]);
        assert_eq!(detail.ingredients, vec![rice]);
    }

    #[test]
    fn test_cannot_link_other_users_tag() {
        let (accounts, recipes) = setup();
        let alice = sample_user(&accounts, "alice@gmail.com");
        let bob = sample_user(&accounts, "bob@gmail.com");

        let recipe = recipes
            .create_recipe(&alice, "Pie", 45, Decimal::new(300, 2))
            .unwrap();
        let bobs_tag = recipes.create_tag(&bob, "Dessert").unwrap();
        let bobs_sugar = recipes.create_ingredient(&bob, "Sugar").unwrap();

        assert!(recipes
            .add_tag_to_recipe(recipe.id, bobs_tag.id)
            .unwrap_err()
            .is_validation());
        assert!(recipes
            .add_ingredient_to_recipe(recipe.id, bobs_sugar.id)
            .unwrap_err()
            .is_validation());
        assert!(matches!(
            recipes.add_tag_to_recipe(999, bobs_tag.id),
            Err(Error::NotFound(_))
        ));
    }

    #[test]
    fn test_lists_are_scoped_to_owner() {
        let (accounts, recipes) = setup();
        let alice = sample_user(&accounts, "alice@gmail.com");
        let bob = sample_user(&accounts, "bob@gmail.com");

        recipes.create_tag(&alice, "Vegan").unwrap();
        recipes.create_ingredient(&bob, "Salt").unwrap();

        assert_eq!(recipes.list_tags(&alice).unwrap().len(), 1);
        assert!(recipes.list_tags(&bob).unwrap().is_empty());
        assert!(recipes.list_ingredients(&alice).unwrap().is_empty());
        assert_eq!(recipes.list_ingredients(&bob).unwrap().len(), 1);
    }
}
