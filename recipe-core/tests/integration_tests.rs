//! Integration tests for recipe-core services
//!
//! These tests run the account and recipe services against a real DuckDB
//! file in a temporary directory.
//!
//! Run with: cargo test --test integration_tests -- --nocapture

use std::sync::Arc;

use rust_decimal::Decimal;
use tempfile::TempDir;

use recipe_core::adapters::duckdb::{DuckDbRepository, Table};
use recipe_core::domain::{AddUserForm, Argon2Params, HashSummary, NewRecipe};
use recipe_core::ports::Repository;
use recipe_core::services::{AccountManager, CredentialStore, RecipeService};
use recipe_core::{Error, RecipeContext, UserAdmin, UserFields};

// ============================================================================
// Test Helpers
// ============================================================================

fn fast_params() -> Argon2Params {
    Argon2Params {
        time_cost: 1,
        memory_cost: 1024,
        parallelism: 1,
        hash_len: 32,
    }
}

/// Create a test repository with schema initialized
fn create_test_repo(temp_dir: &TempDir) -> Arc<DuckDbRepository> {
    let db_path = temp_dir.path().join("test.duckdb");
    let repo = DuckDbRepository::new(&db_path).expect("Failed to create repository");
    repo.ensure_schema().expect("Failed to initialize schema");
    Arc::new(repo)
}

fn services(repo: &Arc<DuckDbRepository>) -> (AccountManager, RecipeService) {
    let port: Arc<dyn Repository> = repo.clone();
    (
        AccountManager::new(Arc::clone(&port), CredentialStore::new(fast_params())),
        RecipeService::new(port),
    )
}

/// Write a settings.json that keeps hashing cheap
fn write_fast_settings(temp_dir: &TempDir) {
    let settings = serde_json::json!({ "passwordHashing": fast_params() });
    std::fs::write(
        temp_dir.path().join("settings.json"),
        serde_json::to_string_pretty(&settings).unwrap(),
    )
    .unwrap();
}

// ============================================================================
// User Model Tests
// ============================================================================

#[test]
fn test_create_user_with_email_successful() {
    let temp_dir = TempDir::new().unwrap();
    let repo = create_test_repo(&temp_dir);
    let (accounts, _) = services(&repo);

    let user = accounts
        .create_user(Some("test@gmail.com"), "password1", UserFields::default())
        .unwrap();

    assert_eq!(user.email, "test@gmail.com");
    assert!(accounts.check_password(&user, "password1"));

    // The stored hash is what comes back from the database
    let stored = repo.get_user(user.id).unwrap().unwrap();
    assert_eq!(stored.password, user.password);
    assert_ne!(stored.password, "password1");
    assert!(accounts.check_password(&stored, "password1"));
}

#[test]
fn test_new_user_email_normalized() {
    let temp_dir = TempDir::new().unwrap();
    let repo = create_test_repo(&temp_dir);
    let (accounts, _) = services(&repo);

    let email = "test@GMAIL.COM";
    let user = accounts
        .create_user(Some(email), "test123", UserFields::default())
        .unwrap();

    assert_eq!(user.email, email.to_lowercase());
    assert!(accounts.find_by_email("test@gmail.com").unwrap().is_some());
}

#[test]
fn test_new_user_invalid_email() {
    let temp_dir = TempDir::new().unwrap();
    let repo = create_test_repo(&temp_dir);
    let (accounts, _) = services(&repo);

    let err = accounts
        .create_user(None, "test234", UserFields::default())
        .unwrap_err();
    assert!(err.is_validation());
    assert_eq!(repo.count(Table::Users).unwrap(), 0);
}

#[test]
fn test_create_new_superuser() {
    let temp_dir = TempDir::new().unwrap();
    let repo = create_test_repo(&temp_dir);
    let (accounts, _) = services(&repo);

    let user = accounts
        .create_superuser(Some("test@gmail.com"), "test123")
        .unwrap();

    let stored = repo.get_user(user.id).unwrap().unwrap();
    assert!(stored.is_superuser);
    assert!(stored.is_staff);
    assert!(stored.is_active);
}

#[test]
fn test_duplicate_email_keeps_one_user() {
    let temp_dir = TempDir::new().unwrap();
    let repo = create_test_repo(&temp_dir);
    let (accounts, _) = services(&repo);

    accounts
        .create_user(Some("test@gmail.com"), "pw", UserFields::default())
        .unwrap();
    let err = accounts
        .create_user(Some("Test@GMAIL.com"), "pw", UserFields::default())
        .unwrap_err();

    assert!(err.is_uniqueness());
    assert_eq!(repo.count(Table::Users).unwrap(), 1);
}

#[test]
fn test_unique_constraint_is_enforced_by_database() {
    let temp_dir = TempDir::new().unwrap();
    let repo = create_test_repo(&temp_dir);
    let (accounts, _) = services(&repo);

    let user = accounts
        .create_user(Some("test@gmail.com"), "pw", UserFields::default())
        .unwrap();

    // Bypass the manager's pre-check and hit the constraint directly
    let draft = recipe_core::domain::NewUser::new(
        user.email.clone(),
        user.password.clone(),
        UserFields::default(),
    )
    .unwrap();
    assert!(matches!(repo.insert_user(&draft), Err(Error::Uniqueness(_))));
}

#[test]
fn test_authenticate_persists_last_login() {
    let temp_dir = TempDir::new().unwrap();
    let repo = create_test_repo(&temp_dir);
    let (accounts, _) = services(&repo);

    let user = accounts
        .create_user(Some("test@gmail.com"), "pw", UserFields::default())
        .unwrap();
    assert!(accounts.authenticate("test@gmail.com", "wrong").unwrap().is_none());
    assert!(repo.get_user(user.id).unwrap().unwrap().last_login.is_none());

    let logged_in = accounts.authenticate("test@gmail.com", "pw").unwrap().unwrap();
    let stored = repo.get_user(user.id).unwrap().unwrap();
    assert_eq!(
        stored.last_login.map(|t| t.timestamp()),
        logged_in.last_login.map(|t| t.timestamp())
    );
}

// ============================================================================
// Recipe Model Tests
// ============================================================================

#[test]
fn test_create_tag_ingredient_recipe() {
    let temp_dir = TempDir::new().unwrap();
    let repo = create_test_repo(&temp_dir);
    let (accounts, recipes) = services(&repo);

    let user = accounts
        .create_user(Some("test@gmail.com"), "testpass", UserFields::default())
        .unwrap();

    let tag = recipes.create_tag(&user, "Vegan").unwrap();
    assert_eq!(tag.to_string(), "Vegan");

    let ingredient = recipes.create_ingredient(&user, "Cucumber").unwrap();
    assert_eq!(ingredient.to_string(), "Cucumber");

    let recipe = recipes
        .create_recipe(&user, "Steak and mushroom sauce", 5, Decimal::new(500, 2))
        .unwrap();
    assert_eq!(recipe.to_string(), "Steak and mushroom sauce");

    let stored = recipes.get_recipe(recipe.id).unwrap().unwrap();
    assert_eq!(stored, recipe);
    assert_eq!(stored.cost.to_string(), "5.00");
}

#[test]
fn test_recipe_cost_bounds() {
    let temp_dir = TempDir::new().unwrap();
    let repo = create_test_repo(&temp_dir);
    let (accounts, recipes) = services(&repo);

    let user = accounts
        .create_user(Some("test@gmail.com"), "pw", UserFields::default())
        .unwrap();

    let max = recipes
        .create_recipe(&user, "Truffles", 10, Decimal::new(99_999, 2))
        .unwrap();
    assert_eq!(
        recipes.get_recipe(max.id).unwrap().unwrap().cost,
        Decimal::new(99_999, 2)
    );

    assert!(recipes
        .create_recipe(&user, "Gold leaf", 10, Decimal::new(100_000, 2))
        .unwrap_err()
        .is_validation());
    assert!(recipes
        .create_recipe(&user, "Crumbs", 10, Decimal::new(1_005, 3))
        .unwrap_err()
        .is_validation());
    assert_eq!(repo.count(Table::Recipes).unwrap(), 1);
}

#[test]
fn test_recipe_links_round_trip_through_database() {
    let temp_dir = TempDir::new().unwrap();
    let repo = create_test_repo(&temp_dir);
    let (accounts, recipes) = services(&repo);

    let user = accounts
        .create_user(Some("test@gmail.com"), "pw", UserFields::default())
        .unwrap();
    let recipe = recipes
        .insert_recipe(
            NewRecipe::new(user.id, "Curry", 30, Decimal::new(1250, 2))
                .unwrap()
                .with_link("https://example.com/curry")
                .unwrap(),
        )
        .unwrap();
    let vegan = recipes.create_tag(&user, "Vegan").unwrap();
    let rice = recipes.create_ingredient(&user, "Rice").unwrap();

    recipes.add_tag_to_recipe(recipe.id, vegan.id).unwrap();
    recipes.add_tag_to_recipe(recipe.id, vegan.id).unwrap();
    recipes.add_ingredient_to_recipe(recipe.id, rice.id).unwrap();

    let detail = recipes.recipe_detail(recipe.id).unwrap();
    assert_eq!(detail.recipe.link.as_deref(), Some("https://example.com/curry"));
    assert_eq!(detail.tags, vec![vegan]);
    assert_eq!(detail.ingredients, vec![rice]);
    assert_eq!(repo.count(Table::RecipeTags).unwrap(), 1);
}

// ============================================================================
// Delete User Tests
// ============================================================================

/// Deleting a user removes everything they own and nothing else
#[test]
fn test_delete_user_removes_all_owned_data() {
    let temp_dir = TempDir::new().unwrap();
    let repo = create_test_repo(&temp_dir);
    let (accounts, recipes) = services(&repo);

    let alice = accounts
        .create_user(Some("alice@gmail.com"), "pw", UserFields::default())
        .unwrap();
    let bob = accounts
        .create_user(Some("bob@gmail.com"), "pw", UserFields::default())
        .unwrap();

    for (owner, title) in [(&alice, "Pie"), (&alice, "Soup"), (&bob, "Stew")] {
        let recipe = recipes
            .create_recipe(owner, title, 20, Decimal::new(300, 2))
            .unwrap();
        let tag = recipes.create_tag(owner, &format!("{} tag", title)).unwrap();
        let ingredient = recipes
            .create_ingredient(owner, &format!("{} base", title))
            .unwrap();
        recipes.add_tag_to_recipe(recipe.id, tag.id).unwrap();
        recipes
            .add_ingredient_to_recipe(recipe.id, ingredient.id)
            .unwrap();
    }

    assert!(accounts.delete_user(alice.id).unwrap());

    assert!(accounts.get_user(alice.id).unwrap().is_none());
    assert_eq!(repo.count(Table::Users).unwrap(), 1);
    assert_eq!(repo.count(Table::Recipes).unwrap(), 1);
    assert_eq!(repo.count(Table::Tags).unwrap(), 1);
    assert_eq!(repo.count(Table::Ingredients).unwrap(), 1);
    assert_eq!(repo.count(Table::RecipeTags).unwrap(), 1);
    assert_eq!(repo.count(Table::RecipeIngredients).unwrap(), 1);
    assert_eq!(recipes.list_recipes(&bob).unwrap().len(), 1);

    assert!(!accounts.delete_user(alice.id).unwrap());
}

// ============================================================================
// Context and Admin Tests
// ============================================================================

#[test]
fn test_context_persists_across_reopen() {
    let temp_dir = TempDir::new().unwrap();
    write_fast_settings(&temp_dir);

    let user_id = {
        let ctx = RecipeContext::new(temp_dir.path()).unwrap();
        let form = AddUserForm::new("Admin@Kitchen.io", "s3cret", "s3cret");
        let (email, password) = form.clean().unwrap();
        ctx.account_manager
            .create_superuser(Some(email), password)
            .unwrap()
            .id
    };

    let ctx = RecipeContext::new(temp_dir.path()).unwrap();
    let user = ctx.account_manager.get_user(user_id).unwrap().unwrap();
    assert_eq!(user.email, "admin@kitchen.io");
    assert!(ctx
        .account_manager
        .authenticate("admin@kitchen.io", "s3cret")
        .unwrap()
        .is_some());

    let summary = HashSummary::from_phc(&user.password).unwrap();
    assert_eq!(summary.algorithm, "argon2id");
    assert!(summary.params.contains("m=1024"));
}

#[test]
fn test_admin_list_view_over_stored_users() {
    let temp_dir = TempDir::new().unwrap();
    let repo = create_test_repo(&temp_dir);
    let (accounts, _) = services(&repo);

    accounts
        .create_user(
            Some("b@gmail.com"),
            "pw",
            UserFields::default().with_name("Bea"),
        )
        .unwrap();
    accounts
        .create_user(
            Some("a@gmail.com"),
            "pw",
            UserFields::default().with_name("Al"),
        )
        .unwrap();

    let admin = UserAdmin::default();
    let mut users = accounts.list_users().unwrap();
    admin.sort(&mut users);

    assert_eq!(admin.list_headers(), vec!["Name", "Email"]);
    let rows: Vec<Vec<String>> = users.iter().map(|u| admin.list_row(u)).collect();
    assert_eq!(
        rows,
        vec![
            vec!["Bea".to_string(), "b@gmail.com".to_string()],
            vec!["Al".to_string(), "a@gmail.com".to_string()],
        ]
    );
}

#[test]
fn test_reopen_database_keeps_schema() {
    let temp_dir = TempDir::new().unwrap();
    {
        let repo = create_test_repo(&temp_dir);
        let (accounts, _) = services(&repo);
        accounts
            .create_user(Some("test@gmail.com"), "pw", UserFields::default())
            .unwrap();
    }

    let repo = create_test_repo(&temp_dir);
    let result = repo.run_migrations().unwrap();
    assert!(result.applied.is_empty());
    assert_eq!(repo.count(Table::Users).unwrap(), 1);
}
