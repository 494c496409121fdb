//! Recipe Core - accounts and recipes for a recipe-sharing backend
//!
//! This crate implements the core domain logic following hexagonal architecture:
//!
//! - **domain**: Core business entities (User, Tag, Ingredient, Recipe) and admin views
//! - **ports**: Trait definitions for external dependencies (Repository)
//! - **services**: Business logic orchestration (accounts, recipes, event log)
//! - **adapters**: Concrete implementations (DuckDB, in-memory)

pub mod domain;
pub mod ports;
pub mod services;
pub mod adapters;
pub mod config;
pub mod migrations;
pub mod log_migrations;

use std::path::Path;
use std::sync::Arc;

use anyhow::Result;

use adapters::duckdb::DuckDbRepository;
use config::Config;
use ports::Repository;
use services::*;

// Re-export commonly used types at crate root
pub use domain::{
    AddUserForm, Ingredient, NewRecipe, Recipe, RecipeDetail, Tag, User, UserAdmin, UserFields,
};
pub use domain::result::{Error, OperationResult};
pub use services::{EntryPoint, LogEvent, LoggingService};

/// Main context for recipe operations
///
/// Holds the database, configuration and all services. Nothing here is
/// global; each context owns its own connection.
pub struct RecipeContext {
    pub config: Config,
    pub repository: Arc<DuckDbRepository>,
    pub account_manager: AccountManager,
    pub recipe_service: RecipeService,
}

impl RecipeContext {
    /// Open the recipe database in `recipe_dir`, creating it if needed
    pub fn new(recipe_dir: &Path) -> Result<Self> {
        let config =
            Config::load(recipe_dir).map_err(|e| Error::Config(format!("{:#}", e)))?;

        let db_path = config.database_path(recipe_dir);
        let repository = Arc::new(DuckDbRepository::new(&db_path)?);

        // Initialize schema
        repository.ensure_schema()?;

        let port: Arc<dyn Repository> = repository.clone();
        let account_manager = AccountManager::new(
            Arc::clone(&port),
            CredentialStore::new(config.password_hashing.clone()),
        );
        let recipe_service = RecipeService::new(port);

        Ok(Self {
            config,
            repository,
            account_manager,
            recipe_service,
        })
    }
}
