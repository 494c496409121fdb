//! DuckDB repository implementation

use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use std::thread;
use std::time::Duration;

use chrono::{DateTime, Utc};
use duckdb::{params, Connection, Params};
use rust_decimal::Decimal;

use crate::domain::result::{Error, Result};
use crate::domain::{Ingredient, NewIngredient, NewRecipe, NewTag, NewUser, Recipe, Tag, User};
use crate::ports::Repository;
use crate::services::MigrationService;

/// Maximum number of retries when database file is locked
const MAX_RETRIES: u32 = 5;

/// Initial retry delay in milliseconds (doubles each retry: 50, 100, 200, 400, 800ms)
const INITIAL_RETRY_DELAY_MS: u64 = 50;

/// Check if an error message indicates a file locking issue that should be retried
fn is_retryable_error(err_msg: &str) -> bool {
    let lower = err_msg.to_lowercase();
    // Windows error messages
    lower.contains("being used by another process")
        || lower.contains("cannot access the file")
        // Unix/macOS error messages
        || lower.contains("resource temporarily unavailable")
        || lower.contains("database is locked")
        || lower.contains("file is already open")
}

/// Check if an error message is a unique/primary key constraint violation
fn is_unique_violation(err_msg: &str) -> bool {
    let lower = err_msg.to_lowercase();
    lower.contains("duplicate key") || lower.contains("unique constraint")
}

const USER_COLUMNS: &str =
    "user_id, email, password, name, is_active, is_staff, is_superuser, last_login";

const RECIPE_COLUMNS: &str = "recipe_id, user_id, title, time_minutes, cost::VARCHAR, link";

/// DuckDB repository implementation
pub struct DuckDbRepository {
    conn: Mutex<Connection>,
    db_path: Option<PathBuf>,
}

impl DuckDbRepository {
    /// Open (or create) a database file.
    ///
    /// Includes retry logic with exponential backoff for file locking errors,
    /// which can occur when another process (a second CLI invocation) holds
    /// the file.
    pub fn new(db_path: &Path) -> Result<Self> {
        let mut last_error = None;

        for attempt in 0..MAX_RETRIES {
            match Self::try_open_connection(db_path) {
                Ok(conn) => {
                    return Ok(Self {
                        conn: Mutex::new(conn),
                        db_path: Some(db_path.to_path_buf()),
                    });
                }
                Err(e) => {
                    let err_msg = e.to_string();
                    if is_retryable_error(&err_msg) && attempt < MAX_RETRIES - 1 {
                        let delay =
                            Duration::from_millis(INITIAL_RETRY_DELAY_MS * 2u64.pow(attempt));
                        eprintln!(
                            "[recipe] Database busy, retrying in {}ms (attempt {}/{}): {}",
                            delay.as_millis(),
                            attempt + 1,
                            MAX_RETRIES,
                            err_msg
                        );
                        thread::sleep(delay);
                        last_error = Some(e);
                        continue;
                    }
                    return Err(e);
                }
            }
        }

        Err(last_error.unwrap_or_else(|| {
            Error::database(format!(
                "Failed to open database after {} retries",
                MAX_RETRIES
            ))
        }))
    }

    /// Open a throwaway in-memory database
    pub fn in_memory() -> Result<Self> {
        let config = duckdb::Config::default().enable_autoload_extension(false)?;
        let conn = Connection::open_in_memory_with_flags(config)?;
        Ok(Self {
            conn: Mutex::new(conn),
            db_path: None,
        })
    }

    fn try_open_connection(db_path: &Path) -> Result<Connection> {
        // Extension autoloading stays off; nothing here needs extensions
        let config = duckdb::Config::default().enable_autoload_extension(false)?;
        Ok(Connection::open_with_flags(db_path, config)?)
    }

    /// Path of the database file (None for in-memory databases)
    pub fn db_path(&self) -> Option<&Path> {
        self.db_path.as_deref()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| Error::database(format!("Lock poisoned: {}", e)))
    }

    /// Run database migrations using the MigrationService
    pub fn run_migrations(&self) -> Result<crate::services::MigrationResult> {
        let conn = self.lock()?;
        MigrationService::new(&conn)
            .run_pending()
            .map_err(|e| Error::database(format!("Migration failed: {}", e)))
    }

    /// Ensure database schema exists (runs pending migrations)
    pub fn ensure_schema(&self) -> Result<()> {
        self.run_migrations()?;
        Ok(())
    }

    fn next_id(conn: &Connection, sequence: &str) -> Result<i64> {
        let id = conn.query_row(&format!("SELECT nextval('{}')", sequence), [], |row| {
            row.get(0)
        })?;
        Ok(id)
    }

    fn row_to_user(row: &duckdb::Row) -> duckdb::Result<User> {
        let last_login: Option<String> = row.get(7)?;
        Ok(User {
            id: row.get(0)?,
            email: row.get(1)?,
            password: row.get(2)?,
            name: row.get(3)?,
            is_active: row.get(4)?,
            is_staff: row.get(5)?,
            is_superuser: row.get(6)?,
            last_login: last_login.as_deref().and_then(parse_timestamp),
        })
    }

    fn row_to_tag(row: &duckdb::Row) -> duckdb::Result<Tag> {
        Ok(Tag {
            id: row.get(0)?,
            user_id: row.get(1)?,
            name: row.get(2)?,
        })
    }

    fn row_to_ingredient(row: &duckdb::Row) -> duckdb::Result<Ingredient> {
        Ok(Ingredient {
            id: row.get(0)?,
            user_id: row.get(1)?,
            name: row.get(2)?,
        })
    }

    fn row_to_recipe(row: &duckdb::Row) -> duckdb::Result<Recipe> {
        // cost is read as VARCHAR to keep full decimal precision
        let cost: String = row.get(4)?;
        Ok(Recipe {
            id: row.get(0)?,
            user_id: row.get(1)?,
            title: row.get(2)?,
            time_minutes: row.get(3)?,
            cost: cost.parse::<Decimal>().map_err(|e| {
                duckdb::Error::FromSqlConversionFailure(4, duckdb::types::Type::Text, Box::new(e))
            })?,
            link: row.get(5)?,
        })
    }

    fn query_users<P: Params>(&self, sql: &str, params: P) -> Result<Vec<User>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(sql)?;
        let rows = stmt.query_map(params, Self::row_to_user)?;
        let mut users = Vec::new();
        for user in rows {
            users.push(user?);
        }
        Ok(users)
    }

    fn query_by_id<T, F>(&self, sql: &str, id: i64, map: F) -> Result<Vec<T>>
    where
        F: FnMut(&duckdb::Row) -> duckdb::Result<T>,
    {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(sql)?;
        let rows = stmt.query_map([id], map)?;
        let mut items = Vec::new();
        for item in rows {
            items.push(item?);
        }
        Ok(items)
    }

    /// Count rows of one of the owned-entity tables (used by health checks and tests)
    pub fn count(&self, table: Table) -> Result<i64> {
        let conn = self.lock()?;
        let count = conn.query_row(
            &format!("SELECT COUNT(*) FROM {}", table.name()),
            [],
            |row| row.get(0),
        )?;
        Ok(count)
    }
}

/// Tables that can be counted through `DuckDbRepository::count`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Table {
    Users,
    Tags,
    Ingredients,
    Recipes,
    RecipeTags,
    RecipeIngredients,
}

impl Table {
    fn name(&self) -> &'static str {
        match self {
            Table::Users => "sys_users",
            Table::Tags => "sys_tags",
            Table::Ingredients => "sys_ingredients",
            Table::Recipes => "sys_recipes",
            Table::RecipeTags => "sys_recipe_tags",
            Table::RecipeIngredients => "sys_recipe_ingredients",
        }
    }
}

impl Repository for DuckDbRepository {
    // === Users ===

    fn insert_user(&self, user: &NewUser) -> Result<i64> {
        let conn = self.lock()?;
        let id = Self::next_id(&conn, "seq_users_id")?;
        conn.execute(
            "INSERT INTO sys_users (user_id, email, password, name, is_active, is_staff,
                                    is_superuser, last_login, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, NULL, ?)",
            params![
                id,
                user.email,
                user.password,
                user.name,
                user.is_active,
                user.is_staff,
                user.is_superuser,
                Utc::now().to_rfc3339(),
            ],
        )
        .map_err(|e| {
            let msg = e.to_string();
            if is_unique_violation(&msg) {
                Error::uniqueness(format!("A user with email {} already exists", user.email))
            } else {
                Error::database(msg)
            }
        })?;
        Ok(id)
    }

    fn find_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let sql = format!("SELECT {} FROM sys_users WHERE email = ?", USER_COLUMNS);
        Ok(self.query_users(&sql, [email])?.into_iter().next())
    }

    fn get_user(&self, id: i64) -> Result<Option<User>> {
        let sql = format!("SELECT {} FROM sys_users WHERE user_id = ?", USER_COLUMNS);
        Ok(self.query_users(&sql, [id])?.into_iter().next())
    }

    fn list_users(&self) -> Result<Vec<User>> {
        let sql = format!("SELECT {} FROM sys_users ORDER BY user_id", USER_COLUMNS);
        self.query_users(&sql, params![])
    }

    fn update_last_login(&self, id: i64, at: DateTime<Utc>) -> Result<()> {
        let conn = self.lock()?;
        let updated = conn.execute(
            "UPDATE sys_users SET last_login = ? WHERE user_id = ?",
            params![at.to_rfc3339(), id],
        )?;
        if updated == 0 {
            return Err(Error::not_found(format!("User {}", id)));
        }
        Ok(())
    }

    fn update_password(&self, id: i64, password_hash: &str) -> Result<()> {
        let conn = self.lock()?;
        let updated = conn.execute(
            "UPDATE sys_users SET password = ? WHERE user_id = ?",
            params![password_hash, id],
        )?;
        if updated == 0 {
            return Err(Error::not_found(format!("User {}", id)));
        }
        Ok(())
    }

    /// Delete a user and everything they own.
    ///
    /// Statements run in dependency order: recipe links first, then the
    /// recipes, tags and ingredients, and finally the user row.
    fn delete_user_cascade(&self, id: i64) -> Result<bool> {
        let conn = self.lock()?;
        conn.execute_batch("BEGIN TRANSACTION")?;

        let result = (|| -> duckdb::Result<usize> {
            conn.execute(
                "DELETE FROM sys_recipe_tags
                 WHERE recipe_id IN (SELECT recipe_id FROM sys_recipes WHERE user_id = ?)",
                [id],
            )?;
            conn.execute(
                "DELETE FROM sys_recipe_ingredients
                 WHERE recipe_id IN (SELECT recipe_id FROM sys_recipes WHERE user_id = ?)",
                [id],
            )?;
            conn.execute("DELETE FROM sys_recipes WHERE user_id = ?", [id])?;
            conn.execute("DELETE FROM sys_tags WHERE user_id = ?", [id])?;
            conn.execute("DELETE FROM sys_ingredients WHERE user_id = ?", [id])?;
            conn.execute("DELETE FROM sys_users WHERE user_id = ?", [id])
        })();

        match result {
            Ok(deleted) => {
                conn.execute_batch("COMMIT")?;
                Ok(deleted > 0)
            }
            Err(e) => {
                // The delete error is the one worth reporting
                if let Err(rollback_err) = conn.execute_batch("ROLLBACK") {
                    eprintln!("[recipe] Rollback failed: {}", rollback_err);
                }
                Err(e.into())
            }
        }
    }

    // === Tags ===

    fn insert_tag(&self, tag: &NewTag) -> Result<i64> {
        let conn = self.lock()?;
        let id = Self::next_id(&conn, "seq_tags_id")?;
        conn.execute(
            "INSERT INTO sys_tags (tag_id, user_id, name) VALUES (?, ?, ?)",
            params![id, tag.user_id, tag.name],
        )?;
        Ok(id)
    }

    fn get_tag(&self, id: i64) -> Result<Option<Tag>> {
        let tags = self.query_by_id(
            "SELECT tag_id, user_id, name FROM sys_tags WHERE tag_id = ?",
            id,
            Self::row_to_tag,
        )?;
        Ok(tags.into_iter().next())
    }

    fn list_tags(&self, user_id: i64) -> Result<Vec<Tag>> {
        self.query_by_id(
            "SELECT tag_id, user_id, name FROM sys_tags WHERE user_id = ? ORDER BY name, tag_id",
            user_id,
            Self::row_to_tag,
        )
    }

    // === Ingredients ===

    fn insert_ingredient(&self, ingredient: &NewIngredient) -> Result<i64> {
        let conn = self.lock()?;
        let id = Self::next_id(&conn, "seq_ingredients_id")?;
        conn.execute(
            "INSERT INTO sys_ingredients (ingredient_id, user_id, name) VALUES (?, ?, ?)",
            params![id, ingredient.user_id, ingredient.name],
        )?;
        Ok(id)
    }

    fn get_ingredient(&self, id: i64) -> Result<Option<Ingredient>> {
        let ingredients = self.query_by_id(
            "SELECT ingredient_id, user_id, name FROM sys_ingredients WHERE ingredient_id = ?",
            id,
            Self::row_to_ingredient,
        )?;
        Ok(ingredients.into_iter().next())
    }

    fn list_ingredients(&self, user_id: i64) -> Result<Vec<Ingredient>> {
        self.query_by_id(
            "SELECT ingredient_id, user_id, name FROM sys_ingredients
             WHERE user_id = ? ORDER BY name, ingredient_id",
            user_id,
            Self::row_to_ingredient,
        )
    }

    // === Recipes ===

    fn insert_recipe(&self, recipe: &NewRecipe) -> Result<i64> {
        let conn = self.lock()?;
        let id = Self::next_id(&conn, "seq_recipes_id")?;
        conn.execute(
            "INSERT INTO sys_recipes (recipe_id, user_id, title, time_minutes, cost, link)
             VALUES (?, ?, ?, ?, CAST(? AS DECIMAL(5, 2)), ?)",
            params![
                id,
                recipe.user_id,
                recipe.title,
                recipe.time_minutes,
                recipe.cost.to_string(),
                recipe.link,
            ],
        )?;
        Ok(id)
    }

    fn get_recipe(&self, id: i64) -> Result<Option<Recipe>> {
        let sql = format!("SELECT {} FROM sys_recipes WHERE recipe_id = ?", RECIPE_COLUMNS);
        let recipes = self.query_by_id(&sql, id, Self::row_to_recipe)?;
        Ok(recipes.into_iter().next())
    }

    fn list_recipes(&self, user_id: i64) -> Result<Vec<Recipe>> {
        let sql = format!(
            "SELECT {} FROM sys_recipes WHERE user_id = ? ORDER BY recipe_id",
            RECIPE_COLUMNS
        );
        self.query_by_id(&sql, user_id, Self::row_to_recipe)
    }

    fn link_recipe_tag(&self, recipe_id: i64, tag_id: i64) -> Result<()> {
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO sys_recipe_tags (recipe_id, tag_id) VALUES (?, ?) ON CONFLICT DO NOTHING",
            params![recipe_id, tag_id],
        )?;
        Ok(())
    }

    fn link_recipe_ingredient(&self, recipe_id: i64, ingredient_id: i64) -> Result<()> {
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO sys_recipe_ingredients (recipe_id, ingredient_id) VALUES (?, ?)
             ON CONFLICT DO NOTHING",
            params![recipe_id, ingredient_id],
        )?;
        Ok(())
    }

    fn recipe_tags(&self, recipe_id: i64) -> Result<Vec<Tag>> {
        self.query_by_id(
            "SELECT t.tag_id, t.user_id, t.name
             FROM sys_tags t JOIN sys_recipe_tags rt ON rt.tag_id = t.tag_id
             WHERE rt.recipe_id = ? ORDER BY t.name, t.tag_id",
            recipe_id,
            Self::row_to_tag,
        )
    }

    fn recipe_ingredients(&self, recipe_id: i64) -> Result<Vec<Ingredient>> {
        self.query_by_id(
            "SELECT i.ingredient_id, i.user_id, i.name
             FROM sys_ingredients i JOIN sys_recipe_ingredients ri
               ON ri.ingredient_id = i.ingredient_id
             WHERE ri.recipe_id = ? ORDER BY i.name, i.ingredient_id",
            recipe_id,
            Self::row_to_ingredient,
        )
    }
}

// Helper functions

fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .ok()
}
