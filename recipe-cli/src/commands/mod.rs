//! CLI command implementations

pub mod ingredient;
pub mod logs;
pub mod recipe;
pub mod tag;
pub mod users;

use std::fmt;
use std::io::{self, BufRead};
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use dialoguer::Password;
use recipe_core::{AddUserForm, EntryPoint, LogEvent, LoggingService, RecipeContext, User};

/// Environment variable consulted for passwords before prompting
const PASSWORD_ENV: &str = "RECIPE_PASSWORD";

/// Get the logging service for CLI operations
///
/// Opened once per process and passed down to the commands; a second
/// instance on the same logs.duckdb would lose its writes.
/// Returns None if logging fails to initialize (shouldn't block operations)
pub fn get_logger() -> Option<LoggingService> {
    open_logger(&get_recipe_dir().ok()?)
}

/// Open the event log inside `recipe_dir`
pub fn open_logger(recipe_dir: &Path) -> Option<LoggingService> {
    std::fs::create_dir_all(recipe_dir).ok()?;
    LoggingService::new(recipe_dir, EntryPoint::Cli, env!("CARGO_PKG_VERSION")).ok()
}

/// Log an event, ignoring any errors (logging should never break the app)
pub fn log_event(logger: &Option<LoggingService>, event: LogEvent) {
    if let Some(l) = logger {
        let _ = l.log(event);
    }
}

/// A failure the command has already shown to the user (e.g. as `--json`
/// output). main records it and exits non-zero without printing it again.
#[derive(Debug)]
pub struct Reported {
    pub kind: &'static str,
}

impl fmt::Display for Reported {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} error (already reported)", self.kind)
    }
}

impl std::error::Error for Reported {}

/// Get the data directory from `RECIPE_DIR` or `~/.recipe`
pub fn get_recipe_dir() -> Result<PathBuf> {
    if let Ok(dir) = std::env::var("RECIPE_DIR") {
        return Ok(PathBuf::from(dir));
    }
    dirs::home_dir()
        .map(|home| home.join(".recipe"))
        .ok_or_else(|| anyhow!("Could not find home directory; set RECIPE_DIR"))
}

/// Get or create the recipe context
pub fn get_context() -> Result<RecipeContext> {
    let recipe_dir = get_recipe_dir()?;

    std::fs::create_dir_all(&recipe_dir)
        .with_context(|| format!("Failed to create recipe directory: {:?}", recipe_dir))?;

    RecipeContext::new(&recipe_dir).context("Failed to initialize recipe context")
}

/// Look up a user by email or fail with a readable message
pub fn require_user(ctx: &RecipeContext, email: &str) -> Result<User> {
    ctx.account_manager
        .find_by_email(email)?
        .ok_or_else(|| anyhow!("No user with email {}", email.trim()))
}

/// Read one line from piped stdin, if stdin is not a terminal
fn read_piped_line() -> Result<Option<String>> {
    if atty::is(atty::Stream::Stdin) {
        return Ok(None);
    }
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    let line = line.trim_end_matches(&['\r', '\n'][..]).to_string();
    Ok(if line.is_empty() { None } else { Some(line) })
}

/// Get a password from --password, `RECIPE_PASSWORD`, piped stdin, or a prompt
pub fn get_password_or_prompt(password_flag: Option<String>, prompt: &str) -> Result<String> {
    if let Some(p) = password_flag {
        return Ok(p);
    }
    if let Ok(p) = std::env::var(PASSWORD_ENV) {
        return Ok(p);
    }
    if let Some(p) = read_piped_line()? {
        return Ok(p);
    }
    Ok(Password::new().with_prompt(prompt).interact()?)
}

/// Get a new password, prompting twice when it has to be typed.
///
/// The two entries go through the add-user form so a mismatch is reported
/// the same way everywhere.
pub fn get_new_password(email: &str, password_flag: Option<String>) -> Result<String> {
    if let Some(p) = password_flag {
        return Ok(p);
    }
    if let Ok(p) = std::env::var(PASSWORD_ENV) {
        return Ok(p);
    }
    if let Some(p) = read_piped_line()? {
        return Ok(p);
    }

    let password1 = Password::new().with_prompt("Password").interact()?;
    let password2 = Password::new()
        .with_prompt("Password confirmation")
        .interact()?;

    let form = AddUserForm::new(email, password1, password2);
    let (_, password) = form.clean()?;
    Ok(password.to_string())
}
