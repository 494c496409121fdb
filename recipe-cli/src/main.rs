//! Recipe CLI - manage recipe accounts and recipes from the terminal

use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use recipe_core::{LogEvent, LoggingService};

mod commands;
mod output;

use commands::{ingredient, logs, recipe, tag, users};

/// Recipe - accounts and recipes in your terminal
#[derive(Parser)]
#[command(name = "recipe", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a user
    Createuser {
        /// Email address (prompted if omitted)
        email: Option<String>,
        /// Password (read from RECIPE_PASSWORD, stdin or a prompt if omitted)
        #[arg(long)]
        password: Option<String>,
        /// Display name
        #[arg(long)]
        name: Option<String>,
        /// Give the user staff status
        #[arg(long)]
        staff: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Create a user with staff and superuser status
    Createsuperuser {
        /// Email address (prompted if omitted)
        email: Option<String>,
        /// Password (read from RECIPE_PASSWORD, stdin or a prompt if omitted)
        #[arg(long)]
        password: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// List users
    Users {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show a user
    User {
        /// Email address
        email: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Check a user's credentials and record the login
    Login {
        /// Email address
        email: String,
        /// Password (read from RECIPE_PASSWORD, stdin or a prompt if omitted)
        #[arg(long)]
        password: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Change a user's password
    Passwd {
        /// Email address
        email: String,
        /// New password (read from RECIPE_PASSWORD, stdin or a prompt if omitted)
        #[arg(long)]
        password: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Delete a user and everything they own
    Deleteuser {
        /// Email address
        email: String,
        /// Skip confirmation prompt
        #[arg(long, short)]
        force: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Manage tags
    Tag {
        #[command(subcommand)]
        command: tag::TagCommands,
    },

    /// Manage ingredients
    Ingredient {
        #[command(subcommand)]
        command: ingredient::IngredientCommands,
    },

    /// Manage recipes
    Recipe {
        #[command(subcommand)]
        command: recipe::RecipeCommands,
    },

    /// View and manage the event log
    Logs {
        #[command(subcommand)]
        command: logs::LogsCommands,
    },
}

impl Commands {
    /// Command name as recorded in the event log
    fn name(&self) -> &'static str {
        match self {
            Commands::Createuser { .. } => "createuser",
            Commands::Createsuperuser { .. } => "createsuperuser",
            Commands::Users { .. } => "users",
            Commands::User { .. } => "user",
            Commands::Login { .. } => "login",
            Commands::Passwd { .. } => "passwd",
            Commands::Deleteuser { .. } => "deleteuser",
            Commands::Tag { .. } => "tag",
            Commands::Ingredient { .. } => "ingredient",
            Commands::Recipe { .. } => "recipe",
            Commands::Logs { .. } => "logs",
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let name = cli.command.name();

    // The logs command manages the log itself; don't record it
    let logger = if matches!(cli.command, Commands::Logs { .. }) {
        None
    } else {
        commands::get_logger()
    };
    commands::log_event(&logger, LogEvent::new("command_executed").with_command(name));

    match run(cli, &logger) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            commands::log_event(
                &logger,
                LogEvent::new("command_failed")
                    .with_command(name)
                    .with_error(error_kind(&e)),
            );
            if !already_reported(&e) {
                output::error(&format!("{:#}", e));
            }
            ExitCode::FAILURE
        }
    }
}

/// Whether the command already showed this failure to the user
fn already_reported(err: &anyhow::Error) -> bool {
    err.downcast_ref::<commands::Reported>().is_some()
}

/// Error category for the event log. Messages can contain emails, so only
/// the kind is recorded.
fn error_kind(err: &anyhow::Error) -> &'static str {
    err.chain()
        .find_map(|cause| {
            cause
                .downcast_ref::<recipe_core::Error>()
                .map(|e| e.kind())
                .or_else(|| cause.downcast_ref::<commands::Reported>().map(|r| r.kind))
        })
        .unwrap_or("other")
}

fn run(cli: Cli, logger: &Option<LoggingService>) -> Result<()> {
    match cli.command {
        Commands::Createuser {
            email,
            password,
            name,
            staff,
            json,
        } => users::run_create(
            users::CreateUserArgs {
                email,
                password,
                name,
                staff,
                superuser: false,
                json,
            },
            logger,
        ),
        Commands::Createsuperuser {
            email,
            password,
            json,
        } => users::run_create(
            users::CreateUserArgs {
                email,
                password,
                name: None,
                staff: true,
                superuser: true,
                json,
            },
            logger,
        ),
        Commands::Users { json } => users::run_list(json),
        Commands::User { email, json } => users::run_show(&email, json),
        Commands::Login {
            email,
            password,
            json,
        } => users::run_login(&email, password, json, logger),
        Commands::Passwd {
            email,
            password,
            json,
        } => users::run_passwd(&email, password, json, logger),
        Commands::Deleteuser { email, force, json } => {
            users::run_delete(&email, force, json, logger)
        }
        Commands::Tag { command } => tag::run(command, logger),
        Commands::Ingredient { command } => ingredient::run(command, logger),
        Commands::Recipe { command } => recipe::run(command, logger),
        Commands::Logs { command } => logs::run(command),
    }
}
