//! Ingredient commands - create and list a user's ingredients

use anyhow::Result;
use clap::Subcommand;
use recipe_core::{LogEvent, LoggingService};

use super::{get_context, log_event, require_user};
use crate::output;

#[derive(Subcommand)]
pub enum IngredientCommands {
    /// Create an ingredient
    New {
        /// Ingredient name
        name: String,
        /// Email of the owning user
        #[arg(long, env = "RECIPE_USER")]
        user: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// List a user's ingredients
    List {
        /// Email of the owning user
        #[arg(long, env = "RECIPE_USER")]
        user: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

pub fn run(command: IngredientCommands, logger: &Option<LoggingService>) -> Result<()> {
    let ctx = get_context()?;

    match command {
        IngredientCommands::New { name, user, json } => {
            let owner = require_user(&ctx, &user)?;
            let ingredient = ctx.recipe_service.create_ingredient(&owner, &name)?;
            log_event(
                logger,
                LogEvent::new("ingredient_created").with_entity("ingredient"),
            );

            if json {
                return output::print_json(&ingredient);
            }
            output::success(&format!(
                "Ingredient '{}' created (ID {})",
                ingredient, ingredient.id
            ));
        }
        IngredientCommands::List { user, json } => {
            let owner = require_user(&ctx, &user)?;
            let ingredients = ctx.recipe_service.list_ingredients(&owner)?;

            if json {
                return output::print_json(&ingredients);
            }
            if ingredients.is_empty() {
                println!("No ingredients found.");
                return Ok(());
            }

            let mut table = output::create_table();
            table.set_header(vec!["ID", "Name"]);
            for ingredient in &ingredients {
                table.add_row(vec![ingredient.id.to_string(), ingredient.to_string()]);
            }
            println!("{}", table);
        }
    }

    Ok(())
}
