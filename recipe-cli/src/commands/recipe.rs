//! Recipe commands - create, list and show recipes and link tags/ingredients

use anyhow::{anyhow, Result};
use clap::Subcommand;
use colored::Colorize;
use dialoguer::Input;
use recipe_core::{LogEvent, LoggingService, NewRecipe, RecipeDetail};
use rust_decimal::Decimal;

use super::{get_context, log_event, require_user};
use crate::output;

#[derive(Subcommand)]
pub enum RecipeCommands {
    /// Create a recipe
    New {
        /// Recipe title
        title: String,
        /// Email of the owning user
        #[arg(long, env = "RECIPE_USER")]
        user: String,
        /// Preparation time in minutes
        #[arg(long)]
        time: Option<i64>,
        /// Cost, e.g. 5.50
        #[arg(long)]
        cost: Option<String>,
        /// Link to the original recipe
        #[arg(long)]
        link: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// List a user's recipes
    List {
        /// Email of the owning user
        #[arg(long, env = "RECIPE_USER")]
        user: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show a recipe with its tags and ingredients
    Show {
        /// Recipe ID
        id: i64,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Attach a tag to a recipe
    AddTag {
        /// Recipe ID
        recipe_id: i64,
        /// Tag ID
        tag_id: i64,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Attach an ingredient to a recipe
    AddIngredient {
        /// Recipe ID
        recipe_id: i64,
        /// Ingredient ID
        ingredient_id: i64,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

pub fn run(command: RecipeCommands, logger: &Option<LoggingService>) -> Result<()> {
    match command {
        RecipeCommands::New {
            title,
            user,
            time,
            cost,
            link,
            json,
        } => run_new(&title, &user, time, cost, link, json, logger),
        RecipeCommands::List { user, json } => run_list(&user, json),
        RecipeCommands::Show { id, json } => run_show(id, json),
        RecipeCommands::AddTag {
            recipe_id,
            tag_id,
            json,
        } => {
            let ctx = get_context()?;
            ctx.recipe_service.add_tag_to_recipe(recipe_id, tag_id)?;
            log_event(logger, LogEvent::new("recipe_tag_linked").with_entity("recipe"));
            finish_link(&ctx.recipe_service.recipe_detail(recipe_id)?, json)
        }
        RecipeCommands::AddIngredient {
            recipe_id,
            ingredient_id,
            json,
        } => {
            let ctx = get_context()?;
            ctx.recipe_service
                .add_ingredient_to_recipe(recipe_id, ingredient_id)?;
            log_event(
                logger,
                LogEvent::new("recipe_ingredient_linked").with_entity("recipe"),
            );
            finish_link(&ctx.recipe_service.recipe_detail(recipe_id)?, json)
        }
    }
}

fn run_new(
    title: &str,
    user: &str,
    time: Option<i64>,
    cost: Option<String>,
    link: Option<String>,
    json: bool,
    logger: &Option<LoggingService>,
) -> Result<()> {
    let ctx = get_context()?;
    let owner = require_user(&ctx, user)?;

    // Prompt for whatever wasn't passed as a flag
    let time_minutes = match time {
        Some(t) => t,
        None => Input::new()
            .with_prompt("Time (minutes)")
            .interact_text()?,
    };
    let cost_str = match cost {
        Some(c) => c,
        None => Input::new().with_prompt("Cost").interact_text()?,
    };
    let cost: Decimal = cost_str
        .trim()
        .parse()
        .map_err(|_| anyhow!("Invalid cost: {}", cost_str))?;

    let mut draft = NewRecipe::new(owner.id, title, time_minutes, cost)?;
    if let Some(link) = link {
        draft = draft.with_link(link)?;
    }
    let recipe = ctx.recipe_service.insert_recipe(draft)?;
    log_event(logger, LogEvent::new("recipe_created").with_entity("recipe"));

    if json {
        return output::print_json(&recipe);
    }
    output::success(&format!("Recipe '{}' created (ID {})", recipe, recipe.id));
    println!("  Time: {} min", recipe.time_minutes);
    println!("  Cost: {}", recipe.cost);
    Ok(())
}

fn run_list(user: &str, json: bool) -> Result<()> {
    let ctx = get_context()?;
    let owner = require_user(&ctx, user)?;
    let recipes = ctx.recipe_service.list_recipes(&owner)?;

    if json {
        return output::print_json(&recipes);
    }
    if recipes.is_empty() {
        println!("No recipes found.");
        return Ok(());
    }

    let mut table = output::create_table();
    table.set_header(vec!["ID", "Title", "Time (min)", "Cost"]);
    for recipe in &recipes {
        table.add_row(vec![
            recipe.id.to_string(),
            recipe.to_string(),
            recipe.time_minutes.to_string(),
            recipe.cost.to_string(),
        ]);
    }
    println!("{}", table);
    Ok(())
}

fn run_show(id: i64, json: bool) -> Result<()> {
    let ctx = get_context()?;
    let detail = ctx.recipe_service.recipe_detail(id)?;

    if json {
        return output::print_json(&detail);
    }
    print_detail(&detail);
    Ok(())
}

fn finish_link(detail: &RecipeDetail, json: bool) -> Result<()> {
    if json {
        return output::print_json(detail);
    }
    output::success("Linked.");
    print_detail(detail);
    Ok(())
}

fn print_detail(detail: &RecipeDetail) {
    let recipe = &detail.recipe;
    println!("{}", recipe.to_string().bold());

    let mut table = output::create_table();
    table.add_row(vec!["ID".to_string(), recipe.id.to_string()]);
    table.add_row(vec!["Time".to_string(), format!("{} min", recipe.time_minutes)]);
    table.add_row(vec!["Cost".to_string(), recipe.cost.to_string()]);
    if let Some(link) = &recipe.link {
        table.add_row(vec!["Link".to_string(), link.clone()]);
    }
    table.add_row(vec!["Tags".to_string(), join_names(&detail.tags)]);
    table.add_row(vec![
        "Ingredients".to_string(),
        join_names(&detail.ingredients),
    ]);
    println!("{}", table);
}

fn join_names<T: std::fmt::Display>(items: &[T]) -> String {
    if items.is_empty() {
        return "-".dimmed().to_string();
    }
    items
        .iter()
        .map(|i| i.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
