//! Tag commands - create and list a user's tags

use anyhow::Result;
use clap::Subcommand;
use recipe_core::{LogEvent, LoggingService};

use super::{get_context, log_event, require_user};
use crate::output;

#[derive(Subcommand)]
pub enum TagCommands {
    /// Create a tag
    New {
        /// Tag name
        name: String,
        /// Email of the owning user
        #[arg(long, env = "RECIPE_USER")]
        user: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// List a user's tags
    List {
        /// Email of the owning user
        #[arg(long, env = "RECIPE_USER")]
        user: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

pub fn run(command: TagCommands, logger: &Option<LoggingService>) -> Result<()> {
    let ctx = get_context()?;

    match command {
        TagCommands::New { name, user, json } => {
            let owner = require_user(&ctx, &user)?;
            let tag = ctx.recipe_service.create_tag(&owner, &name)?;
            log_event(logger, LogEvent::new("tag_created").with_entity("tag"));

            if json {
                return output::print_json(&tag);
            }
            output::success(&format!("Tag '{}' created (ID {})", tag, tag.id));
        }
        TagCommands::List { user, json } => {
            let owner = require_user(&ctx, &user)?;
            let tags = ctx.recipe_service.list_tags(&owner)?;

            if json {
                return output::print_json(&tags);
            }
            if tags.is_empty() {
                println!("No tags found.");
                return Ok(());
            }

            let mut table = output::create_table();
            table.set_header(vec!["ID", "Name"]);
            for tag in &tags {
                table.add_row(vec![tag.id.to_string(), tag.to_string()]);
            }
            println!("{}", table);
        }
    }

    Ok(())
}
