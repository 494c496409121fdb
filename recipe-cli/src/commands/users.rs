//! User commands - account management and the admin user views

use anyhow::Result;
use colored::Colorize;
use dialoguer::{Confirm, Input};
use recipe_core::{LogEvent, LoggingService, OperationResult, User, UserAdmin, UserFields};

use super::{
    get_context, get_new_password, get_password_or_prompt, log_event, require_user, Reported,
};
use crate::output;

/// Options shared by `createuser` and `createsuperuser`
pub struct CreateUserArgs {
    pub email: Option<String>,
    pub password: Option<String>,
    pub name: Option<String>,
    pub staff: bool,
    pub superuser: bool,
    pub json: bool,
}

fn prompt_email(email: Option<String>) -> Result<String> {
    match email {
        Some(e) => Ok(e),
        None => Ok(Input::new()
            .with_prompt("Email")
            .allow_empty(true)
            .interact_text()?),
    }
}

pub fn run_create(args: CreateUserArgs, logger: &Option<LoggingService>) -> Result<()> {
    let ctx = get_context()?;
    let email = prompt_email(args.email)?;
    let password = get_new_password(&email, args.password)?;

    let result = if args.superuser {
        ctx.account_manager.create_superuser(Some(&email), &password)
    } else {
        let mut fields = UserFields::default().staff(args.staff);
        if let Some(name) = args.name {
            fields = fields.with_name(name);
        }
        ctx.account_manager.create_user(Some(&email), &password, fields)
    };

    if let Ok(user) = &result {
        log_event(
            logger,
            LogEvent::new(if user.is_superuser { "superuser_created" } else { "user_created" })
                .with_entity("user"),
        );
    }

    if args.json {
        let kind = result.as_ref().err().map(|e| e.kind());
        output::print_json(&OperationResult::from(result))?;
        return match kind {
            Some(kind) => Err(Reported { kind }.into()),
            None => Ok(()),
        };
    }

    let user = result?;
    let kind = if user.is_superuser { "Superuser" } else { "User" };
    output::success(&format!("{} created successfully.", kind));
    println!("  ID: {}", user.id);
    println!("  Email: {}", user.email);
    Ok(())
}

/// The admin list view
pub fn run_list(json: bool) -> Result<()> {
    let ctx = get_context()?;
    let admin = UserAdmin::default();
    let mut users = ctx.account_manager.list_users()?;
    admin.sort(&mut users);

    if json {
        return output::print_json(&users);
    }

    if users.is_empty() {
        println!("No users found.");
        return Ok(());
    }

    let mut table = output::create_table();
    table.set_header(admin.list_headers());
    for user in &users {
        table.add_row(admin.list_row(user));
    }
    println!("{}", table);
    println!("{}", format!("{} user(s)", users.len()).dimmed());
    Ok(())
}

/// The admin detail view, grouped by fieldset
pub fn run_show(email: &str, json: bool) -> Result<()> {
    let ctx = get_context()?;
    let user = require_user(&ctx, email)?;
    let admin = UserAdmin::default();

    if json {
        return output::print_json(&user);
    }

    print_detail(&admin, &user);
    Ok(())
}

fn print_detail(admin: &UserAdmin, user: &User) {
    for (title, rows) in admin.detail(user) {
        if let Some(title) = title {
            println!();
            println!("{}", title.bold());
        }
        let mut table = output::create_table();
        for (label, value) in rows {
            table.add_row(vec![label.to_string(), value]);
        }
        println!("{}", table);
    }
}

pub fn run_login(
    email: &str,
    password: Option<String>,
    json: bool,
    logger: &Option<LoggingService>,
) -> Result<()> {
    let ctx = get_context()?;
    let password = get_password_or_prompt(password, "Password")?;
    let user = ctx.account_manager.authenticate(email, &password)?;

    match user {
        Some(user) => {
            log_event(logger, LogEvent::new("login_succeeded").with_entity("user"));
            if json {
                return output::print_json(&OperationResult::ok(user));
            }
            output::success(&format!("Logged in as {}", user));
            if let Some(at) = user.last_login {
                println!("  Last login: {}", at.format("%Y-%m-%d %H:%M:%S"));
            }
            Ok(())
        }
        None => {
            log_event(logger, LogEvent::new("login_failed").with_entity("user"));
            if json {
                output::print_json(&OperationResult::<User>::fail("Invalid credentials"))?;
            } else {
                output::error("Invalid email or password, or the account is inactive.");
            }
            Err(Reported { kind: "credential" }.into())
        }
    }
}

pub fn run_passwd(
    email: &str,
    password: Option<String>,
    json: bool,
    logger: &Option<LoggingService>,
) -> Result<()> {
    let ctx = get_context()?;
    let user = require_user(&ctx, email)?;
    let password = get_new_password(&user.email, password)?;
    let user = ctx.account_manager.set_password(user.id, &password)?;

    log_event(logger, LogEvent::new("password_changed").with_entity("user"));

    if json {
        return output::print_json(&OperationResult::ok(user));
    }
    output::success(&format!("Password changed for {}", user));
    Ok(())
}

pub fn run_delete(
    email: &str,
    force: bool,
    json: bool,
    logger: &Option<LoggingService>,
) -> Result<()> {
    let ctx = get_context()?;
    let user = require_user(&ctx, email)?;

    if !force && !json {
        output::warning(&format!(
            "This will delete {} and all of their tags, ingredients and recipes.",
            user
        ));
        if !Confirm::new()
            .with_prompt("Are you sure?")
            .default(false)
            .interact()?
        {
            println!("{}", "Cancelled".dimmed());
            return Ok(());
        }
    }

    let deleted = ctx.account_manager.delete_user(user.id)?;
    log_event(logger, LogEvent::new("user_deleted").with_entity("user"));

    if json {
        println!("{}", serde_json::json!({ "deleted": deleted, "id": user.id }));
    } else {
        output::success(&format!("Deleted {}", user));
    }
    Ok(())
}
