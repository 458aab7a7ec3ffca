//! `rootlink root` - Owner login against Root.

use anyhow::Result;
use colored::Colorize;
use rootlink::{format_timestamp, DeviceAuthorization};
use serde_json::json;

use super::Context;
use crate::cli::args::{RootArgs, RootCommands};
use crate::output::print_json;

pub async fn execute(ctx: Context, args: RootArgs) -> Result<()> {
    match args.command {
        RootCommands::Login => login(&ctx).await,
        RootCommands::Whoami => whoami(&ctx).await,
        RootCommands::Token => token(&ctx).await,
        RootCommands::Logout => logout(&ctx),
    }
}

/// Instructions go to stderr so stdout stays machine readable.
fn show_device_prompt(start: &DeviceAuthorization) {
    eprintln!("{}", "Approve this hub as the subnet owner:".bold());
    if let Some(uri) = start
        .verification_uri_complete
        .as_deref()
        .or(start.verification_uri.as_deref())
    {
        eprintln!("  {} {}", "open:".bold(), uri.cyan());
    }
    if let Some(code) = &start.user_code {
        eprintln!("  {} {}", "code:".bold(), code.yellow().bold());
    }
    eprintln!("{}", "Waiting for approval...".dimmed());
}

async fn login(ctx: &Context) -> Result<()> {
    let mut cfg = ctx.load_config()?;
    let auth = ctx.auth(&cfg)?;

    let profile = auth
        .login_owner_with(&mut cfg, show_device_prompt)
        .await?;

    if ctx.is_json() {
        return print_json(&profile);
    }

    println!(
        "{} Logged in as owner {}.",
        "Success:".green().bold(),
        profile.owner_id.cyan()
    );
    if let Some(subject) = &profile.subject {
        println!("  {} {}", "subject:".bold(), subject);
    }
    if !profile.scopes.is_empty() {
        let scopes: Vec<&str> = profile.scopes.iter().map(String::as_str).collect();
        println!("  {} {}", "scopes:".bold(), scopes.join(" "));
    }
    println!(
        "  {} {}",
        "token expires:".bold(),
        format_timestamp(&profile.access_expires_at)
    );
    Ok(())
}

async fn whoami(ctx: &Context) -> Result<()> {
    let mut cfg = ctx.load_config()?;
    let auth = ctx.auth(&cfg)?;
    let me = auth.whoami(&mut cfg).await?;
    print_json(&me)
}

async fn token(ctx: &Context) -> Result<()> {
    let mut cfg = ctx.load_config()?;
    let auth = ctx.auth(&cfg)?;
    let token = auth.get_access_token(&mut cfg).await?;

    if ctx.is_json() {
        let expires_at = cfg.profile().map(|p| format_timestamp(&p.access_expires_at));
        return print_json(&json!({ "access_token": token, "expires_at": expires_at }));
    }
    println!("{token}");
    Ok(())
}

fn logout(ctx: &Context) -> Result<()> {
    let mut cfg = ctx.load_config()?;
    let auth = ctx.auth(&cfg)?;
    auth.logout(&mut cfg)?;

    if ctx.is_json() {
        return print_json(&json!({ "logged_out": true }));
    }
    println!("{} Owner login removed.", "Success:".green().bold());
    Ok(())
}
