//! `rootlink hubs` - Hubs attached to the owner account.

use anyhow::Result;
use colored::Colorize;
use serde_json::json;

use super::Context;
use crate::cli::args::{HubsArgs, HubsCommands};
use crate::output::print_json;

pub async fn execute(ctx: Context, args: HubsArgs) -> Result<()> {
    match args.command {
        HubsCommands::Sync => sync(&ctx).await,
        HubsCommands::Add { hub_id } => add(&ctx, hub_id.as_deref()).await,
    }
}

async fn sync(ctx: &Context) -> Result<()> {
    let mut cfg = ctx.load_config()?;
    let auth = ctx.auth(&cfg)?;
    let hub_ids = auth.hubs().sync(&mut cfg).await?;

    if ctx.is_json() {
        return print_json(&hub_ids);
    }

    if hub_ids.is_empty() {
        println!("{}", "No hubs are attached to the owner account.".dimmed());
        return Ok(());
    }
    println!("{}", "Owner hubs".bold().underline());
    for hub_id in &hub_ids {
        let marker = if *hub_id == cfg.node_id { " (this node)" } else { "" };
        println!("  {}{}", hub_id.cyan(), marker.dimmed());
    }
    Ok(())
}

async fn add(ctx: &Context, hub_id: Option<&str>) -> Result<()> {
    let mut cfg = ctx.load_config()?;
    let auth = ctx.auth(&cfg)?;
    let added = auth.hubs().add_current_hub(&mut cfg, hub_id).await?;

    if ctx.is_json() {
        return print_json(&json!({ "hub_id": added }));
    }
    println!(
        "{} Hub {} attached to the owner account.",
        "Success:".green().bold(),
        added.cyan()
    );
    Ok(())
}
