//! `rootlink hub` - Subnet hub provisioning.

use anyhow::Result;
use colored::Colorize;
use rootlink::{Bootstrapper, HubInit};
use serde_json::json;

use super::Context;
use crate::cli::args::{HubArgs, HubCommands};
use crate::output::print_json;

pub async fn execute(ctx: Context, args: HubArgs) -> Result<()> {
    match args.command {
        HubCommands::Init { token, name, force } => init(&ctx, token, name, force).await,
    }
}

async fn init(ctx: &Context, token: String, name: Option<String>, force: bool) -> Result<()> {
    let mut cfg = ctx.load_config()?;
    let client = ctx.client(&cfg)?;

    let request = HubInit {
        bootstrap_token: token,
        subnet_name: name,
        force,
    };
    let out = Bootstrapper::new(&client).hub_init(&mut cfg, &request).await?;

    if ctx.is_json() {
        return print_json(&json!({
            "subnet_id": out.subnet_id,
            "key_path": out.key_path,
            "cert_path": out.cert_path,
            "ca_path": out.ca_path,
            "forge": out.forge,
        }));
    }

    println!(
        "{} Subnet {} registered; this node is its hub.",
        "Success:".green().bold(),
        out.subnet_id.cyan()
    );
    println!("  {} {}", "key:".bold(), out.key_path.display());
    println!("  {} {}", "cert:".bold(), out.cert_path.display());
    println!("  {} {}", "ca:".bold(), out.ca_path.display());

    if let Some(forge) = &out.forge {
        println!();
        println!("{}", "Configuration repository".bold());
        if let Some(repo) = &forge.repo {
            println!("  {} {}", "repo:".bold(), repo);
        }
        if let Some(path) = &forge.path {
            println!("  {} {}", "path:".bold(), path);
        }
    }
    Ok(())
}
