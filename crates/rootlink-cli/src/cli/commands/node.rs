//! `rootlink node` - Node identity and registration.

use anyhow::Result;
use colored::Colorize;
use rootlink::{format_timestamp, Bootstrapper, NodeConfig, NodeRegister, NodeRole};
use serde_json::{json, Value};

use super::Context;
use crate::cli::args::{NodeArgs, NodeCommands};
use crate::output::{mask_secret, print_json};

pub async fn execute(ctx: Context, args: NodeArgs) -> Result<()> {
    match args.command {
        NodeCommands::Show => show(&ctx),
        NodeCommands::Role {
            role,
            hub_url,
            subnet_id,
        } => set_role(&ctx, &role, hub_url, subnet_id),
        NodeCommands::Register { token, force } => register(&ctx, token, force).await,
    }
}

/// Node document as JSON with every secret masked.
fn masked_view(cfg: &NodeConfig) -> Result<Value> {
    let mut view = serde_json::to_value(cfg)?;
    mask_field(&mut view, &["token"]);
    mask_field(&mut view, &["root", "access_token_cached"]);
    mask_field(&mut view, &["root", "refresh_token_fallback"]);
    if let Some(obj) = view.as_object_mut() {
        obj.insert("path".into(), json!(cfg.path().display().to_string()));
    }
    Ok(view)
}

fn mask_field(value: &mut Value, path: &[&str]) {
    let Some((last, parents)) = path.split_last() else {
        return;
    };
    let mut cursor = value;
    for key in parents {
        match cursor.get_mut(*key) {
            Some(next) => cursor = next,
            None => return,
        }
    }
    if let Some(Value::String(secret)) = cursor.get_mut(*last) {
        *secret = mask_secret(secret);
    }
}

fn show(ctx: &Context) -> Result<()> {
    let cfg = ctx.load_config()?;

    if ctx.is_json() {
        return print_json(&masked_view(&cfg)?);
    }

    println!("{}", "Node".bold().underline());
    println!("  {} {}", "node_id:".bold(), cfg.node_id);
    println!("  {} {}", "subnet_id:".bold(), cfg.subnet_id);
    println!("  {} {}", "role:".bold(), cfg.role.to_string().cyan());
    if let Some(hub_url) = &cfg.hub_url {
        println!("  {} {}", "hub_url:".bold(), hub_url);
    }
    let token = cfg
        .token
        .as_deref()
        .map_or_else(|| "(not set)".dimmed().to_string(), mask_secret);
    println!("  {} {}", "token:".bold(), token);
    println!("  {} {}", "root_url:".bold(), cfg.root_url);

    if let Some(hub) = &cfg.keys.hub {
        println!("  {} {}", "hub cert:".bold(), hub.cert.display());
    }
    if let Some(node) = &cfg.keys.node {
        println!("  {} {}", "node cert:".bold(), node.cert.display());
    }
    if let Some(ca) = &cfg.keys.ca {
        println!("  {} {}", "ca cert:".bold(), ca.display());
    }

    println!();
    match cfg.profile() {
        Some(profile) => {
            println!("{}", "Owner".bold().underline());
            println!("  {} {}", "owner_id:".bold(), profile.owner_id);
            if let Some(subject) = &profile.subject {
                println!("  {} {}", "subject:".bold(), subject);
            }
            println!(
                "  {} {}",
                "token expires:".bold(),
                format_timestamp(&profile.access_expires_at)
            );
            if !profile.hub_ids.is_empty() {
                let hubs: Vec<&str> = profile.hub_ids.iter().map(String::as_str).collect();
                println!("  {} {}", "hubs:".bold(), hubs.join(", "));
            }
        }
        None => println!("{}", "Not logged in to Root.".dimmed()),
    }

    Ok(())
}

fn set_role(
    ctx: &Context,
    role: &str,
    hub_url: Option<String>,
    subnet_id: Option<String>,
) -> Result<()> {
    let role: NodeRole = role.parse()?;
    let mut cfg = ctx.load_config()?;
    cfg.set_role(role, hub_url, subnet_id)?;

    if ctx.is_json() {
        return print_json(&json!({
            "role": cfg.role,
            "hub_url": cfg.hub_url,
            "subnet_id": cfg.subnet_id,
        }));
    }

    println!(
        "{} Role set to {}.",
        "Success:".green().bold(),
        cfg.role.to_string().cyan()
    );
    if let Some(hub_url) = &cfg.hub_url {
        println!("  {} {}", "hub_url:".bold(), hub_url);
    }
    Ok(())
}

async fn register(ctx: &Context, token: Option<String>, force: bool) -> Result<()> {
    let mut cfg = ctx.load_config()?;
    let client = ctx.client(&cfg)?;

    let request = NodeRegister {
        bootstrap_token: token,
        force,
    };
    let out = Bootstrapper::new(&client)
        .node_register(&mut cfg, &request)
        .await?;

    if ctx.is_json() {
        return print_json(&json!({
            "node_id": out.node_id,
            "key_path": out.key_path,
            "cert_path": out.cert_path,
            "ca_path": out.ca_path,
            "via_mutual_tls": out.via_mutual_tls,
        }));
    }

    let via = if out.via_mutual_tls {
        "hub certificate"
    } else {
        "bootstrap token"
    };
    println!(
        "{} Node {} registered (via {}).",
        "Success:".green().bold(),
        out.node_id.cyan(),
        via
    );
    println!("  {} {}", "key:".bold(), out.key_path.display());
    println!("  {} {}", "cert:".bold(), out.cert_path.display());
    if let Some(ca) = &out.ca_path {
        println!("  {} {}", "ca:".bold(), ca.display());
    }
    Ok(())
}
