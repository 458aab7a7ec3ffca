//! `rootlink pki` - Certificate enrollment.

use std::path::Path;

use anyhow::{Context as _, Result};
use colored::Colorize;
use rootlink_pki::fs::write_pem;

use super::Context;
use crate::cli::args::{PkiArgs, PkiCommands};
use crate::output::print_json;

pub async fn execute(ctx: Context, args: PkiArgs) -> Result<()> {
    match args.command {
        PkiCommands::Enroll {
            csr,
            hub_id,
            ttl,
            out,
        } => enroll(&ctx, &csr, hub_id, ttl.as_deref(), out.as_deref()).await,
    }
}

async fn enroll(
    ctx: &Context,
    csr_path: &Path,
    hub_id: Option<String>,
    ttl: Option<&str>,
    out: Option<&Path>,
) -> Result<()> {
    let csr_pem = std::fs::read_to_string(csr_path)
        .with_context(|| format!("could not read CSR from {}", csr_path.display()))?;

    let mut cfg = ctx.load_config()?;
    let hub_id = hub_id.unwrap_or_else(|| cfg.node_id.clone());
    let auth = ctx.auth(&cfg)?;
    let response = auth.pki().enroll(&mut cfg, &hub_id, &csr_pem, ttl).await?;

    let Some(out) = out else {
        return print_json(&response);
    };

    let cert_pem = response
        .get("cert_pem")
        .and_then(|v| v.as_str())
        .filter(|pem| !pem.is_empty())
        .ok_or_else(|| anyhow::anyhow!("enrollment response has no cert_pem; nothing written"))?;
    write_pem(out, cert_pem, false)?;

    if ctx.is_json() {
        return print_json(&response);
    }
    println!(
        "{} Certificate for {} written to {}.",
        "Success:".green().bold(),
        hub_id.cyan(),
        out.display()
    );
    Ok(())
}
