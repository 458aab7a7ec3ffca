//! `rootlink config` - Local configuration helpers.

use anyhow::Result;
use rootlink::NodeConfig;

use super::Context;
use crate::cli::args::{ConfigArgs, ConfigCommands};

pub async fn execute(ctx: Context, args: ConfigArgs) -> Result<()> {
    match args.command {
        ConfigCommands::Path => show_path(&ctx),
    }
}

fn show_path(ctx: &Context) -> Result<()> {
    println!("{}", NodeConfig::file_path(&ctx.base_dir).display());
    Ok(())
}
