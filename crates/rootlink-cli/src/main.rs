//! rootlink - hub identity and owner login for a Root authority.

use anyhow::Result;

#[tokio::main]
async fn main() -> Result<()> {
    rootlink_cli::run().await
}
