//! Command implementations.

pub mod config;
pub mod hub;
pub mod hubs;
pub mod node;
pub mod pki;
pub mod root;

use std::path::PathBuf;
use std::sync::Arc;

use rootlink::{NodeConfig, RootAuthService, RootHttpClient, SecretStore};

use crate::output::OutputFormat;

/// Shared context for all commands.
#[derive(Debug, Clone)]
pub struct Context {
    /// Directory holding node.toml and keys/
    pub base_dir: PathBuf,

    /// Root URL override
    pub root_url: Option<String>,

    /// Token for a freshly created node document
    pub default_token: String,

    /// Output format
    pub output_format: OutputFormat,
}

impl Context {
    /// Load (or create) the node document.
    pub fn load_config(&self) -> anyhow::Result<NodeConfig> {
        Ok(NodeConfig::load_with(&self.base_dir, &self.default_token)?)
    }

    /// Create a Root client for the given node.
    pub fn client(&self, cfg: &NodeConfig) -> anyhow::Result<RootHttpClient> {
        let url = self.root_url.clone().unwrap_or_else(|| cfg.root_url.clone());
        Ok(RootHttpClient::new(url)?)
    }

    /// Create the owner authentication service for the given node.
    pub fn auth(&self, cfg: &NodeConfig) -> anyhow::Result<RootAuthService> {
        Ok(RootAuthService::new(self.client(cfg)?, secret_store()))
    }

    pub fn is_json(&self) -> bool {
        self.output_format == OutputFormat::Json
    }
}

/// OS keyring; hosts without one fall back to the node document
#[cfg(feature = "keyring")]
fn secret_store() -> Arc<dyn SecretStore> {
    Arc::new(rootlink::KeyringSecretStore::default())
}

#[cfg(not(feature = "keyring"))]
fn secret_store() -> Arc<dyn SecretStore> {
    Arc::new(rootlink::UnavailableSecretStore)
}
