//! Hub identity bootstrap and owner authentication against a Root authority.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//!
//! use rootlink::{MemorySecretStore, NodeConfig, RootAuthService, RootHttpClient};
//!
//! #[tokio::main]
//! async fn main() -> rootlink::Result<()> {
//!     let mut cfg = NodeConfig::load("/var/lib/rootlink".as_ref())?;
//!     let http = RootHttpClient::new(cfg.root_url.clone())?;
//!     let auth = RootAuthService::new(http, Arc::new(MemorySecretStore::default()));
//!
//!     // Device-code login; prints where the owner approves the hub
//!     let profile = auth
//!         .login_owner_with(&mut cfg, |start| {
//!             println!("visit {:?} and enter {:?}", start.verification_uri, start.user_code);
//!         })
//!         .await?;
//!     println!("logged in as {}", profile.owner_id);
//!
//!     // Scoped calls reuse the cached token until it is about to expire
//!     let hubs = auth.hubs().sync(&mut cfg).await?;
//!     println!("owner hubs: {hubs:?}");
//!
//!     Ok(())
//! }
//! ```
//!
//! # Features
//!
//! - `default` - Uses rustls for TLS
//! - `rustls` - Use rustls for TLS (recommended)
//! - `native-tls` - Use system native TLS
//! - `keyring` - Store refresh tokens in the OS keyring

#![doc(html_root_url = "https://docs.rs/rootlink/0.3.0")]

mod auth;
mod bootstrap;
mod hubs;
mod node_config;
mod pki;
mod poll;
mod secrets;

pub use auth::{RootAuthService, ACCESS_TOKEN_SKEW};
pub use bootstrap::{Bootstrapper, HubInit, HubProvisioned, NodeProvisioned, NodeRegister};
pub use hubs::OwnerHubsService;
pub use node_config::{ensure_hub, NodeConfig, CONFIG_FILE_NAME, DEFAULT_DEV_TOKEN};
pub use pki::PkiService;
pub use poll::{PollSleeper, TokioSleeper, SLOW_DOWN_STEP};
#[cfg(feature = "keyring")]
pub use secrets::KeyringSecretStore;
pub use secrets::{MemorySecretStore, SecretStore, UnavailableSecretStore};

// Re-export core types
pub use rootlink_core::*;

// Re-export client
pub use rootlink_client::{ClientConfig, RootHttpClient, RootHttpClientBuilder, DEFAULT_ROOT_URL};

// Re-export key material and layout
pub use rootlink_pki::{CredentialLayout, CsrSubject, KeyMaterial, DEFAULT_KEY_BITS};

// Re-export runtime for convenience
pub use serde_json;
pub use tokio;
