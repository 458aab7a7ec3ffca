//! Subnet hub and node certificate provisioning.
//!
//! Both paths are all-or-nothing: key material is generated in memory, the
//! CSR is submitted, and only a fully validated answer from Root leads to
//! any file being written. The key, certificate and CA then replace their
//! previous versions together or not at all.

use std::path::PathBuf;

use rootlink_client::RootHttpClient;
use rootlink_core::{
    CredentialRole, ForgeHint, NodeRegisterRequest, NodeRegistrationCredential, Result, RootError,
    SubnetRegisterRequest,
};
use rootlink_pki::fs::FileBatch;
use rootlink_pki::{CsrSubject, KeyMaterial, DEFAULT_KEY_BITS};
use tracing::info;

use crate::node_config::NodeConfig;

/// Parameters of a hub initialization
#[derive(Debug, Clone, Default)]
pub struct HubInit {
    /// One-time bootstrap token issued by Root
    pub bootstrap_token: String,
    /// Display name of the new subnet
    pub subnet_name: Option<String>,
    /// Replace existing hub credentials
    pub force: bool,
}

/// Result of a hub initialization
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HubProvisioned {
    /// Subnet assigned by Root
    pub subnet_id: String,
    /// Hub private key
    pub key_path: PathBuf,
    /// Hub certificate
    pub cert_path: PathBuf,
    /// Subnet CA certificate
    pub ca_path: PathBuf,
    /// Configuration repository Root prepared for the subnet
    pub forge: Option<ForgeHint>,
}

/// Parameters of a node registration
#[derive(Debug, Clone, Default)]
pub struct NodeRegister {
    /// Bootstrap token; without one the hub vouches over mutual TLS
    pub bootstrap_token: Option<String>,
    /// Replace existing node credentials
    pub force: bool,
}

/// Result of a node registration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeProvisioned {
    /// Node id assigned by Root
    pub node_id: String,
    /// Node private key
    pub key_path: PathBuf,
    /// Node certificate
    pub cert_path: PathBuf,
    /// Subnet CA certificate, when Root sent one
    pub ca_path: Option<PathBuf>,
    /// True when the hub credential was used instead of a bootstrap token
    pub via_mutual_tls: bool,
}

/// Provisions hub and node credentials through Root
#[derive(Debug, Clone)]
pub struct Bootstrapper<'a> {
    http: &'a RootHttpClient,
    key_bits: usize,
}

impl<'a> Bootstrapper<'a> {
    /// Create a bootstrapper generating [`DEFAULT_KEY_BITS`] RSA keys
    #[must_use]
    pub const fn new(http: &'a RootHttpClient) -> Self {
        Self {
            http,
            key_bits: DEFAULT_KEY_BITS,
        }
    }

    /// Override the RSA key size
    #[must_use]
    pub const fn key_bits(mut self, bits: usize) -> Self {
        self.key_bits = bits;
        self
    }

    /// Register a new subnet with this node as its hub.
    ///
    /// Writes the hub key, hub certificate and subnet CA, then records the
    /// subnet id and paths in `cfg`.
    pub async fn hub_init(&self, cfg: &mut NodeConfig, request: &HubInit) -> Result<HubProvisioned> {
        if request.bootstrap_token.trim().is_empty() {
            return Err(RootError::AuthState("a bootstrap token is required for hub init".into()));
        }
        let layout = cfg.credential_layout();
        if !request.force {
            layout.ensure_vacant(CredentialRole::Hub)?;
        }

        let material = KeyMaterial::generate(&CsrSubject::hub_pending(), self.key_bits)?;
        let body = SubnetRegisterRequest {
            csr_pem: material.csr_pem().to_string(),
            subnet_name: request.subnet_name.clone().filter(|name| !name.is_empty()),
        };
        let issued = self
            .http
            .registration()
            .subnets_register(&body, &request.bootstrap_token)
            .await?
            .validate()?;

        let mut batch = FileBatch::new();
        let key_path = layout.stage_private_key(&mut batch, CredentialRole::Hub, material.key_pem())?;
        let cert_path = layout.stage_certificate(&mut batch, CredentialRole::Hub, &issued.cert_pem)?;
        let ca_path = layout.stage_ca(&mut batch, &issued.ca_pem)?;
        batch.commit()?;

        cfg.subnet_id.clone_from(&issued.subnet_id);
        cfg.subnet_registered = true;
        cfg.keys.set(CredentialRole::Hub, layout.slot(CredentialRole::Hub));
        cfg.keys.ca = Some(ca_path.clone());
        cfg.save()?;

        info!(subnet_id = %issued.subnet_id, "subnet registered; hub credentials stored");
        Ok(HubProvisioned {
            subnet_id: issued.subnet_id,
            key_path,
            cert_path,
            ca_path,
            forge: issued.forge,
        })
    }

    /// Register this node inside the configured subnet.
    ///
    /// The subnet must be known: set by a hub init on this machine or given
    /// explicitly through [`NodeConfig::set_role`].
    ///
    /// With a bootstrap token the token is the credential. Without one the
    /// hub's certificate is presented over mutual TLS, which requires a
    /// prior hub init on this machine.
    pub async fn node_register(
        &self,
        cfg: &mut NodeConfig,
        request: &NodeRegister,
    ) -> Result<NodeProvisioned> {
        if !cfg.subnet_registered || cfg.subnet_id.trim().is_empty() {
            return Err(RootError::AuthState(
                "no subnet is registered; run `rootlink hub init` or `rootlink node role <role> --subnet-id <id>` first".into(),
            ));
        }
        let layout = cfg.credential_layout();
        if !request.force {
            layout.ensure_vacant(CredentialRole::Node)?;
        }

        let (credential, subnet_id) = match request
            .bootstrap_token
            .as_deref()
            .filter(|token| !token.trim().is_empty())
        {
            Some(token) => (
                NodeRegistrationCredential::BootstrapToken(token.to_string()),
                Some(cfg.subnet_id.clone()),
            ),
            None => (NodeRegistrationCredential::MutualTls(layout.hub_mutual_tls()?), None),
        };
        let via_mutual_tls = matches!(credential, NodeRegistrationCredential::MutualTls(_));

        let material = KeyMaterial::generate(&CsrSubject::node_pending(&cfg.subnet_id), self.key_bits)?;
        let body = NodeRegisterRequest {
            csr_pem: material.csr_pem().to_string(),
            subnet_id,
        };
        let issued = self
            .http
            .registration()
            .nodes_register(&body, &credential)
            .await?
            .validate()?;

        let mut batch = FileBatch::new();
        let key_path = layout.stage_private_key(&mut batch, CredentialRole::Node, material.key_pem())?;
        let cert_path = layout.stage_certificate(&mut batch, CredentialRole::Node, &issued.cert_pem)?;
        let ca_path = issued
            .ca_pem
            .as_deref()
            .map(|pem| layout.stage_ca(&mut batch, pem))
            .transpose()?;
        batch.commit()?;

        cfg.node_id.clone_from(&issued.node_id);
        cfg.keys.set(CredentialRole::Node, layout.slot(CredentialRole::Node));
        if let Some(ca) = &ca_path {
            cfg.keys.ca = Some(ca.clone());
        }
        cfg.save()?;

        info!(node_id = %issued.node_id, via_mutual_tls, "node registered; node credentials stored");
        Ok(NodeProvisioned {
            node_id: issued.node_id,
            key_path,
            cert_path,
            ca_path,
            via_mutual_tls,
        })
    }
}
