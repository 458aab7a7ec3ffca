use std::fmt;

use serde::{Deserialize, Serialize};

use super::require_field;
use crate::Result;

/// Request body for `POST /v1/subnets/register`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubnetRegisterRequest {
    /// PEM CSR of the new hub key
    pub csr_pem: String,

    /// Optional display name for the subnet
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subnet_name: Option<String>,
}

/// Raw answer of `POST /v1/subnets/register`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SubnetRegistration {
    /// Identifier assigned to the subnet
    #[serde(default)]
    pub subnet_id: Option<String>,

    /// Signed hub certificate
    #[serde(default)]
    pub cert_pem: Option<String>,

    /// Subnet CA certificate
    #[serde(default)]
    pub ca_pem: Option<String>,

    /// Source forge hint for the subnet's configuration repository
    #[serde(default)]
    pub forge: Option<ForgeHint>,
}

/// Forge repository Root prepared for a new subnet
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForgeHint {
    /// Repository URL or slug
    #[serde(default)]
    pub repo: Option<String>,

    /// Path inside the repository
    #[serde(default)]
    pub path: Option<String>,
}

/// Subnet registration with every required field present
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedSubnet {
    /// Identifier assigned to the subnet
    pub subnet_id: String,
    /// Signed hub certificate
    pub cert_pem: String,
    /// Subnet CA certificate
    pub ca_pem: String,
    /// Forge hint, if Root sent one
    pub forge: Option<ForgeHint>,
}

impl SubnetRegistration {
    /// Check that Root returned everything needed to persist hub credentials
    pub fn validate(self) -> Result<IssuedSubnet> {
        const CTX: &str = "subnet registration";
        Ok(IssuedSubnet {
            subnet_id: require_field(self.subnet_id, "subnet_id", CTX)?,
            cert_pem: require_field(self.cert_pem, "cert_pem", CTX)?,
            ca_pem: require_field(self.ca_pem, "ca_pem", CTX)?,
            forge: self.forge,
        })
    }
}

/// Request body for `POST /v1/nodes/register`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeRegisterRequest {
    /// PEM CSR of the new node key
    pub csr_pem: String,

    /// Subnet to join; sent with bootstrap-token registrations
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subnet_id: Option<String>,
}

/// Raw answer of `POST /v1/nodes/register`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NodeRegistration {
    /// Identifier assigned to the node
    #[serde(default)]
    pub node_id: Option<String>,

    /// Signed node certificate
    #[serde(default)]
    pub cert_pem: Option<String>,

    /// Refreshed subnet CA certificate
    #[serde(default)]
    pub ca_pem: Option<String>,
}

/// Node registration with every required field present
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedNode {
    /// Identifier assigned to the node
    pub node_id: String,
    /// Signed node certificate
    pub cert_pem: String,
    /// Subnet CA certificate, when Root rotated or re-sent it
    pub ca_pem: Option<String>,
}

impl NodeRegistration {
    /// Check that Root returned everything needed to persist node credentials
    pub fn validate(self) -> Result<IssuedNode> {
        const CTX: &str = "node registration";
        Ok(IssuedNode {
            node_id: require_field(self.node_id, "node_id", CTX)?,
            cert_pem: require_field(self.cert_pem, "cert_pem", CTX)?,
            ca_pem: self.ca_pem.filter(|pem| !pem.is_empty()),
        })
    }
}

/// Client credential presented by the hub when vouching for a new node
#[derive(Clone)]
pub struct MutualTls {
    /// Hub leaf certificate (PEM)
    pub cert_pem: String,
    /// Hub private key (PEM)
    pub key_pem: String,
    /// Subnet CA used to verify Root (PEM)
    pub ca_pem: String,
}

impl fmt::Debug for MutualTls {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MutualTls")
            .field("cert_pem", &format_args!("<{} bytes>", self.cert_pem.len()))
            .field("key_pem", &"<redacted>")
            .field("ca_pem", &format_args!("<{} bytes>", self.ca_pem.len()))
            .finish()
    }
}

/// How a node registration proves it may join the subnet
#[derive(Clone)]
pub enum NodeRegistrationCredential {
    /// One-time bootstrap token sent as `X-Bootstrap-Token`
    BootstrapToken(String),
    /// The hub's own certificate, presented over mutual TLS
    MutualTls(MutualTls),
}

impl fmt::Debug for NodeRegistrationCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BootstrapToken(_) => f.write_str("BootstrapToken(<redacted>)"),
            Self::MutualTls(mtls) => f.debug_tuple("MutualTls").field(mtls).finish(),
        }
    }
}
