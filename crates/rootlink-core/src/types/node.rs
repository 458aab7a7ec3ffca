use std::collections::BTreeSet;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::RootError;

/// Role of a node inside its subnet
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeRole {
    /// The subnet hub; the only role allowed to talk to Root on the owner's behalf
    #[default]
    Hub,
    /// A member node attached to a hub
    Member,
}

impl NodeRole {
    /// Lowercase wire/persisted name
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Hub => "hub",
            Self::Member => "member",
        }
    }
}

impl FromStr for NodeRole {
    type Err = RootError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "hub" => Ok(Self::Hub),
            "member" => Ok(Self::Member),
            other => Err(RootError::Config(format!(
                "role must be 'hub' or 'member', got '{other}'"
            ))),
        }
    }
}

impl fmt::Display for NodeRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Owner account bound to this hub's subnet
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OwnerProfile {
    /// Owner identifier; equal to the subnet id
    pub owner_id: String,

    /// Subject reported by Root (usually the human owner's login)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,

    /// Granted scopes
    #[serde(default)]
    pub scopes: BTreeSet<String>,

    /// Expiry of the cached access token
    pub access_expires_at: DateTime<Utc>,

    /// Hubs registered under the owner account
    #[serde(default)]
    pub hub_ids: BTreeSet<String>,
}

/// Root authentication state persisted with the node
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RootState {
    /// Last issued access token
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_token_cached: Option<String>,

    /// Refresh token kept inline when no secure store is available
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token_fallback: Option<String>,

    /// Owner profile created by login
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile: Option<OwnerProfile>,
}

impl RootState {
    /// Returns true if nothing is worth persisting
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.profile.is_none()
            && self.access_token_cached.is_none()
            && self.refresh_token_fallback.is_none()
    }
}

/// Credential slot on disk
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CredentialRole {
    /// Subnet hub key and certificate
    Hub,
    /// Node key and certificate
    Node,
}

impl CredentialRole {
    /// File stem used for this slot
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Hub => "hub",
            Self::Node => "node",
        }
    }
}

impl fmt::Display for CredentialRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Private key and leaf certificate locations of one slot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyCertPaths {
    /// PEM private key
    pub key: PathBuf,
    /// PEM leaf certificate
    pub cert: PathBuf,
}

/// Credential locations recorded after bootstrap
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialPaths {
    /// Subnet CA certificate
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ca: Option<PathBuf>,

    /// Hub slot
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hub: Option<KeyCertPaths>,

    /// Node slot
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node: Option<KeyCertPaths>,
}

impl CredentialPaths {
    /// Returns true if no credential was ever recorded
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.hub.is_none() && self.node.is_none() && self.ca.is_none()
    }

    /// Record the paths of one slot
    pub fn set(&mut self, role: CredentialRole, paths: KeyCertPaths) {
        match role {
            CredentialRole::Hub => self.hub = Some(paths),
            CredentialRole::Node => self.node = Some(paths),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_parsing() {
        assert_eq!("hub".parse::<NodeRole>().unwrap(), NodeRole::Hub);
        assert_eq!(" Member ".parse::<NodeRole>().unwrap(), NodeRole::Member);
        assert!("leader".parse::<NodeRole>().is_err());
        assert_eq!(NodeRole::Member.to_string(), "member");
    }

    #[test]
    fn test_root_state_emptiness() {
        let mut state = RootState::default();
        assert!(state.is_empty());
        state.access_token_cached = Some("AT".into());
        assert!(!state.is_empty());
    }

    #[test]
    fn test_credential_paths_set() {
        let mut paths = CredentialPaths::default();
        assert!(paths.is_empty());
        paths.set(
            CredentialRole::Node,
            KeyCertPaths {
                key: "node.key".into(),
                cert: "node.crt".into(),
            },
        );
        assert!(paths.hub.is_none());
        assert_eq!(paths.node.unwrap().cert, PathBuf::from("node.crt"));
    }
}
