//! Fixed on-disk locations of hub, node and CA credentials.

use std::path::{Path, PathBuf};

use rootlink_core::{CredentialRole, KeyCertPaths, MutualTls, Result, RootError};
use tracing::debug;

use crate::fs::FileBatch;

/// Directory holding one key/certificate pair per role plus the subnet CA.
///
/// ```text
/// <dir>/hub.key   <dir>/hub.crt
/// <dir>/node.key  <dir>/node.crt
/// <dir>/ca.crt
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CredentialLayout {
    dir: PathBuf,
}

impl CredentialLayout {
    /// Use `dir` as the credential directory
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// The `keys/` directory under a node base directory
    #[must_use]
    pub fn under(base_dir: &Path) -> Self {
        Self::new(base_dir.join("keys"))
    }

    /// Credential directory
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Private key path of a slot
    #[must_use]
    pub fn key_path(&self, role: CredentialRole) -> PathBuf {
        self.dir.join(format!("{role}.key"))
    }

    /// Leaf certificate path of a slot
    #[must_use]
    pub fn cert_path(&self, role: CredentialRole) -> PathBuf {
        self.dir.join(format!("{role}.crt"))
    }

    /// Subnet CA certificate path
    #[must_use]
    pub fn ca_path(&self) -> PathBuf {
        self.dir.join("ca.crt")
    }

    /// Key and certificate paths of a slot
    #[must_use]
    pub fn slot(&self, role: CredentialRole) -> KeyCertPaths {
        KeyCertPaths {
            key: self.key_path(role),
            cert: self.cert_path(role),
        }
    }

    /// First file of the slot that already exists
    #[must_use]
    pub fn existing(&self, role: CredentialRole) -> Option<PathBuf> {
        [self.key_path(role), self.cert_path(role)]
            .into_iter()
            .find(|p| p.exists())
    }

    /// Fail with [`RootError::CredentialsExist`] unless the slot is empty
    pub fn ensure_vacant(&self, role: CredentialRole) -> Result<()> {
        match self.existing(role) {
            Some(path) => Err(RootError::CredentialsExist { role, path }),
            None => Ok(()),
        }
    }

    /// Stage a private key with owner-only permissions
    pub fn stage_private_key(
        &self,
        batch: &mut FileBatch,
        role: CredentialRole,
        pem: &str,
    ) -> Result<PathBuf> {
        let path = self.key_path(role);
        batch.add_pem(&path, pem, true)?;
        debug!(path = %path.display(), "staged private key");
        Ok(path)
    }

    /// Stage a signed leaf certificate
    pub fn stage_certificate(
        &self,
        batch: &mut FileBatch,
        role: CredentialRole,
        pem: &str,
    ) -> Result<PathBuf> {
        let path = self.cert_path(role);
        batch.add_pem(&path, pem, false)?;
        debug!(path = %path.display(), "staged certificate");
        Ok(path)
    }

    /// Stage the subnet CA certificate
    pub fn stage_ca(&self, batch: &mut FileBatch, pem: &str) -> Result<PathBuf> {
        let path = self.ca_path();
        batch.add_pem(&path, pem, false)?;
        debug!(path = %path.display(), "staged CA certificate");
        Ok(path)
    }

    /// Load the hub credential used to vouch for new nodes over mutual TLS
    pub fn hub_mutual_tls(&self) -> Result<MutualTls> {
        let key = self.key_path(CredentialRole::Hub);
        let cert = self.cert_path(CredentialRole::Hub);
        if !key.exists() || !cert.exists() {
            return Err(RootError::HubCredentialsMissing);
        }
        let ca = self.ca_path();
        if !ca.exists() {
            return Err(RootError::CaCertificateMissing);
        }
        Ok(MutualTls {
            cert_pem: std::fs::read_to_string(cert)?,
            key_pem: std::fs::read_to_string(key)?,
            ca_pem: std::fs::read_to_string(ca)?,
        })
    }
}
