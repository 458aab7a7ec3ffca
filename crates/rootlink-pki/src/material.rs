//! Keypair and CSR generation.

use std::fmt;

use rcgen::{CertificateParams, DistinguishedName, DnType, KeyPair};
use rootlink_core::{Result, RootError};
use rsa::pkcs8::{EncodePrivateKey, LineEnding};
use rsa::RsaPrivateKey;
use tracing::debug;

/// RSA modulus size used for hub and node keys
pub const DEFAULT_KEY_BITS: usize = 3072;

/// Subject placed in a CSR; Root rewrites it when signing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsrSubject {
    /// Common name
    pub common_name: String,
    /// Organization, if any
    pub organization: Option<String>,
}

impl CsrSubject {
    /// Subject of a hub CSR before the subnet exists
    #[must_use]
    pub fn hub_pending() -> Self {
        Self {
            common_name: "subnet:pending".to_string(),
            organization: None,
        }
    }

    /// Subject of a node CSR for the given subnet
    #[must_use]
    pub fn node_pending(subnet_id: &str) -> Self {
        Self {
            common_name: "node:pending".to_string(),
            organization: Some(format!("subnet:{subnet_id}")),
        }
    }

    fn distinguished_name(&self) -> DistinguishedName {
        let mut dn = DistinguishedName::new();
        dn.push(DnType::CommonName, self.common_name.as_str());
        if let Some(org) = &self.organization {
            dn.push(DnType::OrganizationName, org.as_str());
        }
        dn
    }
}

/// A fresh private key and the CSR it signed.
///
/// Nothing is written to disk here; callers persist the key only after Root
/// accepted the CSR.
pub struct KeyMaterial {
    key_pem: String,
    csr_pem: String,
}

impl KeyMaterial {
    /// Generate an RSA key of `bits` and a SHA-256 signed CSR for `subject`
    pub fn generate(subject: &CsrSubject, bits: usize) -> Result<Self> {
        debug!(bits, cn = %subject.common_name, "generating key material");

        let private = RsaPrivateKey::new(&mut rand::thread_rng(), bits)
            .map_err(|e| RootError::Crypto(format!("key generation failed: {e}")))?;
        let key_pem = private
            .to_pkcs8_pem(LineEnding::LF)
            .map_err(|e| RootError::Crypto(format!("key encoding failed: {e}")))?;

        let key_pair = KeyPair::from_pem(key_pem.as_str())
            .map_err(|e| RootError::Crypto(format!("key import failed: {e}")))?;

        let mut params = CertificateParams::default();
        params.distinguished_name = subject.distinguished_name();

        let csr_pem = params
            .serialize_request(&key_pair)
            .and_then(|csr| csr.pem())
            .map_err(|e| RootError::Crypto(format!("CSR signing failed: {e}")))?;

        Ok(Self {
            key_pem: key_pem.as_str().to_owned(),
            csr_pem,
        })
    }

    /// PKCS#8 PEM private key
    #[must_use]
    pub fn key_pem(&self) -> &str {
        &self.key_pem
    }

    /// PEM certificate signing request
    #[must_use]
    pub fn csr_pem(&self) -> &str {
        &self.csr_pem
    }
}

impl fmt::Debug for KeyMaterial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyMaterial")
            .field("key_pem", &"<redacted>")
            .field("csr_pem", &self.csr_pem)
            .finish()
    }
}
