//! # rootlink-pki
//!
//! Cryptographic identity material for rootlink hubs and nodes.
//!
//! ## Hierarchy
//!
//! ```text
//! Root authority
//!        │
//!        └── Subnet CA  (ca.crt, shared by every node of the subnet)
//!               │
//!               ├── Hub certificate   (hub.key / hub.crt)
//!               └── Node certificate  (node.key / node.crt)
//! ```
//!
//! Private keys never leave the host. Only the CSR produced by
//! [`KeyMaterial::generate`] crosses the wire; the signed certificates come
//! back from Root and are stored through [`CredentialLayout`].
//!
//! ## Example
//!
//! ```rust,ignore
//! use rootlink_pki::fs::FileBatch;
//! use rootlink_pki::{CredentialLayout, CsrSubject, KeyMaterial};
//! use rootlink_core::CredentialRole;
//!
//! let material = KeyMaterial::generate(&CsrSubject::hub_pending(), rootlink_pki::DEFAULT_KEY_BITS)?;
//! // ... submit material.csr_pem() to Root ...
//! let layout = CredentialLayout::under(base_dir);
//! let mut batch = FileBatch::new();
//! layout.stage_private_key(&mut batch, CredentialRole::Hub, material.key_pem())?;
//! // ... stage the certificates Root returned ...
//! batch.commit()?;
//! ```

pub mod fs;
mod layout;
mod material;

pub use layout::CredentialLayout;
pub use material::{CsrSubject, KeyMaterial, DEFAULT_KEY_BITS};
