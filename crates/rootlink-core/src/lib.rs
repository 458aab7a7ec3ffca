//! Core types and errors shared by the rootlink crates.
//!
//! This crate provides the foundational pieces used across the workspace:
//!
//! - **Types**: the local identity model ([`NodeRole`], [`OwnerProfile`],
//!   [`RootState`], [`CredentialPaths`]) and the JSON shapes exchanged with
//!   the Root authority
//! - **Errors**: the [`RootError`] taxonomy shared by every layer
//!
//! # Example
//!
//! ```rust,ignore
//! use rootlink_core::{NodeRole, Result, RootError};
//!
//! fn require_hub(role: NodeRole) -> Result<()> {
//!     if role != NodeRole::Hub {
//!         return Err(RootError::AuthState("hub role required".into()));
//!     }
//!     Ok(())
//! }
//! ```

mod error;
pub mod types;

pub use error::{
    Result, RootError, AUTHORIZATION_PENDING, EXPIRED_DEVICE_CODE, EXPIRED_TOKEN, SLOW_DOWN,
};
pub use types::*;
