//! HTTP client for the Root authority API.
//!
//! This crate provides [`RootHttpClient`], a thin JSON-over-HTTPS adapter.
//! Routes are grouped the way Root groups them:
//!
//! - [`RootHttpClient::auth`] - device-code owner login, token refresh, whoami
//! - [`RootHttpClient::owner`] - hubs attached to the owner account
//! - [`RootHttpClient::pki`] - certificate enrollment for hubs
//! - [`RootHttpClient::registration`] - subnet and node bootstrap
//!
//! Every failure is classified into [`RootError`]: connect and timeout
//! problems become [`RootError::Transport`], HTTP statuses of 400 and above
//! become [`RootError::Protocol`] with the machine `error_code` Root sent.

#[cfg(not(any(feature = "rustls", feature = "native-tls")))]
compile_error!("rootlink-client needs a TLS backend: enable `rustls` or `native-tls`");

mod client;
mod config;
pub mod api;

pub use client::{RootHttpClient, RootHttpClientBuilder};
pub use config::*;
pub use rootlink_core::{Result, RootError};
