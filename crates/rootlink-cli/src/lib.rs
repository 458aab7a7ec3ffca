//! # rootlink-cli
//!
//! Operator command line for rootlink nodes.
//!
//! ## Features
//!
//! - **Node identity**: inspect the node document, switch between hub and member
//! - **Bootstrap**: register a subnet hub and its nodes with Root
//! - **Owner login**: device-code login, token refresh, whoami, logout
//! - **Owner scope**: hub directory sync and certificate enrollment
//! - **Output formats**: pretty text or JSON

pub mod cli;
pub mod output;

pub use cli::run;
