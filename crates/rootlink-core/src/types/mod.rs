//! Type definitions for the local identity model and the Root wire protocol.

mod auth;
mod common;
mod node;
mod owner;
mod pki;
mod registration;

pub use auth::*;
pub use common::*;
pub use node::*;
pub use owner::*;
pub use pki::*;
pub use registration::*;
