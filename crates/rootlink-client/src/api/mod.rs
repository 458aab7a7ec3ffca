//! API endpoint modules.

mod auth;
mod owner;
mod pki;
mod registration;

pub use auth::AuthApi;
pub use owner::OwnerApi;
pub use pki::PkiApi;
pub use registration::RegistrationApi;
