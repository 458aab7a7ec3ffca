//! Secure storage for owner refresh tokens.

use std::collections::HashMap;
use std::sync::Mutex;

use rootlink_core::{Result, RootError};

/// Opaque secret storage keyed by owner id.
///
/// Implementations return [`RootError::SecretStoreUnavailable`] when the
/// backing store cannot be used on this host; callers then keep the refresh
/// token inline in the node document instead.
pub trait SecretStore: Send + Sync {
    /// Store (or replace) the refresh token of an owner
    fn save_refresh(&self, owner_id: &str, refresh_token: &str) -> Result<()>;

    /// Load the refresh token of an owner, `None` if none is stored
    fn load_refresh(&self, owner_id: &str) -> Result<Option<String>>;

    /// Remove the refresh token of an owner; removing nothing is not an error
    fn delete_refresh(&self, owner_id: &str) -> Result<()>;
}

/// Process-local store
#[derive(Debug, Default)]
pub struct MemorySecretStore {
    tokens: Mutex<HashMap<String, String>>,
}

impl MemorySecretStore {
    fn with_tokens<T>(&self, f: impl FnOnce(&mut HashMap<String, String>) -> T) -> Result<T> {
        let mut tokens = self
            .tokens
            .lock()
            .map_err(|_| RootError::SecretStore("memory store lock poisoned".into()))?;
        Ok(f(&mut tokens))
    }
}

impl SecretStore for MemorySecretStore {
    fn save_refresh(&self, owner_id: &str, refresh_token: &str) -> Result<()> {
        self.with_tokens(|tokens| {
            tokens.insert(owner_id.to_string(), refresh_token.to_string());
        })
    }

    fn load_refresh(&self, owner_id: &str) -> Result<Option<String>> {
        self.with_tokens(|tokens| tokens.get(owner_id).cloned())
    }

    fn delete_refresh(&self, owner_id: &str) -> Result<()> {
        self.with_tokens(|tokens| {
            tokens.remove(owner_id);
        })
    }
}

/// Store for hosts without any secure storage; every call reports unavailable
#[derive(Debug, Default, Clone, Copy)]
pub struct UnavailableSecretStore;

impl UnavailableSecretStore {
    fn unavailable() -> RootError {
        RootError::SecretStoreUnavailable("no secure credential store configured".into())
    }
}

impl SecretStore for UnavailableSecretStore {
    fn save_refresh(&self, _owner_id: &str, _refresh_token: &str) -> Result<()> {
        Err(Self::unavailable())
    }

    fn load_refresh(&self, _owner_id: &str) -> Result<Option<String>> {
        Err(Self::unavailable())
    }

    fn delete_refresh(&self, _owner_id: &str) -> Result<()> {
        Err(Self::unavailable())
    }
}

#[cfg(feature = "keyring")]
pub use os_keyring::KeyringSecretStore;

#[cfg(feature = "keyring")]
mod os_keyring {
    use super::{Result, RootError, SecretStore};

    /// Service name used when none is given
    const DEFAULT_SERVICE: &str = "rootlink";

    /// OS keyring (Secret Service, Keychain, Credential Manager)
    #[derive(Debug, Clone)]
    pub struct KeyringSecretStore {
        service: String,
    }

    impl Default for KeyringSecretStore {
        fn default() -> Self {
            Self::new(DEFAULT_SERVICE)
        }
    }

    impl KeyringSecretStore {
        /// Store entries under the given keyring service name
        pub fn new(service: impl Into<String>) -> Self {
            Self {
                service: service.into(),
            }
        }

        fn entry(&self, owner_id: &str) -> Result<keyring::Entry> {
            keyring::Entry::new(&self.service, owner_id).map_err(map_keyring_error)
        }
    }

    pub(super) fn map_keyring_error(err: keyring::Error) -> RootError {
        match err {
            keyring::Error::PlatformFailure(_) | keyring::Error::NoStorageAccess(_) => {
                RootError::SecretStoreUnavailable(err.to_string())
            }
            other => RootError::SecretStore(other.to_string()),
        }
    }

    impl SecretStore for KeyringSecretStore {
        fn save_refresh(&self, owner_id: &str, refresh_token: &str) -> Result<()> {
            self.entry(owner_id)?
                .set_password(refresh_token)
                .map_err(map_keyring_error)
        }

        fn load_refresh(&self, owner_id: &str) -> Result<Option<String>> {
            match self.entry(owner_id)?.get_password() {
                Ok(token) => Ok(Some(token)),
                Err(keyring::Error::NoEntry) => Ok(None),
                Err(e) => Err(map_keyring_error(e)),
            }
        }

        fn delete_refresh(&self, owner_id: &str) -> Result<()> {
            match self.entry(owner_id)?.delete_credential() {
                Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
                Err(e) => Err(map_keyring_error(e)),
            }
        }
    }
}
