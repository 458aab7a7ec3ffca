use std::path::PathBuf;

use thiserror::Error;

use crate::types::CredentialRole;

/// Result type alias for rootlink operations
pub type Result<T> = std::result::Result<T, RootError>;

/// Machine error codes the Root authority uses while a device code is still
/// waiting for approval.
pub const AUTHORIZATION_PENDING: &str = "authorization_pending";
/// The client polls too fast and must widen its interval.
pub const SLOW_DOWN: &str = "slow_down";
/// The device code can no longer be exchanged.
pub const EXPIRED_TOKEN: &str = "expired_token";
/// Alternate spelling of [`EXPIRED_TOKEN`] used by some Root deployments.
pub const EXPIRED_DEVICE_CODE: &str = "expired_device_code";

/// Errors that can occur while provisioning or authenticating against Root
#[derive(Error, Debug)]
pub enum RootError {
    /// Connection, timeout or TLS setup failure; no HTTP status was received
    #[error("transport error: {message}")]
    Transport {
        /// Description of the underlying failure
        message: String,
    },

    /// Root answered with an HTTP status of 400 or above
    #[error("root error ({status}): {message}")]
    Protocol {
        /// HTTP status code
        status: u16,
        /// Machine-readable code from the `code`/`error` field
        error_code: Option<String>,
        /// Human-readable message
        message: String,
        /// Decoded response body
        payload: Option<serde_json::Value>,
    },

    /// A successful response is missing or mistypes a required field
    #[error("invalid response: {0}")]
    Validation(String),

    /// Role, registration or login precondition is not met
    #[error("{0}")]
    AuthState(String),

    /// Owner authentication was aborted
    #[error("authentication failed: {0}")]
    Authentication(String),

    /// Bootstrap refused to replace existing credentials
    #[error("{role} credentials already exist at {}; use --force to overwrite", path.display())]
    CredentialsExist {
        /// Credential slot that is already provisioned
        role: CredentialRole,
        /// First existing file found
        path: PathBuf,
    },

    /// Mutual-TLS registration needs a provisioned hub key and certificate
    #[error("hub credentials are missing; provide a bootstrap token or run `rootlink hub init`")]
    HubCredentialsMissing,

    /// Mutual-TLS registration needs the subnet CA certificate
    #[error("CA certificate is missing; run `rootlink hub init` first")]
    CaCertificateMissing,

    /// The secure credential store cannot be used on this host
    #[error("secret store unavailable: {0}")]
    SecretStoreUnavailable(String),

    /// The secure credential store is available but an operation failed
    #[error("secret store error: {0}")]
    SecretStore(String),

    /// The persisted node document is invalid
    #[error("configuration error: {0}")]
    Config(String),

    /// Key generation, CSR signing or PEM handling failed
    #[error("crypto error: {0}")]
    Crypto(String),

    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML decoding error
    #[error("toml error: {0}")]
    TomlDecode(#[from] toml::de::Error),

    /// TOML encoding error
    #[error("toml error: {0}")]
    TomlEncode(#[from] toml::ser::Error),
}

impl RootError {
    /// Build a transport error from any displayable failure
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    /// HTTP status associated with the error; transport failures report `0`
    #[must_use]
    pub const fn status_code(&self) -> Option<u16> {
        match self {
            Self::Transport { .. } => Some(0),
            Self::Protocol { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Machine error code returned by Root, if any
    #[must_use]
    pub fn error_code(&self) -> Option<&str> {
        match self {
            Self::Protocol { error_code, .. } => error_code.as_deref(),
            _ => None,
        }
    }

    /// Returns true for connect/timeout failures
    #[must_use]
    pub const fn is_transport(&self) -> bool {
        matches!(self, Self::Transport { .. })
    }

    /// Returns true if a device-code poll should simply be retried
    #[must_use]
    pub fn is_poll_pending(&self) -> bool {
        matches!(self.error_code(), Some(AUTHORIZATION_PENDING | SLOW_DOWN))
    }

    /// Returns true if the device code has expired on the Root side
    #[must_use]
    pub fn is_device_code_expired(&self) -> bool {
        matches!(self.error_code(), Some(EXPIRED_TOKEN | EXPIRED_DEVICE_CODE))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn protocol(code: Option<&str>) -> RootError {
        RootError::Protocol {
            status: 400,
            error_code: code.map(String::from),
            message: "bad".into(),
            payload: None,
        }
    }

    #[test]
    fn test_transport_reports_status_zero() {
        let err = RootError::transport("connection refused");
        assert_eq!(err.status_code(), Some(0));
        assert!(err.is_transport());
        assert!(err.error_code().is_none());
    }

    #[test]
    fn test_poll_classification() {
        assert!(protocol(Some("authorization_pending")).is_poll_pending());
        assert!(protocol(Some("slow_down")).is_poll_pending());
        assert!(!protocol(Some("expired_token")).is_poll_pending());
        assert!(protocol(Some("expired_token")).is_device_code_expired());
        assert!(protocol(Some("expired_device_code")).is_device_code_expired());
        assert!(!protocol(None).is_poll_pending());
        assert!(!RootError::Validation("x".into()).is_poll_pending());
    }

    #[test]
    fn test_credentials_exist_message() {
        let err = RootError::CredentialsExist {
            role: CredentialRole::Hub,
            path: PathBuf::from("/tmp/keys/hub.key"),
        };
        assert_eq!(
            err.to_string(),
            "hub credentials already exist at /tmp/keys/hub.key; use --force to overwrite"
        );
    }
}
