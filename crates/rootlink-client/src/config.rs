//! Client configuration types.

use std::time::Duration;

/// Root base URL used when the node document does not name one
pub const DEFAULT_ROOT_URL: &str = "https://api.rootlink.io";

/// Timeout for owner-scoped and auth calls
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

/// Timeout for calls that submit a CSR for signing
pub const DEFAULT_ENROLL_TIMEOUT: Duration = Duration::from_secs(30);

/// Timeouts and identification used by [`crate::RootHttpClient`]
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Timeout for scoped calls
    pub timeout: Duration,

    /// Timeout for enrollment and registration calls
    pub enroll_timeout: Duration,

    /// User-Agent header
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            enroll_timeout: DEFAULT_ENROLL_TIMEOUT,
            user_agent: format!("rootlink/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl ClientConfig {
    /// Set the scoped-call timeout
    #[must_use]
    pub const fn timeout(mut self, duration: Duration) -> Self {
        self.timeout = duration;
        self
    }

    /// Set the CSR submission timeout
    #[must_use]
    pub const fn enroll_timeout(mut self, duration: Duration) -> Self {
        self.enroll_timeout = duration;
        self
    }
}
