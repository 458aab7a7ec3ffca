use std::time::Duration;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Poll interval used when Root does not send one
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);

/// Device code lifetime used when Root does not send one
pub const DEFAULT_DEVICE_CODE_TTL: Duration = Duration::from_secs(600);

/// Request body for `POST /v1/auth/owner/start`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OwnerStartRequest {
    /// Owner to authenticate (the subnet id)
    pub owner_id: String,
}

/// Device authorization issued by Root
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DeviceAuthorization {
    /// Code exchanged by polling
    #[serde(default)]
    pub device_code: Option<String>,

    /// Short code the owner types at the verification page
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_code: Option<String>,

    /// Page where the owner approves the request
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verification_uri: Option<String>,

    /// Verification page with the user code pre-filled
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verification_uri_complete: Option<String>,

    /// Seconds between polls
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interval: Option<u64>,

    /// Seconds until the device code expires
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_in: Option<u64>,
}

impl DeviceAuthorization {
    /// Poll interval, never shorter than one second
    #[must_use]
    pub fn poll_interval(&self) -> Duration {
        self.interval
            .map_or(DEFAULT_POLL_INTERVAL, |secs| Duration::from_secs(secs.max(1)))
    }

    /// Lifetime of the device code
    #[must_use]
    pub fn lifetime(&self) -> Duration {
        self.expires_in
            .map_or(DEFAULT_DEVICE_CODE_TTL, Duration::from_secs)
    }
}

/// Request body for `POST /v1/auth/owner/poll`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OwnerPollRequest {
    /// Device code from [`DeviceAuthorization`]
    pub device_code: String,
}

/// Tokens granted once the owner approved the device code
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OwnerGrant {
    /// Bearer token for owner-scoped calls
    #[serde(default)]
    pub access_token: Option<String>,

    /// Long-lived token for [`TokenRefreshRequest`]
    #[serde(default)]
    pub refresh_token: Option<String>,

    /// ISO-8601 expiry of the access token
    #[serde(default)]
    pub expires_at: Option<String>,

    /// Authenticated subject
    #[serde(default)]
    pub subject: Option<String>,

    /// Granted scopes
    #[serde(default, deserialize_with = "string_entries")]
    pub scopes: Option<Vec<String>>,

    /// Owner the grant belongs to
    #[serde(default)]
    pub owner_id: Option<String>,

    /// Hubs already attached to the owner
    #[serde(default, deserialize_with = "string_entries")]
    pub hub_ids: Option<Vec<String>>,
}

/// Only the string entries of a list survive; a non-list reads as absent
fn string_entries<'de, D>(deserializer: D) -> Result<Option<Vec<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Array(items)) => Some(
            items
                .into_iter()
                .filter_map(|item| match item {
                    Value::String(s) => Some(s),
                    _ => None,
                })
                .collect(),
        ),
        _ => None,
    })
}

/// Request body for `POST /v1/auth/owner/refresh`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenRefreshRequest {
    /// Refresh token issued at login
    pub refresh_token: String,
}

/// Access token issued by a refresh
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RefreshedToken {
    /// New bearer token
    #[serde(default)]
    pub access_token: Option<String>,

    /// ISO-8601 expiry of the new token
    #[serde(default)]
    pub expires_at: Option<String>,
}
