//! Owner authentication endpoints.

use crate::client::Credential;
use crate::RootHttpClient;
use rootlink_core::{
    DeviceAuthorization, OwnerGrant, OwnerPollRequest, OwnerStartRequest, RefreshedToken, Result,
    TokenRefreshRequest,
};

/// Owner authentication endpoints
pub struct AuthApi<'a> {
    client: &'a RootHttpClient,
}

impl<'a> AuthApi<'a> {
    pub(crate) const fn new(client: &'a RootHttpClient) -> Self {
        Self { client }
    }

    /// Start a device-code login for the given owner
    pub async fn owner_start(&self, owner_id: &str) -> Result<DeviceAuthorization> {
        let body = OwnerStartRequest {
            owner_id: owner_id.to_string(),
        };
        self.client
            .post("/v1/auth/owner/start", &body, Credential::Anonymous)
            .await
    }

    /// Exchange a device code; fails with `authorization_pending` until approved
    pub async fn owner_poll(&self, device_code: &str) -> Result<OwnerGrant> {
        let body = OwnerPollRequest {
            device_code: device_code.to_string(),
        };
        self.client
            .post("/v1/auth/owner/poll", &body, Credential::Anonymous)
            .await
    }

    /// Exchange a refresh token for a new access token
    pub async fn token_refresh(&self, refresh_token: &str) -> Result<RefreshedToken> {
        let body = TokenRefreshRequest {
            refresh_token: refresh_token.to_string(),
        };
        self.client
            .post("/v1/auth/owner/refresh", &body, Credential::Anonymous)
            .await
    }

    /// Describe the identity behind an access token
    pub async fn whoami(&self, access_token: &str) -> Result<serde_json::Value> {
        self.client
            .get("/v1/whoami", Credential::Bearer(access_token))
            .await
    }
}
