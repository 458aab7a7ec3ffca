//! Owner hub directory endpoints.

use crate::client::Credential;
use crate::RootHttpClient;
use rootlink_core::{AddHubRequest, OwnerHub, Result};

/// Owner hub directory endpoints
pub struct OwnerApi<'a> {
    client: &'a RootHttpClient,
}

impl<'a> OwnerApi<'a> {
    pub(crate) const fn new(client: &'a RootHttpClient) -> Self {
        Self { client }
    }

    /// List hubs attached to the owner account
    pub async fn hubs_list(&self, access_token: &str) -> Result<Vec<OwnerHub>> {
        self.client
            .get("/v1/owner/hubs", Credential::Bearer(access_token))
            .await
    }

    /// Attach a hub to the owner account
    pub async fn hubs_add(&self, access_token: &str, hub_id: &str) -> Result<serde_json::Value> {
        let body = AddHubRequest {
            hub_id: hub_id.to_string(),
        };
        self.client
            .post("/v1/owner/hubs", &body, Credential::Bearer(access_token))
            .await
    }
}
