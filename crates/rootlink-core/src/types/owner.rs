use serde::{Deserialize, Serialize};

/// One entry of `GET /v1/owner/hubs`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OwnerHub {
    /// Hub identifier
    #[serde(default)]
    pub hub_id: Option<String>,

    /// Remaining fields Root reports for the hub
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Request body for `POST /v1/owner/hubs`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddHubRequest {
    /// Hub to attach to the owner account
    pub hub_id: String,
}
