//! Hubs attached to the owner account.

use std::collections::BTreeSet;

use rootlink_core::{Result, RootError};
use tracing::info;

use crate::node_config::{ensure_hub, NodeConfig};
use crate::RootAuthService;

/// Owner hub directory, scoped to the logged-in owner
pub struct OwnerHubsService<'a> {
    auth: &'a RootAuthService,
}

impl<'a> OwnerHubsService<'a> {
    pub(crate) const fn new(auth: &'a RootAuthService) -> Self {
        Self { auth }
    }

    /// Replace the locally cached hub ids with the set Root reports
    pub async fn sync(&self, cfg: &mut NodeConfig) -> Result<BTreeSet<String>> {
        ensure_hub(cfg)?;
        let token = self.auth.get_access_token(cfg).await?;
        let hubs = self.auth.http().owner().hubs_list(&token).await?;

        let hub_ids: BTreeSet<String> = hubs
            .into_iter()
            .filter_map(|hub| hub.hub_id)
            .filter(|id| !id.is_empty())
            .collect();

        if let Some(profile) = cfg.profile_mut() {
            profile.hub_ids.clone_from(&hub_ids);
        }
        cfg.save()?;

        info!(count = hub_ids.len(), "owner hubs synced");
        Ok(hub_ids)
    }

    /// Attach a hub (this node by default) to the owner account.
    ///
    /// On success the id is added to the cached set right away.
    pub async fn add_current_hub(&self, cfg: &mut NodeConfig, hub_id: Option<&str>) -> Result<String> {
        ensure_hub(cfg)?;
        let hub_id = hub_id
            .filter(|id| !id.is_empty())
            .map_or_else(|| cfg.node_id.clone(), str::to_string);
        if hub_id.is_empty() {
            return Err(RootError::AuthState("hub id is not configured".into()));
        }

        let token = self.auth.get_access_token(cfg).await?;
        self.auth.http().owner().hubs_add(&token, &hub_id).await?;

        if let Some(profile) = cfg.profile_mut() {
            profile.hub_ids.insert(hub_id.clone());
        }
        cfg.save()?;

        info!(hub_id = %hub_id, "hub attached to owner");
        Ok(hub_id)
    }
}
