//! Owner device-code login and access token lifecycle.

use std::sync::Arc;
use std::time::Duration;

use chrono::{TimeDelta, Utc};
use rootlink_client::RootHttpClient;
use rootlink_core::{
    parse_timestamp, require_field, DeviceAuthorization, OwnerGrant, OwnerProfile, Result,
    RootError, AUTHORIZATION_PENDING, SLOW_DOWN,
};
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::hubs::OwnerHubsService;
use crate::node_config::{ensure_hub, NodeConfig};
use crate::pki::PkiService;
use crate::poll::{PollSleeper, TokioSleeper, SLOW_DOWN_STEP};
use crate::secrets::SecretStore;

/// A cached access token is refreshed once it is this close to expiry
pub const ACCESS_TOKEN_SKEW: Duration = Duration::from_secs(30);

/// Owner authentication against Root for the subnet hub.
///
/// Drives the device-code flow, keeps the access token cached in the node
/// document and refreshes it shortly before it expires. The refresh token
/// lives in a [`SecretStore`]; when the store is unavailable it is kept
/// inline in the document instead.
pub struct RootAuthService {
    http: RootHttpClient,
    secrets: Arc<dyn SecretStore>,
    sleeper: Arc<dyn PollSleeper>,
    skew: Duration,
}

impl std::fmt::Debug for RootAuthService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RootAuthService")
            .field("http", &self.http)
            .field("skew", &self.skew)
            .finish_non_exhaustive()
    }
}

impl RootAuthService {
    /// Create a service sleeping on the tokio timer between polls
    pub fn new(http: RootHttpClient, secrets: Arc<dyn SecretStore>) -> Self {
        Self {
            http,
            secrets,
            sleeper: Arc::new(TokioSleeper),
            skew: ACCESS_TOKEN_SKEW,
        }
    }

    /// Replace the sleeper used between device-code polls
    #[must_use]
    pub fn with_sleeper(mut self, sleeper: Arc<dyn PollSleeper>) -> Self {
        self.sleeper = sleeper;
        self
    }

    /// Change the margin before expiry at which cached tokens are refreshed
    #[must_use]
    pub const fn with_skew(mut self, skew: Duration) -> Self {
        self.skew = skew;
        self
    }

    /// Underlying Root client
    #[must_use]
    pub const fn http(&self) -> &RootHttpClient {
        &self.http
    }

    /// Hubs attached to the owner account
    #[must_use]
    pub const fn hubs(&self) -> OwnerHubsService<'_> {
        OwnerHubsService::new(self)
    }

    /// Certificate enrollment
    #[must_use]
    pub const fn pki(&self) -> PkiService<'_> {
        PkiService::new(self)
    }

    /// Log the subnet owner in without reporting the verification URI
    pub async fn login_owner(&self, cfg: &mut NodeConfig) -> Result<OwnerProfile> {
        self.login_owner_with(cfg, |_| {}).await
    }

    /// Log the subnet owner in with the device-code flow.
    ///
    /// `on_start` receives the device authorization so the caller can show
    /// the verification URI and user code. The call returns once the owner
    /// approved, the code expired, or Root failed. Nothing is persisted
    /// unless the grant is complete and belongs to this subnet.
    pub async fn login_owner_with<F>(&self, cfg: &mut NodeConfig, on_start: F) -> Result<OwnerProfile>
    where
        F: FnOnce(&DeviceAuthorization) + Send,
    {
        ensure_hub(cfg)?;
        let owner_id = cfg.subnet_id.clone();

        let start = self.http.auth().owner_start(&owner_id).await?;
        let device_code = require_field(start.device_code.clone(), "device_code", "owner start")?;
        info!(
            owner_id = %owner_id,
            interval = ?start.poll_interval(),
            expires_in = ?start.lifetime(),
            "owner login started"
        );
        on_start(&start);

        let grant = self.poll_for_grant(&start, &device_code).await?;
        let (profile, access_token, refresh_token) = profile_from_grant(&owner_id, grant)?;

        let fallback = match self.secrets.save_refresh(&owner_id, &refresh_token) {
            Ok(()) => None,
            Err(RootError::SecretStoreUnavailable(reason)) => {
                warn!(%reason, "secret store unavailable; keeping refresh token in node document");
                Some(refresh_token)
            }
            Err(e) => return Err(e),
        };

        let stored = fallback.is_none();
        let previous = cfg.root.clone();
        let state = cfg.root_state_mut();
        state.profile = Some(profile.clone());
        state.access_token_cached = Some(access_token);
        state.refresh_token_fallback = fallback;
        if let Err(e) = cfg.save() {
            cfg.root = previous;
            if stored {
                if let Err(cleanup) = self.secrets.delete_refresh(&owner_id) {
                    warn!(error = %cleanup, "could not remove refresh token of unsaved login");
                }
            }
            return Err(e);
        }

        info!(owner_id = %profile.owner_id, expires_at = %profile.access_expires_at, "owner login completed");
        Ok(profile)
    }

    async fn poll_for_grant(&self, start: &DeviceAuthorization, device_code: &str) -> Result<OwnerGrant> {
        let deadline = Instant::now() + start.lifetime();
        let mut interval = start.poll_interval();

        loop {
            if Instant::now() >= deadline {
                return Err(RootError::Authentication(
                    "device code expired before the owner approved the login".into(),
                ));
            }

            match self.http.auth().owner_poll(device_code).await {
                Ok(grant) => return Ok(grant),
                Err(e) if e.error_code() == Some(AUTHORIZATION_PENDING) => {
                    debug!(?interval, "owner approval pending");
                }
                Err(e) if e.error_code() == Some(SLOW_DOWN) => {
                    interval += SLOW_DOWN_STEP;
                    debug!(?interval, "root asked to slow down");
                }
                Err(e) if e.is_device_code_expired() => {
                    return Err(RootError::Authentication(format!(
                        "device code rejected by root: {e}"
                    )));
                }
                Err(e) => return Err(e),
            }

            self.sleeper.sleep(interval).await;
        }
    }

    /// Return a usable owner access token.
    ///
    /// The cached token is returned without any network call while its
    /// expiry is more than the skew margin away; otherwise it is refreshed
    /// and persisted first.
    pub async fn get_access_token(&self, cfg: &mut NodeConfig) -> Result<String> {
        ensure_hub(cfg)?;
        let profile = cfg.profile().ok_or_else(login_required)?;

        let cached = cfg
            .root
            .as_ref()
            .and_then(|root| root.access_token_cached.as_deref())
            .filter(|token| !token.is_empty());
        let fresh_until = TimeDelta::from_std(self.skew)
            .ok()
            .and_then(|skew| profile.access_expires_at.checked_sub_signed(skew));
        if let (Some(token), Some(fresh_until)) = (cached, fresh_until) {
            if fresh_until > Utc::now() {
                return Ok(token.to_string());
            }
        }

        self.refresh(cfg).await
    }

    async fn refresh(&self, cfg: &mut NodeConfig) -> Result<String> {
        let owner_id = cfg
            .profile()
            .map(|profile| profile.owner_id.clone())
            .ok_or_else(login_required)?;
        let inline = cfg
            .root
            .as_ref()
            .and_then(|root| root.refresh_token_fallback.clone());

        let refresh_token = match self.secrets.load_refresh(&owner_id) {
            Ok(Some(token)) => Some(token),
            Ok(None) => inline,
            Err(RootError::SecretStoreUnavailable(reason)) => {
                debug!(%reason, "secret store unavailable; using inline refresh token");
                inline
            }
            Err(e) => return Err(e),
        }
        .filter(|token| !token.is_empty())
        .ok_or_else(|| RootError::AuthState("no refresh token available; login required".into()))?;

        let refreshed = self.http.auth().token_refresh(&refresh_token).await?;
        let access_token = require_field(refreshed.access_token, "access_token", "token refresh")?;
        let expires_at =
            parse_timestamp(&require_field(refreshed.expires_at, "expires_at", "token refresh")?)?;

        let state = cfg.root_state_mut();
        state.access_token_cached = Some(access_token.clone());
        if let Some(profile) = state.profile.as_mut() {
            profile.access_expires_at = expires_at;
        }
        cfg.save()?;

        info!(owner_id = %owner_id, expires_at = %expires_at, "owner access token refreshed");
        Ok(access_token)
    }

    /// Describe the owner behind the current access token
    pub async fn whoami(&self, cfg: &mut NodeConfig) -> Result<serde_json::Value> {
        let token = self.get_access_token(cfg).await?;
        self.http.auth().whoami(&token).await
    }

    /// Forget the owner login locally.
    ///
    /// Removing the refresh token from the secret store is best effort; the
    /// Root state in the document is always cleared and persisted.
    pub fn logout(&self, cfg: &mut NodeConfig) -> Result<()> {
        if let Some(profile) = cfg.profile() {
            match self.secrets.delete_refresh(&profile.owner_id) {
                Ok(()) | Err(RootError::SecretStoreUnavailable(_)) => {}
                Err(e) => warn!(error = %e, "could not remove refresh token from secret store"),
            }
        }
        cfg.clear_root();
        cfg.save()?;
        info!("owner logged out");
        Ok(())
    }
}

fn login_required() -> RootError {
    RootError::AuthState("not logged in to root; run `rootlink root login`".into())
}

fn profile_from_grant(owner_id: &str, grant: OwnerGrant) -> Result<(OwnerProfile, String, String)> {
    if let Some(returned) = grant.owner_id.as_deref().filter(|id| !id.is_empty()) {
        if returned != owner_id {
            return Err(RootError::Authentication(format!(
                "root granted access for owner '{returned}', expected '{owner_id}'"
            )));
        }
    }

    const CTX: &str = "owner poll";
    let access_token = require_field(grant.access_token, "access_token", CTX)?;
    let refresh_token = require_field(grant.refresh_token, "refresh_token", CTX)?;
    let access_expires_at = parse_timestamp(&require_field(grant.expires_at, "expires_at", CTX)?)?;

    let profile = OwnerProfile {
        owner_id: owner_id.to_string(),
        subject: grant.subject.filter(|s| !s.is_empty()),
        scopes: grant.scopes.unwrap_or_default().into_iter().collect(),
        access_expires_at,
        hub_ids: grant
            .hub_ids
            .unwrap_or_default()
            .into_iter()
            .filter(|id| !id.is_empty())
            .collect(),
    };
    Ok((profile, access_token, refresh_token))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grant(owner: Option<&str>) -> OwnerGrant {
        OwnerGrant {
            access_token: Some("AT".into()),
            refresh_token: Some("RT".into()),
            expires_at: Some("2099-01-01T00:00:00Z".into()),
            subject: Some("alice".into()),
            scopes: Some(vec!["pki:enroll".into(), "hubs:read".into(), "pki:enroll".into()]),
            owner_id: owner.map(str::to_string),
            hub_ids: None,
        }
    }

    #[test]
    fn test_profile_from_grant() {
        let (profile, access, refresh) = profile_from_grant("sn-1", grant(Some("sn-1"))).unwrap();
        assert_eq!(profile.owner_id, "sn-1");
        assert_eq!(profile.scopes.len(), 2);
        assert!(profile.hub_ids.is_empty());
        assert_eq!(access, "AT");
        assert_eq!(refresh, "RT");
    }

    #[test]
    fn test_profile_owner_mismatch() {
        let err = profile_from_grant("sn-1", grant(Some("sn-2"))).unwrap_err();
        assert!(matches!(err, RootError::Authentication(_)));
    }

    #[test]
    fn test_profile_requires_refresh_token() {
        let mut g = grant(None);
        g.refresh_token = Some(String::new());
        assert!(matches!(
            profile_from_grant("sn-1", g).unwrap_err(),
            RootError::Validation(ref m) if m.contains("refresh_token")
        ));
    }

    #[test]
    fn test_profile_rejects_bad_expiry() {
        let mut g = grant(None);
        g.expires_at = Some("soon".into());
        assert!(matches!(
            profile_from_grant("sn-1", g).unwrap_err(),
            RootError::Validation(_)
        ));
    }
}
