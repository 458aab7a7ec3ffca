//! Persisted node identity and Root state.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use chrono::Utc;
use rootlink_client::DEFAULT_ROOT_URL;
use rootlink_core::{
    parse_timestamp, CredentialPaths, NodeRole, OwnerProfile, Result, RootError, RootState,
};
use rootlink_pki::fs::write_atomic;
use rootlink_pki::CredentialLayout;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use uuid::Uuid;

/// File name of the node document inside the base directory
pub const CONFIG_FILE_NAME: &str = "node.toml";

/// Shared token written into a freshly created document
pub const DEFAULT_DEV_TOKEN: &str = "dev-local-token";

/// Local identity of this node plus everything learned from Root.
///
/// The document is rewritten as a whole on every [`NodeConfig::save`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NodeConfig {
    /// Node identifier
    pub node_id: String,

    /// Subnet identifier; also the owner id used for Root login
    pub subnet_id: String,

    /// True once `subnet_id` came from hub init or was set explicitly,
    /// rather than being the placeholder generated on first load
    pub subnet_registered: bool,

    /// Role inside the subnet
    pub role: NodeRole,

    /// Hub this member reports to; never set for a hub
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hub_url: Option<String>,

    /// Shared token used by local services
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,

    /// Root authority base URL
    pub root_url: String,

    /// Credential files written by bootstrap
    #[serde(skip_serializing_if = "CredentialPaths::is_empty")]
    pub keys: CredentialPaths,

    /// Owner login state
    #[serde(skip_serializing_if = "root_is_empty")]
    pub root: Option<RootState>,

    #[serde(skip)]
    path: PathBuf,
}

fn root_is_empty(root: &Option<RootState>) -> bool {
    root.as_ref().map_or(true, RootState::is_empty)
}

/// On-disk shape; top-level fields are typed, `[root]` is normalized by hand
#[derive(Debug, Deserialize)]
struct StoredDocument {
    #[serde(default)]
    node_id: Option<String>,
    #[serde(default)]
    subnet_id: Option<String>,
    #[serde(default)]
    subnet_registered: bool,
    #[serde(default)]
    role: Option<String>,
    #[serde(default)]
    hub_url: Option<String>,
    #[serde(default)]
    token: Option<String>,
    #[serde(default)]
    root_url: Option<String>,
    #[serde(default)]
    keys: CredentialPaths,
    #[serde(default)]
    root: Option<toml::Value>,
}

impl NodeConfig {
    /// Load the document under `base_dir`, creating it with [`DEFAULT_DEV_TOKEN`]
    pub fn load(base_dir: &Path) -> Result<Self> {
        Self::load_with(base_dir, DEFAULT_DEV_TOKEN)
    }

    /// Load the document under `base_dir`.
    ///
    /// A missing document is created with random ids, the hub role and
    /// `default_token`, and persisted immediately.
    pub fn load_with(base_dir: &Path, default_token: &str) -> Result<Self> {
        let path = Self::file_path(base_dir);

        if !path.exists() {
            let cfg = Self::fresh(path, default_token);
            cfg.save()?;
            info!(
                node_id = %cfg.node_id,
                subnet_id = %cfg.subnet_id,
                path = %cfg.path.display(),
                "created node identity"
            );
            return Ok(cfg);
        }

        let content = std::fs::read_to_string(&path)?;
        let stored: StoredDocument = toml::from_str(&content)?;
        let cfg = Self::from_stored(stored, path, default_token)?;
        debug!(path = %cfg.path.display(), role = %cfg.role, "loaded node identity");
        Ok(cfg)
    }

    /// Location of the document for a base directory
    #[must_use]
    pub fn file_path(base_dir: &Path) -> PathBuf {
        base_dir.join(CONFIG_FILE_NAME)
    }

    fn fresh(path: PathBuf, default_token: &str) -> Self {
        Self {
            node_id: Uuid::new_v4().to_string(),
            subnet_id: Uuid::new_v4().to_string(),
            subnet_registered: false,
            role: NodeRole::Hub,
            hub_url: None,
            token: Some(default_token.to_string()),
            root_url: DEFAULT_ROOT_URL.to_string(),
            keys: CredentialPaths::default(),
            root: None,
            path,
        }
    }

    fn from_stored(stored: StoredDocument, path: PathBuf, default_token: &str) -> Result<Self> {
        let role = match non_empty(stored.role) {
            Some(role) => role.parse::<NodeRole>()?,
            None => NodeRole::Hub,
        };

        let hub_url = match role {
            NodeRole::Hub => None,
            NodeRole::Member => Some(non_empty(stored.hub_url).ok_or_else(|| {
                RootError::Config(format!("member role requires hub_url in {}", path.display()))
            })?),
        };

        // Documents written before the flag existed count as registered
        // when hub credentials were already recorded.
        let subnet_id = non_empty(stored.subnet_id);
        let subnet_registered =
            subnet_id.is_some() && (stored.subnet_registered || stored.keys.hub.is_some());

        Ok(Self {
            node_id: non_empty(stored.node_id).unwrap_or_else(|| Uuid::new_v4().to_string()),
            subnet_id: subnet_id.unwrap_or_else(|| Uuid::new_v4().to_string()),
            subnet_registered,
            role,
            hub_url,
            token: Some(non_empty(stored.token).unwrap_or_else(|| default_token.to_string())),
            root_url: non_empty(stored.root_url).unwrap_or_else(|| DEFAULT_ROOT_URL.to_string()),
            keys: stored.keys,
            root: stored.root.and_then(normalize_root),
            path,
        })
    }

    /// Write the whole document atomically with owner-only permissions
    pub fn save(&self) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        write_atomic(&self.path, content.as_bytes(), true)?;
        debug!(path = %self.path.display(), "saved node identity");
        Ok(())
    }

    /// Path of the persisted document
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Directory holding the document and the `keys/` directory
    #[must_use]
    pub fn base_dir(&self) -> &Path {
        self.path.parent().unwrap_or_else(|| Path::new("."))
    }

    /// Credential files for this node
    #[must_use]
    pub fn credential_layout(&self) -> CredentialLayout {
        CredentialLayout::under(self.base_dir())
    }

    /// Owner profile created by the last login
    #[must_use]
    pub fn profile(&self) -> Option<&OwnerProfile> {
        self.root.as_ref().and_then(|root| root.profile.as_ref())
    }

    /// Mutable owner profile
    pub fn profile_mut(&mut self) -> Option<&mut OwnerProfile> {
        self.root.as_mut().and_then(|root| root.profile.as_mut())
    }

    /// Root state, created empty if absent
    pub fn root_state_mut(&mut self) -> &mut RootState {
        self.root.get_or_insert_with(RootState::default)
    }

    /// Forget every piece of Root state
    pub fn clear_root(&mut self) {
        self.root = None;
    }

    /// Fail unless this node is the subnet hub
    pub fn ensure_hub(&self) -> Result<()> {
        ensure_hub(self)
    }

    /// Switch role and persist.
    ///
    /// Becoming a member needs a hub URL, either given here or already
    /// recorded. Becoming a hub clears the hub URL. A non-empty `subnet_id`
    /// replaces the current one and marks it registered. Nothing changes if
    /// validation fails.
    pub fn set_role(
        &mut self,
        role: NodeRole,
        hub_url: Option<String>,
        subnet_id: Option<String>,
    ) -> Result<()> {
        let hub_url = match role {
            NodeRole::Hub => None,
            NodeRole::Member => Some(
                non_empty(hub_url)
                    .or_else(|| self.hub_url.clone())
                    .ok_or_else(|| RootError::Config("member role requires hub_url".into()))?,
            ),
        };

        self.role = role;
        self.hub_url = hub_url;
        if let Some(subnet_id) = non_empty(subnet_id) {
            self.subnet_id = subnet_id;
            self.subnet_registered = true;
        }
        self.save()?;
        info!(role = %self.role, subnet_id = %self.subnet_id, "node role updated");
        Ok(())
    }
}

/// Guard for operations only the subnet hub may perform
pub fn ensure_hub(cfg: &NodeConfig) -> Result<()> {
    if cfg.role == NodeRole::Hub {
        Ok(())
    } else {
        Err(RootError::AuthState(format!(
            "this operation requires the hub role (current role: {})",
            cfg.role
        )))
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}

fn normalize_root(value: toml::Value) -> Option<RootState> {
    let toml::Value::Table(mut table) = value else {
        warn!("ignoring malformed [root] section");
        return None;
    };
    let state = RootState {
        access_token_cached: table.remove("access_token_cached").and_then(string_value),
        refresh_token_fallback: table.remove("refresh_token_fallback").and_then(string_value),
        profile: table.remove("profile").and_then(normalize_profile),
    };
    (!state.is_empty()).then_some(state)
}

fn normalize_profile(value: toml::Value) -> Option<OwnerProfile> {
    let toml::Value::Table(mut table) = value else {
        warn!("ignoring malformed owner profile");
        return None;
    };
    let Some(owner_id) = table.remove("owner_id").and_then(string_value) else {
        warn!("ignoring owner profile without owner_id");
        return None;
    };

    let access_expires_at = match table.remove("access_expires_at") {
        Some(toml::Value::String(s)) => parse_timestamp(&s).ok(),
        Some(toml::Value::Datetime(dt)) => parse_timestamp(&dt.to_string()).ok(),
        _ => None,
    }
    .unwrap_or_else(Utc::now);

    Some(OwnerProfile {
        owner_id,
        subject: table.remove("subject").and_then(string_value),
        scopes: string_set(table.remove("scopes")),
        access_expires_at,
        hub_ids: string_set(table.remove("hub_ids")),
    })
}

fn string_value(value: toml::Value) -> Option<String> {
    match value {
        toml::Value::String(s) if !s.is_empty() => Some(s),
        _ => None,
    }
}

fn string_set(value: Option<toml::Value>) -> BTreeSet<String> {
    match value {
        Some(toml::Value::Array(items)) => items.into_iter().filter_map(string_value).collect(),
        _ => BTreeSet::new(),
    }
}
