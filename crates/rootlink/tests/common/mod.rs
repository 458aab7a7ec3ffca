#![allow(dead_code)]

use std::collections::BTreeSet;
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rootlink::{
    MemorySecretStore, NodeConfig, NodeRole, OwnerProfile, PollSleeper, RootAuthService, RootHttpClient,
    SecretStore,
};
use wiremock::MockServer;

/// Records every requested wait instead of sleeping
#[derive(Debug, Default)]
pub struct RecordingSleeper {
    waits: Mutex<Vec<Duration>>,
}

impl RecordingSleeper {
    pub fn waits(&self) -> Vec<Duration> {
        self.waits.lock().unwrap().clone()
    }
}

#[async_trait]
impl PollSleeper for RecordingSleeper {
    async fn sleep(&self, duration: Duration) {
        self.waits.lock().unwrap().push(duration);
    }
}

pub struct Harness {
    pub dir: tempfile::TempDir,
    pub cfg: NodeConfig,
    pub http: RootHttpClient,
    pub sleeper: Arc<RecordingSleeper>,
}

impl Harness {
    pub fn new(server: &MockServer) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let mut cfg = NodeConfig::load(dir.path()).unwrap();
        cfg.root_url = server.uri();
        cfg.save().unwrap();
        Self {
            dir,
            cfg,
            http: RootHttpClient::new(server.uri()).unwrap(),
            sleeper: Arc::new(RecordingSleeper::default()),
        }
    }

    pub fn auth(&self, secrets: Arc<dyn SecretStore>) -> RootAuthService {
        RootAuthService::new(self.http.clone(), secrets).with_sleeper(self.sleeper.clone())
    }

    pub fn memory_auth(&self) -> (RootAuthService, Arc<MemorySecretStore>) {
        let store = Arc::new(MemorySecretStore::default());
        (self.auth(store.clone()), store)
    }

    pub fn reload(&self) -> NodeConfig {
        NodeConfig::load(self.dir.path()).unwrap()
    }

    pub fn base_dir(&self) -> &Path {
        self.dir.path()
    }

    /// Record a subnet id as if an operator had set it
    pub fn join_subnet(&mut self, subnet_id: &str) {
        self.cfg
            .set_role(NodeRole::Hub, None, Some(subnet_id.to_string()))
            .unwrap();
    }

    /// Pretend a login already happened
    pub fn logged_in(&mut self, access_token: &str, expires_at: DateTime<Utc>) {
        let owner_id = self.cfg.subnet_id.clone();
        let state = self.cfg.root_state_mut();
        state.access_token_cached = Some(access_token.to_string());
        state.profile = Some(OwnerProfile {
            owner_id,
            subject: Some("alice".into()),
            scopes: BTreeSet::new(),
            access_expires_at: expires_at,
            hub_ids: BTreeSet::new(),
        });
        self.cfg.save().unwrap();
    }
}
