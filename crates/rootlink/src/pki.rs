//! Certificate enrollment for the subnet hub.

use rootlink_core::{EnrollRequest, Result};
use tracing::info;

use crate::node_config::{ensure_hub, NodeConfig};
use crate::RootAuthService;

/// Certificate enrollment, scoped to the logged-in owner
pub struct PkiService<'a> {
    auth: &'a RootAuthService,
}

impl<'a> PkiService<'a> {
    pub(crate) const fn new(auth: &'a RootAuthService) -> Self {
        Self { auth }
    }

    /// Submit a CSR on behalf of `hub_id`.
    ///
    /// The raw enrollment response is returned; persisting the issued
    /// certificate is up to the caller.
    pub async fn enroll(
        &self,
        cfg: &mut NodeConfig,
        hub_id: &str,
        csr_pem: &str,
        ttl: Option<&str>,
    ) -> Result<serde_json::Value> {
        ensure_hub(cfg)?;
        let token = self.auth.get_access_token(cfg).await?;

        let request = EnrollRequest {
            hub_id: hub_id.to_string(),
            csr_pem: csr_pem.to_string(),
            ttl: ttl.filter(|t| !t.is_empty()).map(str::to_string),
        };
        let response = self.auth.http().pki().enroll(&token, &request).await?;

        info!(hub_id = %hub_id, "certificate enrolled");
        Ok(response)
    }
}
