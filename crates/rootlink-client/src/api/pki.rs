//! Certificate enrollment endpoints.

use crate::client::{Credential, Transport};
use crate::RootHttpClient;
use rootlink_core::{EnrollRequest, Result};

/// Certificate enrollment endpoints
pub struct PkiApi<'a> {
    client: &'a RootHttpClient,
}

impl<'a> PkiApi<'a> {
    pub(crate) const fn new(client: &'a RootHttpClient) -> Self {
        Self { client }
    }

    /// Submit a CSR for signing; the raw enrollment response is returned
    pub async fn enroll(
        &self,
        access_token: &str,
        request: &EnrollRequest,
    ) -> Result<serde_json::Value> {
        self.client
            .submit_csr(
                "/v1/pki/enroll",
                request,
                Credential::Bearer(access_token),
                Transport::Default,
            )
            .await
    }
}
