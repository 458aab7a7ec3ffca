use serde::{Deserialize, Serialize};

/// Request body for `POST /v1/pki/enroll`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnrollRequest {
    /// Hub the certificate is issued for
    pub hub_id: String,

    /// PEM-encoded certificate signing request
    pub csr_pem: String,

    /// Requested validity, in Root's duration syntax (e.g. `24h`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ttl: Option<String>,
}
