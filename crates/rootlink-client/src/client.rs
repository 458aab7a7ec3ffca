//! Main Root API client implementation.

use crate::api::{AuthApi, OwnerApi, PkiApi, RegistrationApi};
use crate::config::{ClientConfig, DEFAULT_ROOT_URL};
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::{Client as HttpClient, Method};
use rootlink_core::{MutualTls, Result, RootError};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

const AUTHORIZATION_HEADER: &str = "authorization";

/// Header carrying the one-time bootstrap token
pub(crate) const BOOTSTRAP_TOKEN_HEADER: &str = "x-bootstrap-token";

/// How a request proves who is calling
#[derive(Clone, Copy)]
pub(crate) enum Credential<'a> {
    /// Unauthenticated
    Anonymous,
    /// `Authorization: Bearer <token>`
    Bearer(&'a str),
    /// `X-Bootstrap-Token: <token>`
    BootstrapToken(&'a str),
}

/// Which TLS trust configuration a request runs under
#[derive(Clone, Copy)]
pub(crate) enum Transport<'a> {
    /// Shared client with the platform trust store
    Default,
    /// No server verification; used before any subnet CA is trusted
    Unverified,
    /// Client certificate plus subnet CA pinning
    MutualTls(&'a MutualTls),
}

/// Root authority API client
#[derive(Clone)]
pub struct RootHttpClient {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    http: HttpClient,
    base_url: String,
    config: ClientConfig,
}

impl std::fmt::Debug for RootHttpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RootHttpClient")
            .field("base_url", &self.inner.base_url)
            .field("config", &self.inner.config)
            .finish_non_exhaustive()
    }
}

impl RootHttpClient {
    /// Create a client for the given Root base URL using default settings
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        RootHttpClientBuilder::new().base_url(base_url).build()
    }

    /// Create a builder for custom configuration
    #[must_use]
    pub fn builder() -> RootHttpClientBuilder {
        RootHttpClientBuilder::new()
    }

    /// Base URL every path is resolved against
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.inner.base_url
    }

    /// Access owner authentication endpoints
    #[must_use]
    pub fn auth(&self) -> AuthApi<'_> {
        AuthApi::new(self)
    }

    /// Access owner hub directory endpoints
    #[must_use]
    pub fn owner(&self) -> OwnerApi<'_> {
        OwnerApi::new(self)
    }

    /// Access certificate enrollment endpoints
    #[must_use]
    pub fn pki(&self) -> PkiApi<'_> {
        PkiApi::new(self)
    }

    /// Access subnet and node bootstrap endpoints
    #[must_use]
    pub fn registration(&self) -> RegistrationApi<'_> {
        RegistrationApi::new(self)
    }

    /// Perform a GET request
    pub(crate) async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        credential: Credential<'_>,
    ) -> Result<T> {
        self.send::<T, ()>(
            Method::GET,
            path,
            None,
            credential,
            Transport::Default,
            self.inner.config.timeout,
        )
        .await
    }

    /// Perform a POST request with a JSON body
    pub(crate) async fn post<T: DeserializeOwned, B: Serialize>(
        &self,
        path: &str,
        body: &B,
        credential: Credential<'_>,
    ) -> Result<T> {
        self.send(
            Method::POST,
            path,
            Some(body),
            credential,
            Transport::Default,
            self.inner.config.timeout,
        )
        .await
    }

    /// POST a CSR for signing; uses the longer enrollment timeout
    pub(crate) async fn submit_csr<T: DeserializeOwned, B: Serialize>(
        &self,
        path: &str,
        body: &B,
        credential: Credential<'_>,
        transport: Transport<'_>,
    ) -> Result<T> {
        self.send(
            Method::POST,
            path,
            Some(body),
            credential,
            transport,
            self.inner.config.enroll_timeout,
        )
        .await
    }

    async fn send<T: DeserializeOwned, B: Serialize>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
        credential: Credential<'_>,
        transport: Transport<'_>,
        timeout: Duration,
    ) -> Result<T> {
        let url = self.build_url(path);
        debug!(method = %method, url = %url, "root request");

        let dedicated;
        let http = match transport {
            Transport::Default => &self.inner.http,
            Transport::Unverified => {
                dedicated = self.unverified_http()?;
                &dedicated
            }
            Transport::MutualTls(mtls) => {
                dedicated = self.mutual_tls_http(mtls)?;
                &dedicated
            }
        };

        let mut request = http
            .request(method.clone(), &url)
            .headers(credential_headers(credential)?)
            .timeout(timeout);
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request
            .send()
            .await
            .map_err(|e| RootError::transport(format!("{method} {path} failed: {e}")))?;

        self.handle_response(path, response).await
    }

    /// Join the base URL and an absolute API path
    fn build_url(&self, path: &str) -> String {
        format!("{}{}", self.inner.base_url, path)
    }

    /// Handle a Root response, classifying failures
    async fn handle_response<T: DeserializeOwned>(
        &self,
        path: &str,
        response: reqwest::Response,
    ) -> Result<T> {
        let status = response.status().as_u16();
        let text = response
            .text()
            .await
            .map_err(|e| RootError::transport(format!("reading {path} response failed: {e}")))?;
        let payload = decode_payload(&text);

        if status >= 400 {
            let err = protocol_error(status, &text, payload);
            if !err.is_poll_pending() {
                warn!(path, status, code = ?err.error_code(), "root rejected request");
            }
            return Err(err);
        }

        serde_json::from_value(payload.unwrap_or(serde_json::Value::Null))
            .map_err(|e| RootError::Validation(format!("unexpected response from {path}: {e}")))
    }

    fn unverified_http(&self) -> Result<HttpClient> {
        self.http_builder()
            .danger_accept_invalid_certs(true)
            .build()
            .map_err(|e| RootError::transport(format!("TLS setup failed: {e}")))
    }

    fn mutual_tls_http(&self, mtls: &MutualTls) -> Result<HttpClient> {
        let ca = reqwest::Certificate::from_pem(mtls.ca_pem.as_bytes())
            .map_err(|e| RootError::Crypto(format!("invalid CA certificate: {e}")))?;
        self.http_builder()
            .identity(client_identity(mtls)?)
            .tls_built_in_root_certs(false)
            .add_root_certificate(ca)
            .build()
            .map_err(|e| RootError::transport(format!("TLS setup failed: {e}")))
    }

    fn http_builder(&self) -> reqwest::ClientBuilder {
        HttpClient::builder().user_agent(&self.inner.config.user_agent)
    }
}

fn credential_headers(credential: Credential<'_>) -> Result<HeaderMap> {
    let mut headers = HeaderMap::new();
    let (name, value) = match credential {
        Credential::Anonymous => return Ok(headers),
        Credential::Bearer(token) => (AUTHORIZATION_HEADER, format!("Bearer {token}")),
        Credential::BootstrapToken(token) => (BOOTSTRAP_TOKEN_HEADER, token.to_string()),
    };
    let mut value = HeaderValue::from_str(&value)
        .map_err(|_| RootError::AuthState("token contains characters not allowed in a header".into()))?;
    value.set_sensitive(true);
    headers.insert(name, value);
    Ok(headers)
}

#[cfg(feature = "rustls")]
fn client_identity(mtls: &MutualTls) -> Result<reqwest::Identity> {
    let mut pem = mtls.key_pem.trim_end().to_string();
    pem.push('\n');
    pem.push_str(&mtls.cert_pem);
    reqwest::Identity::from_pem(pem.as_bytes())
        .map_err(|e| RootError::Crypto(format!("invalid hub credential: {e}")))
}

#[cfg(all(feature = "native-tls", not(feature = "rustls")))]
fn client_identity(mtls: &MutualTls) -> Result<reqwest::Identity> {
    reqwest::Identity::from_pkcs8_pem(mtls.cert_pem.as_bytes(), mtls.key_pem.as_bytes())
        .map_err(|e| RootError::Crypto(format!("invalid hub credential: {e}")))
}

/// Decode a body as JSON, falling back to the raw text
fn decode_payload(text: &str) -> Option<serde_json::Value> {
    if text.is_empty() {
        return None;
    }
    Some(
        serde_json::from_str(text)
            .unwrap_or_else(|_| serde_json::Value::String(text.to_string())),
    )
}

/// Convert an error response to a [`RootError::Protocol`]
fn protocol_error(status: u16, text: &str, payload: Option<serde_json::Value>) -> RootError {
    let field = |name: &str| {
        payload
            .as_ref()
            .and_then(|p| p.get(name))
            .and_then(|v| v.as_str())
            .filter(|s| !s.is_empty())
            .map(String::from)
    };

    let error_code = field("code").or_else(|| field("error"));
    let message = field("detail")
        .or_else(|| field("message"))
        .or_else(|| field("error"))
        .or_else(|| (!text.is_empty()).then(|| text.to_string()))
        .unwrap_or_else(|| format!("HTTP {status}"));

    RootError::Protocol {
        status,
        error_code,
        message,
        payload,
    }
}

/// Builder for configuring a [`RootHttpClient`]
#[derive(Debug, Clone)]
pub struct RootHttpClientBuilder {
    base_url: String,
    config: ClientConfig,
}

impl Default for RootHttpClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl RootHttpClientBuilder {
    /// Create a builder pointing at the public Root deployment
    #[must_use]
    pub fn new() -> Self {
        Self {
            base_url: DEFAULT_ROOT_URL.to_string(),
            config: ClientConfig::default(),
        }
    }

    /// Set the base URL (useful for testing)
    #[must_use]
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set the scoped-call timeout
    #[must_use]
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    /// Set the CSR submission timeout
    #[must_use]
    pub const fn enroll_timeout(mut self, timeout: Duration) -> Self {
        self.config.enroll_timeout = timeout;
        self
    }

    /// Set the User-Agent header
    #[must_use]
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.config.user_agent = agent.into();
        self
    }

    /// Replace the whole configuration
    #[must_use]
    pub fn config(mut self, config: ClientConfig) -> Self {
        self.config = config;
        self
    }

    /// Build the client
    pub fn build(self) -> Result<RootHttpClient> {
        let parsed = url::Url::parse(&self.base_url)
            .map_err(|e| RootError::Config(format!("invalid root url '{}': {e}", self.base_url)))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(RootError::Config(format!(
                "root url must be http(s): {}",
                self.base_url
            )));
        }

        let http = HttpClient::builder()
            .user_agent(&self.config.user_agent)
            .build()
            .map_err(|e| RootError::transport(format!("failed to build HTTP client: {e}")))?;

        Ok(RootHttpClient {
            inner: Arc::new(ClientInner {
                http,
                base_url: self.base_url.trim_end_matches('/').to_string(),
                config: self.config,
            }),
        })
    }
}
