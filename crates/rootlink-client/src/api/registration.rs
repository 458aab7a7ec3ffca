//! Subnet and node bootstrap endpoints.

use crate::client::{Credential, Transport};
use crate::RootHttpClient;
use rootlink_core::{
    NodeRegisterRequest, NodeRegistration, NodeRegistrationCredential, Result,
    SubnetRegisterRequest, SubnetRegistration,
};

/// Subnet and node bootstrap endpoints
pub struct RegistrationApi<'a> {
    client: &'a RootHttpClient,
}

impl<'a> RegistrationApi<'a> {
    pub(crate) const fn new(client: &'a RootHttpClient) -> Self {
        Self { client }
    }

    /// Register a new subnet; the bootstrap token is the only trust anchor,
    /// so the server certificate is not verified.
    pub async fn subnets_register(
        &self,
        request: &SubnetRegisterRequest,
        bootstrap_token: &str,
    ) -> Result<SubnetRegistration> {
        self.client
            .submit_csr(
                "/v1/subnets/register",
                request,
                Credential::BootstrapToken(bootstrap_token),
                Transport::Unverified,
            )
            .await
    }

    /// Register a node, proven either by a bootstrap token or by the hub's
    /// certificate over mutual TLS.
    pub async fn nodes_register(
        &self,
        request: &NodeRegisterRequest,
        credential: &NodeRegistrationCredential,
    ) -> Result<NodeRegistration> {
        let (credential, transport) = match credential {
            NodeRegistrationCredential::BootstrapToken(token) => {
                (Credential::BootstrapToken(token), Transport::Unverified)
            }
            NodeRegistrationCredential::MutualTls(mtls) => {
                (Credential::Anonymous, Transport::MutualTls(mtls))
            }
        };
        self.client
            .submit_csr("/v1/nodes/register", request, credential, transport)
            .await
    }
}
