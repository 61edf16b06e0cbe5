//! Configuration module
//!
//! Handles CLI configuration: gateway URL and credentials.

use gateway_client::GatewayClient;

/// CLI configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// URL of the gateway service
    pub gateway_url: String,

    /// Bearer token, if the user supplied one
    pub token: Option<String>,
}

impl Config {
    /// Build a client for the configured gateway.
    pub fn client(&self) -> GatewayClient {
        let client = GatewayClient::new(&self.gateway_url);
        match &self.token {
            Some(token) => client.with_token(token),
            None => client,
        }
    }
}
