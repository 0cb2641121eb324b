//! Client settings

use crate::protocol::NetworkType;

/// Connection settings of a [`Client`](super::Client).
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ClientConfig {
    /// Base URL of the node's public API, without the `/api/v1` suffix.
    pub endpoint: String,
    /// Virtual chain every request targets.
    pub virtual_chain_id: u32,
    /// Network the signing key belongs to.
    pub network_type: NetworkType,
}

impl ClientConfig {
    /// Settings for a specific node.
    #[must_use]
    pub fn new(
        endpoint: impl Into<String>,
        virtual_chain_id: u32,
        network_type: NetworkType,
    ) -> Self {
        Self {
            endpoint: endpoint.into(),
            virtual_chain_id,
            network_type,
        }
    }

    /// Full URL of an API path.
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.endpoint.trim_end_matches('/'))
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:8080".to_owned(),
            virtual_chain_id: 42,
            network_type: NetworkType::TestNet,
        }
    }
}
