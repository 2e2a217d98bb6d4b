//! Configuration types for Gemstake

use serde::{Deserialize, Serialize};

use crate::constants::DEFAULT_CONFIRM_TIMEOUT_SECS;
use crate::errors::SessionError;
use crate::Network;

/// Environment variable holding the default farm id
pub const ENV_FARM_ID: &str = "GEM_FARM_ID";
/// Environment variable overriding the RPC endpoint
pub const ENV_RPC_URL: &str = "SOLANA_RPC_URL";
/// Environment variable selecting the cluster
pub const ENV_NETWORK: &str = "GEMSTAKE_NETWORK";
/// Environment variable overriding the API port
pub const ENV_API_PORT: &str = "GEMSTAKE_API_PORT";

/// RPC connection configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RpcConfig {
    /// RPC URL (e.g., "https://api.devnet.solana.com")
    pub url: String,

    /// Upper bound on a transaction confirmation wait
    #[serde(default = "default_confirm_timeout_secs")]
    pub confirm_timeout_secs: u64,
}

fn default_confirm_timeout_secs() -> u64 {
    DEFAULT_CONFIRM_TIMEOUT_SECS
}

impl RpcConfig {
    pub fn for_network(network: Network) -> Self {
        Self {
            url: network.default_rpc_url().to_string(),
            confirm_timeout_secs: default_confirm_timeout_secs(),
        }
    }
}

impl Default for RpcConfig {
    fn default() -> Self {
        Self::for_network(Network::Devnet)
    }
}

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppConfig {
    /// RPC connection settings
    pub rpc: RpcConfig,

    /// Cluster the farm lives on
    pub network: Network,

    /// Default farm id; a session may override it
    #[serde(default)]
    pub farm_id: String,

    /// API server port
    #[serde(default = "default_api_port")]
    pub api_port: u16,
}

fn default_api_port() -> u16 {
    19054
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            rpc: RpcConfig::default(),
            network: Network::Devnet,
            farm_id: String::new(),
            api_port: default_api_port(),
        }
    }
}

impl AppConfig {
    /// Build configuration from the process environment
    pub fn from_env() -> Result<Self, SessionError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    ///
    /// Unset keys keep their defaults. The RPC URL follows the network unless
    /// set explicitly.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, SessionError> {
        let mut config = Self::default();

        if let Some(network) = lookup(ENV_NETWORK) {
            config.network = network.parse()?;
            config.rpc = RpcConfig::for_network(config.network);
        }

        if let Some(url) = lookup(ENV_RPC_URL).filter(|u| !u.trim().is_empty()) {
            config.rpc.url = url;
        }

        if let Some(farm_id) = lookup(ENV_FARM_ID) {
            config.farm_id = farm_id.trim().to_string();
        }

        if let Some(port) = lookup(ENV_API_PORT) {
            config.api_port = port.trim().parse().map_err(|_| {
                SessionError::Configuration(format!("invalid {}: '{}'", ENV_API_PORT, port))
            })?;
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.rpc.url, "https://api.devnet.solana.com");
        assert_eq!(config.rpc.confirm_timeout_secs, 90);
        assert_eq!(config.network, Network::Devnet);
        assert!(config.farm_id.is_empty());
        assert_eq!(config.api_port, 19054);
    }

    #[test]
    fn test_config_serialization() {
        let config = AppConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        let parsed: AppConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.rpc.url, config.rpc.url);
        assert!(json.contains("farmId"));
    }

    #[test]
    fn test_from_lookup() {
        let env: HashMap<&str, &str> = HashMap::from([
            (ENV_NETWORK, "mainnet"),
            (ENV_FARM_ID, " 11111111111111111111111111111111 "),
            (ENV_API_PORT, "8080"),
        ]);
        let config = AppConfig::from_lookup(|k| env.get(k).map(|v| v.to_string())).unwrap();

        assert_eq!(config.network, Network::Mainnet);
        assert_eq!(config.rpc.url, "https://api.mainnet-beta.solana.com");
        assert_eq!(config.farm_id, "11111111111111111111111111111111");
        assert_eq!(config.api_port, 8080);
    }

    #[test]
    fn test_from_lookup_rpc_override_and_bad_port() {
        let env: HashMap<&str, &str> =
            HashMap::from([(ENV_RPC_URL, "http://localhost:8899"), (ENV_API_PORT, "http")]);
        let err = AppConfig::from_lookup(|k| env.get(k).map(|v| v.to_string())).unwrap_err();
        assert!(matches!(err, SessionError::Configuration(_)));

        let env: HashMap<&str, &str> = HashMap::from([(ENV_RPC_URL, "http://localhost:8899")]);
        let config = AppConfig::from_lookup(|k| env.get(k).map(|v| v.to_string())).unwrap();
        assert_eq!(config.rpc.url, "http://localhost:8899");
    }
}
