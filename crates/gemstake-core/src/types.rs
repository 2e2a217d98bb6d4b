//! Core type definitions for Gemstake

use serde::{Deserialize, Serialize};
use serde_with::{serde_as, DisplayFromStr};
use std::fmt;
use std::str::FromStr;

pub use solana_pubkey::Pubkey;
pub use solana_signature::Signature;

use crate::errors::SessionError;

/// Transaction signature returned by a submitted chain call
#[serde_as]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TxSig(#[serde_as(as = "DisplayFromStr")] pub Signature);

impl TxSig {
    pub fn new(sig: Signature) -> Self {
        Self(sig)
    }

    pub fn signature(&self) -> &Signature {
        &self.0
    }
}

impl fmt::Display for TxSig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Signature> for TxSig {
    fn from(sig: Signature) -> Self {
        Self(sig)
    }
}

/// Solana cluster
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    Mainnet,
    Devnet,
}

impl Network {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Mainnet => "mainnet",
            Self::Devnet => "devnet",
        }
    }

    /// Public RPC endpoint for this cluster
    pub fn default_rpc_url(&self) -> &'static str {
        match self {
            Self::Mainnet => "https://api.mainnet-beta.solana.com",
            Self::Devnet => "https://api.devnet.solana.com",
        }
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Network {
    type Err = SessionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mainnet" | "mainnet-beta" => Ok(Self::Mainnet),
            "devnet" => Ok(Self::Devnet),
            other => Err(SessionError::Configuration(format!(
                "unknown network '{}'",
                other
            ))),
        }
    }
}

/// Parse a base58 account address, reporting which field was malformed
pub fn parse_pubkey(field: &str, value: &str) -> Result<Pubkey, SessionError> {
    value
        .trim()
        .parse::<Pubkey>()
        .map_err(|e| SessionError::Configuration(format!("invalid {} '{}': {}", field, value, e)))
}

/// Constants
pub mod constants {
    /// Reward tokens use a 9-decimal denomination
    pub const REWARD_DECIMALS: u32 = 9;

    /// 1 whole reward token in base units
    pub const REWARD_DENOMINATION: u64 = 1_000_000_000;

    /// Every deposit/withdraw moves a single NFT
    pub const GEM_AMOUNT: u64 = 1;

    /// Default bound on a confirmation wait (seconds)
    pub const DEFAULT_CONFIRM_TIMEOUT_SECS: u64 = 90;
}
