//! Gem Farm State Types
//!
//! Farmer snapshot states and the staking actions a session can offer.

use gemstake_chain::FarmerAccount;
use serde::{Deserialize, Serialize};

/// What is currently known about the wallet's farmer account
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "account", rename_all = "camelCase")]
pub enum FarmerSnapshot {
    /// Not fetched yet, or reset after a failed initialization
    #[default]
    NotLoaded,
    /// Fetch attempted and no initialized account exists
    Missing,
    Loaded(FarmerAccount),
}

impl FarmerSnapshot {
    /// Classify a fetched account; one without identity counts as missing
    pub fn from_fetched(account: FarmerAccount) -> Self {
        if account.identity.is_some() {
            Self::Loaded(account)
        } else {
            Self::Missing
        }
    }

    pub fn account(&self) -> Option<&FarmerAccount> {
        match self {
            Self::Loaded(account) => Some(account),
            _ => None,
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, Self::Missing)
    }

    pub fn is_loaded(&self) -> bool {
        matches!(self, Self::Loaded(_))
    }
}

/// A staking operation the UI can offer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum StakingAction {
    InitFarmer,
    Deposit,
    Withdraw,
    Stake,
    Unstake,
    Claim,
    RefreshRewards,
}

impl StakingAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InitFarmer => "initFarmer",
            Self::Deposit => "deposit",
            Self::Withdraw => "withdraw",
            Self::Stake => "stake",
            Self::Unstake => "unstake",
            Self::Claim => "claim",
            Self::RefreshRewards => "refreshRewards",
        }
    }
}
