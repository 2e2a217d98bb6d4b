//! Account snapshots returned by the bank and farm clients

use std::fmt;

use gemstake_core::{ChainError, Pubkey};
use serde::{Deserialize, Serialize};
use serde_with::{serde_as, DisplayFromStr};

/// Reward configuration and accrual counters for one farm reward slot
#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FarmReward {
    #[serde_as(as = "DisplayFromStr")]
    pub reward_mint: Pubkey,
    pub total_funded: u64,
    pub total_refunded: u64,
    pub total_accrued_to_stakers: u64,
}

/// Snapshot of the remote farm configuration
#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FarmAccount {
    #[serde_as(as = "DisplayFromStr")]
    pub bank: Pubkey,
    pub farmer_count: u64,
    pub gems_staked: u64,
    pub reward_a: FarmReward,
    pub reward_b: FarmReward,
}

/// Accrued / paid-out pair for one reward slot of a farmer
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FarmerReward {
    pub accrued_reward: u64,
    pub paid_out_reward: u64,
}

/// The connected wallet's staking record within a farm
#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FarmerAccount {
    #[serde_as(as = "DisplayFromStr")]
    pub farm: Pubkey,
    /// Present iff the farmer account was initialized
    #[serde_as(as = "Option<DisplayFromStr>")]
    pub identity: Option<Pubkey>,
    #[serde_as(as = "DisplayFromStr")]
    pub vault: Pubkey,
    /// Raw `state` discriminant as stored on chain
    pub state: u8,
    pub gems_staked: u64,
    pub min_staking_ends_ts: u64,
    pub cooldown_ends_ts: u64,
    pub reward_a: FarmerReward,
    pub reward_b: FarmerReward,
}

/// Farmer staking state decoded from the account discriminant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FarmerStatus {
    Unstaked,
    Staked,
    PendingCooldown,
}

impl FarmerStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unstaked => "unstaked",
            Self::Staked => "staked",
            Self::PendingCooldown => "pendingCooldown",
        }
    }

    /// Whether an unstake call is meaningful in this state
    pub fn can_unstake(&self) -> bool {
        matches!(self, Self::Staked | Self::PendingCooldown)
    }
}

impl TryFrom<u8> for FarmerStatus {
    type Error = ChainError;

    fn try_from(discriminant: u8) -> Result<Self, Self::Error> {
        match discriminant {
            0 => Ok(Self::Unstaked),
            1 => Ok(Self::Staked),
            2 => Ok(Self::PendingCooldown),
            other => Err(ChainError::decode(format!(
                "unknown farmer state discriminant {}",
                other
            ))),
        }
    }
}

impl fmt::Display for FarmerStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Snapshot of the vault holding deposited NFTs
#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VaultAccount {
    #[serde_as(as = "DisplayFromStr")]
    pub bank: Pubkey,
    #[serde_as(as = "DisplayFromStr")]
    pub owner: Pubkey,
    pub locked: bool,
    pub gem_box_count: u64,
    pub gem_count: u64,
}

/// Gem deposit receipt (GDR): links a vault to one deposited mint
#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DepositRecord {
    #[serde_as(as = "DisplayFromStr")]
    pub address: Pubkey,
    #[serde_as(as = "DisplayFromStr")]
    pub vault: Pubkey,
    #[serde_as(as = "DisplayFromStr")]
    pub gem_mint: Pubkey,
    pub gem_count: u64,
}
