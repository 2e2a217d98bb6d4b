//! Data Transfer Objects for API requests and responses

use gemfarm::{format_reward, BatchOutcome, FarmerSnapshot, ItemOutcome, StakingAction};
use gemstake_chain::{FarmAccount, FarmerStatus, Nft, VaultAccount};
use gemstake_core::Error;
use serde::{Deserialize, Serialize};

use crate::session::SessionState;

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

impl Default for HealthResponse {
    fn default() -> Self {
        Self {
            status: "ok".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

/// Open (or re-target) the staking session
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpenSessionRequest {
    /// Wallet public key, base58
    pub wallet: String,
    /// Farm to stake in; falls back to the configured farm
    #[serde(default)]
    pub farm_id: Option<String>,
}

/// Toggle one NFT in a selection set
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToggleRequest {
    pub mint: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToggleResponse {
    pub selected: bool,
    pub snapshot: StakingSnapshot,
}

/// Full staking state as the UI consumes it
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StakingSnapshot {
    pub wallet: String,
    pub farm_id: String,
    pub initialized: bool,
    pub farm: Option<FarmAccount>,
    pub farmer: FarmerSnapshot,
    pub farmer_status: Option<FarmerStatus>,
    pub vault: Option<VaultAccount>,
    pub is_locked: Option<bool>,
    /// Claimable reward A in base units
    pub available_a: Option<String>,
    pub available_b: Option<String>,
    /// Claimable reward A scaled by the reward denomination
    pub available_a_display: Option<String>,
    pub available_b_display: Option<String>,
    pub wallet_nfts: Vec<Nft>,
    pub vault_nfts: Option<Vec<Nft>>,
    pub selected_wallet_items: Vec<String>,
    pub selected_vault_items: Vec<String>,
    pub feedback_status: String,
    pub whitelist_warning: String,
    pub last_error: Option<String>,
    pub available_actions: Vec<StakingAction>,
}

impl StakingSnapshot {
    pub fn new(wallet: String, farm_id: String, state: SessionState) -> Self {
        let available_a = state.available_a();
        let available_b = state.available_b();
        let display = |amount: Option<u64>| amount.map(|a| format_reward(a, 2));

        Self {
            wallet,
            farm_id,
            initialized: state.is_initialized(),
            is_locked: state.is_locked(),
            available_actions: state.available_actions(),
            available_a: available_a.map(|a| a.to_string()),
            available_b: available_b.map(|b| b.to_string()),
            available_a_display: display(available_a),
            available_b_display: display(available_b),
            selected_wallet_items: state
                .selected_wallet
                .mints()
                .iter()
                .map(|m| m.to_string())
                .collect(),
            selected_vault_items: state
                .selected_vault
                .mints()
                .iter()
                .map(|m| m.to_string())
                .collect(),
            farm: state.farm,
            farmer: state.farmer,
            farmer_status: state.farmer_status,
            vault: state.vault,
            wallet_nfts: state.wallet_nfts,
            vault_nfts: state.vault_nfts,
            feedback_status: state.feedback_status,
            whitelist_warning: state.whitelist_warning,
            last_error: state.last_error,
        }
    }
}

/// Result of a single-transaction action
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TxResponse {
    pub tx_sig: String,
    pub snapshot: StakingSnapshot,
}

/// One item of a deposit or withdraw batch
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferItemDto {
    pub mint: String,
    pub tx_sig: Option<String>,
    pub error: Option<String>,
}

/// Result of a deposit or withdraw batch
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferResponse {
    pub items: Vec<TransferItemDto>,
    pub confirmed: usize,
    pub failed: usize,
    pub snapshot: StakingSnapshot,
}

impl TransferResponse {
    pub fn new(outcome: BatchOutcome, snapshot: StakingSnapshot) -> Self {
        let confirmed = outcome.confirmed_count();
        let failed = outcome.failed_count();
        let items = outcome
            .results
            .into_iter()
            .map(|(mint, result)| match result {
                ItemOutcome::Confirmed(sig) => TransferItemDto {
                    mint: mint.to_string(),
                    tx_sig: Some(sig.to_string()),
                    error: None,
                },
                ItemOutcome::Failed(e) => TransferItemDto {
                    mint: mint.to_string(),
                    tx_sig: None,
                    error: Some(e.to_string()),
                },
            })
            .collect();

        Self {
            items,
            confirmed,
            failed,
            snapshot,
        }
    }
}

/// Result of a reward refresh
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshResponse {
    /// False when the refresh was skipped
    pub refreshed: bool,
    pub snapshot: StakingSnapshot,
}

/// Generic API error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    pub code: String,
    pub message: String,
}

impl ApiError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new("not_found", message)
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new("bad_request", message)
    }
}

impl From<&Error> for ApiError {
    fn from(e: &Error) -> Self {
        Self::new(e.error_code(), e.to_string())
    }
}
