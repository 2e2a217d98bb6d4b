//! Collaborator contracts
//!
//! The session never talks to the programs directly. Every remote read or
//! write goes through one of these traits so that wallet-bound clients,
//! RPC connections and metadata resolvers can be swapped independently.

use std::sync::Arc;

use async_trait::async_trait;
use gemstake_core::{Pubkey, TxSig};

use crate::accounts::{DepositRecord, FarmAccount, FarmerAccount, FarmerStatus, VaultAccount};
use crate::nft::Nft;
use crate::Result;

/// Generic vault / deposit / withdraw operations of the gem bank program
#[async_trait]
pub trait BankClient: Send + Sync {
    async fn fetch_vault_acc(&self, vault: &Pubkey) -> Result<VaultAccount>;

    /// All deposit receipts held by `vault`
    async fn fetch_all_gdr_pdas(&self, vault: &Pubkey) -> Result<Vec<DepositRecord>>;

    async fn deposit_gem_wallet(
        &self,
        bank: &Pubkey,
        vault: &Pubkey,
        amount: u64,
        mint: &Pubkey,
        source: &Pubkey,
        creator: &Pubkey,
    ) -> Result<TxSig>;

    async fn withdraw_gem_wallet(
        &self,
        bank: &Pubkey,
        vault: &Pubkey,
        amount: u64,
        mint: &Pubkey,
    ) -> Result<TxSig>;
}

/// Staking operations of the gem farm program
#[async_trait]
pub trait FarmClient: Send + Sync {
    async fn fetch_farm_acc(&self, farm: &Pubkey) -> Result<FarmAccount>;

    async fn fetch_farmer_acc(&self, farmer: &Pubkey) -> Result<FarmerAccount>;

    /// Decode the farmer's staking state from its discriminant
    fn parse_farmer_state(&self, farmer: &FarmerAccount) -> Result<FarmerStatus> {
        FarmerStatus::try_from(farmer.state)
    }

    async fn stake_wallet(&self, farm: &Pubkey) -> Result<TxSig>;

    async fn unstake_wallet(&self, farm: &Pubkey) -> Result<TxSig>;

    async fn claim_wallet(
        &self,
        farm: &Pubkey,
        reward_mint_a: &Pubkey,
        reward_mint_b: &Pubkey,
    ) -> Result<TxSig>;

    async fn init_farmer_wallet(&self, farm: &Pubkey) -> Result<TxSig>;

    async fn refresh_farmer_wallet(&self, farm: &Pubkey, identity: &Pubkey) -> Result<TxSig>;
}

/// Ledger connection used to await transaction finality
#[async_trait]
pub trait Connection: Send + Sync {
    async fn confirm_transaction(&self, sig: &TxSig) -> Result<()>;
}

/// Resolves NFT holdings and metadata
#[async_trait]
pub trait InventoryResolver: Send + Sync {
    /// NFTs currently held by `owner`
    async fn wallet_nfts(&self, owner: &Pubkey) -> Result<Vec<Nft>>;

    /// Metadata-enriched records for the given mints. Mints that cannot be
    /// resolved are left out of the result.
    async fn resolve_metadata(&self, mints: &[Pubkey]) -> Result<Vec<Nft>>;
}

/// Bank and farm clients bound to one wallet signer
#[derive(Clone)]
pub struct ChainClients {
    pub bank: Arc<dyn BankClient>,
    pub farm: Arc<dyn FarmClient>,
}

/// Builds wallet-bound chain clients (stands in for the wallet provider)
#[async_trait]
pub trait ClientFactory: Send + Sync {
    async fn connect(&self, wallet: &Pubkey) -> Result<ChainClients>;
}
