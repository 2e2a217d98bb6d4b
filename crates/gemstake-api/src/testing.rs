//! In-memory chain used by the session and route tests

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use gemstake_chain::{
    find_farmer_pda, BankClient, ChainClients, ClientFactory, Connection, Creator, DepositRecord,
    FarmAccount, FarmClient, FarmReward, FarmerAccount, FarmerReward, InventoryResolver, Nft,
    NftMetadata, Result, VaultAccount,
};
use gemstake_core::{ChainError, Pubkey, Signature, TxSig};
use tokio::sync::Notify;

use crate::session::Collaborators;

/// Mutable ledger behind [`FakeChain`]
pub(crate) struct Ledger {
    pub wallet_owner: Pubkey,
    pub farm_id: Pubkey,
    /// Farm returned for `farm_id`; `None` makes the fetch fail
    pub farm: Option<FarmAccount>,
    pub other_farms: HashMap<Pubkey, FarmAccount>,
    pub farmer: Option<FarmerAccount>,
    pub vault_address: Pubkey,
    pub vault: VaultAccount,
    pub wallet: Vec<Nft>,
    pub deposited: Vec<Nft>,
    pub reject_deposits: HashSet<Pubkey>,
    pub fail_withdrawals: HashSet<Pubkey>,
    pub fail_confirmations: bool,
    calls: Vec<String>,
    farm_gates: HashMap<Pubkey, Arc<Notify>>,
    confirm_gate: Option<Arc<Notify>>,
    next_sig: u64,
}

impl Ledger {
    fn record(&mut self, call: String) {
        self.calls.push(call);
    }

    fn sig(&mut self) -> TxSig {
        self.next_sig += 1;
        let mut bytes = [0u8; 64];
        bytes[..8].copy_from_slice(&self.next_sig.to_le_bytes());
        TxSig::new(Signature::from(bytes))
    }

    fn farmer_mut(&mut self) -> Result<&mut FarmerAccount> {
        self.farmer.as_mut().ok_or_else(|| ChainError::AccountNotFound {
            address: "farmer".to_string(),
        })
    }

    fn sync_vault(&mut self) {
        self.vault.gem_count = self.deposited.len() as u64;
        self.vault.gem_box_count = self.deposited.len() as u64;
    }
}

/// Single fake standing in for the wallet provider, both program clients,
/// the connection and the inventory resolver
pub(crate) struct FakeChain {
    ledger: Mutex<Ledger>,
}

pub(crate) fn nft_with_creator(creator: Option<Pubkey>) -> Nft {
    Nft {
        mint: Pubkey::new_unique(),
        pubkey: Pubkey::new_unique(),
        metadata: NftMetadata {
            name: "Gem".to_string(),
            symbol: "GEM".to_string(),
            uri: String::new(),
            creators: creator
                .map(|address| {
                    vec![Creator {
                        address,
                        verified: true,
                        share: 100,
                    }]
                })
                .unwrap_or_default(),
        },
    }
}

fn farm_account() -> FarmAccount {
    let reward = || FarmReward {
        reward_mint: Pubkey::new_unique(),
        total_funded: 0,
        total_refunded: 0,
        total_accrued_to_stakers: 0,
    };
    FarmAccount {
        bank: Pubkey::new_unique(),
        farmer_count: 0,
        gems_staked: 0,
        reward_a: reward(),
        reward_b: reward(),
    }
}

impl FakeChain {
    fn build(with_farmer: bool) -> Arc<Self> {
        let wallet_owner = Pubkey::new_unique();
        let farm_id = Pubkey::new_unique();
        let vault_address = Pubkey::new_unique();
        let farm = farm_account();
        let vault = VaultAccount {
            bank: farm.bank,
            owner: wallet_owner,
            locked: false,
            gem_box_count: 0,
            gem_count: 0,
        };

        let mut ledger = Ledger {
            wallet_owner,
            farm_id,
            farm: Some(farm),
            other_farms: HashMap::new(),
            farmer: None,
            vault_address,
            vault,
            wallet: Vec::new(),
            deposited: Vec::new(),
            reject_deposits: HashSet::new(),
            fail_withdrawals: HashSet::new(),
            fail_confirmations: false,
            calls: Vec::new(),
            farm_gates: HashMap::new(),
            confirm_gate: None,
            next_sig: 0,
        };
        if with_farmer {
            ledger.farmer = Some(new_farmer(&ledger));
        }

        Arc::new(Self {
            ledger: Mutex::new(ledger),
        })
    }

    pub fn with_farmer() -> Arc<Self> {
        Self::build(true)
    }

    pub fn without_farmer() -> Arc<Self> {
        Self::build(false)
    }

    pub fn collaborators(self: &Arc<Self>) -> Collaborators {
        Collaborators {
            factory: Arc::new(FakeFactory(self.clone())),
            connection: self.clone(),
            inventory: self.clone(),
        }
    }

    pub fn update(&self, apply: impl FnOnce(&mut Ledger)) {
        apply(&mut self.ledger.lock().unwrap());
    }

    fn with<T>(&self, read: impl FnOnce(&mut Ledger) -> T) -> T {
        read(&mut self.ledger.lock().unwrap())
    }

    pub fn wallet(&self) -> Pubkey {
        self.with(|l| l.wallet_owner)
    }

    pub fn farm_id(&self) -> Pubkey {
        self.with(|l| l.farm_id)
    }

    pub fn calls(&self) -> Vec<String> {
        self.with(|l| l.calls.clone())
    }

    /// Register a second farm and return its address
    pub fn add_farm(&self) -> Pubkey {
        let address = Pubkey::new_unique();
        self.update(|l| {
            l.other_farms.insert(address, farm_account());
        });
        address
    }

    pub fn farm_account(&self, farm: &Pubkey) -> Option<FarmAccount> {
        self.with(|l| {
            if *farm == l.farm_id {
                l.farm.clone()
            } else {
                l.other_farms.get(farm).cloned()
            }
        })
    }

    /// Place `count` whitelisted NFTs in the wallet
    pub fn seed_wallet(&self, count: usize) -> Vec<Nft> {
        let nfts: Vec<Nft> = (0..count)
            .map(|_| nft_with_creator(Some(Pubkey::new_unique())))
            .collect();
        self.update(|l| l.wallet.extend(nfts.iter().cloned()));
        nfts
    }

    /// Place `count` NFTs in the vault
    pub fn seed_vault(&self, count: usize) -> Vec<Nft> {
        let nfts: Vec<Nft> = (0..count)
            .map(|_| nft_with_creator(Some(Pubkey::new_unique())))
            .collect();
        self.update(|l| {
            l.deposited.extend(nfts.iter().cloned());
            l.sync_vault();
        });
        nfts
    }

    /// Block the next fetch of `farm` until the returned notify fires
    pub fn hold_farm(&self, farm: Pubkey) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        self.update(|l| {
            l.farm_gates.insert(farm, gate.clone());
        });
        gate
    }

    /// Block the next confirmation until the returned notify fires
    pub fn hold_confirmations(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        self.update(|l| l.confirm_gate = Some(gate.clone()));
        gate
    }

    /// Yield until a call starting with `prefix` was recorded
    pub async fn wait_for_call(&self, prefix: &str) {
        while !self.calls().iter().any(|c| c.starts_with(prefix)) {
            tokio::task::yield_now().await;
        }
    }
}

fn new_farmer(ledger: &Ledger) -> FarmerAccount {
    FarmerAccount {
        farm: ledger.farm_id,
        identity: Some(ledger.wallet_owner),
        vault: ledger.vault_address,
        state: 0,
        gems_staked: 0,
        min_staking_ends_ts: 0,
        cooldown_ends_ts: 0,
        reward_a: FarmerReward::default(),
        reward_b: FarmerReward::default(),
    }
}

struct FakeFactory(Arc<FakeChain>);

#[async_trait]
impl ClientFactory for FakeFactory {
    async fn connect(&self, wallet: &Pubkey) -> Result<ChainClients> {
        self.0.update(|l| l.record(format!("connect {}", wallet)));
        Ok(ChainClients {
            bank: self.0.clone(),
            farm: self.0.clone(),
        })
    }
}

#[async_trait]
impl BankClient for FakeChain {
    async fn fetch_vault_acc(&self, vault: &Pubkey) -> Result<VaultAccount> {
        self.with(|l| {
            l.record(format!("fetch_vault {}", vault));
            if *vault == l.vault_address {
                Ok(l.vault.clone())
            } else {
                Err(ChainError::AccountNotFound {
                    address: vault.to_string(),
                })
            }
        })
    }

    async fn fetch_all_gdr_pdas(&self, vault: &Pubkey) -> Result<Vec<DepositRecord>> {
        self.with(|l| {
            Ok(l.deposited
                .iter()
                .map(|nft| DepositRecord {
                    address: Pubkey::new_unique(),
                    vault: *vault,
                    gem_mint: nft.mint,
                    gem_count: 1,
                })
                .collect())
        })
    }

    async fn deposit_gem_wallet(
        &self,
        _bank: &Pubkey,
        _vault: &Pubkey,
        _amount: u64,
        mint: &Pubkey,
        _source: &Pubkey,
        _creator: &Pubkey,
    ) -> Result<TxSig> {
        self.with(|l| {
            l.record(format!("deposit {}", mint));
            if l.reject_deposits.contains(mint) {
                return Err(ChainError::WhitelistRejection {
                    mint: mint.to_string(),
                });
            }
            let index = l
                .wallet
                .iter()
                .position(|n| &n.mint == mint)
                .ok_or_else(|| ChainError::rpc("token account not found"))?;
            let nft = l.wallet.remove(index);
            l.deposited.push(nft);
            l.sync_vault();
            Ok(l.sig())
        })
    }

    async fn withdraw_gem_wallet(
        &self,
        _bank: &Pubkey,
        _vault: &Pubkey,
        _amount: u64,
        mint: &Pubkey,
    ) -> Result<TxSig> {
        self.with(|l| {
            l.record(format!("withdraw {}", mint));
            if l.fail_withdrawals.contains(mint) {
                return Err(ChainError::rpc("custom program error: 0x1"));
            }
            let index = l
                .deposited
                .iter()
                .position(|n| &n.mint == mint)
                .ok_or_else(|| ChainError::rpc("deposit receipt not found"))?;
            let nft = l.deposited.remove(index);
            l.wallet.push(nft);
            l.sync_vault();
            Ok(l.sig())
        })
    }
}

#[async_trait]
impl FarmClient for FakeChain {
    async fn fetch_farm_acc(&self, farm: &Pubkey) -> Result<FarmAccount> {
        let gate = self.with(|l| {
            l.record(format!("fetch_farm {}", farm));
            l.farm_gates.remove(farm)
        });
        if let Some(gate) = gate {
            gate.notified().await;
        }
        self.farm_account(farm).ok_or_else(|| ChainError::AccountNotFound {
            address: farm.to_string(),
        })
    }

    async fn fetch_farmer_acc(&self, farmer: &Pubkey) -> Result<FarmerAccount> {
        self.with(|l| {
            l.record(format!("fetch_farmer {}", farmer));
            let known = std::iter::once(&l.farm_id)
                .chain(l.other_farms.keys())
                .any(|farm| find_farmer_pda(farm, &l.wallet_owner).0 == *farmer);
            match &l.farmer {
                Some(account) if known => Ok(account.clone()),
                _ => Err(ChainError::AccountNotFound {
                    address: farmer.to_string(),
                }),
            }
        })
    }

    async fn stake_wallet(&self, farm: &Pubkey) -> Result<TxSig> {
        self.with(|l| {
            l.record(format!("stake {}", farm));
            l.farmer_mut()?.state = 1;
            Ok(l.sig())
        })
    }

    async fn unstake_wallet(&self, farm: &Pubkey) -> Result<TxSig> {
        self.with(|l| {
            l.record(format!("unstake {}", farm));
            let farmer = l.farmer_mut()?;
            farmer.state = match farmer.state {
                1 => 2,
                _ => 0,
            };
            Ok(l.sig())
        })
    }

    async fn claim_wallet(
        &self,
        farm: &Pubkey,
        _reward_mint_a: &Pubkey,
        _reward_mint_b: &Pubkey,
    ) -> Result<TxSig> {
        self.with(|l| {
            l.record(format!("claim {}", farm));
            let farmer = l.farmer_mut()?;
            farmer.reward_a.paid_out_reward = farmer.reward_a.accrued_reward;
            farmer.reward_b.paid_out_reward = farmer.reward_b.accrued_reward;
            Ok(l.sig())
        })
    }

    async fn init_farmer_wallet(&self, farm: &Pubkey) -> Result<TxSig> {
        self.with(|l| {
            l.record(format!("init_farmer {}", farm));
            l.farmer = Some(new_farmer(l));
            Ok(l.sig())
        })
    }

    async fn refresh_farmer_wallet(&self, farm: &Pubkey, identity: &Pubkey) -> Result<TxSig> {
        self.with(|l| {
            l.record(format!("refresh_farmer {} {}", farm, identity));
            Ok(l.sig())
        })
    }
}

#[async_trait]
impl Connection for FakeChain {
    async fn confirm_transaction(&self, sig: &TxSig) -> Result<()> {
        let (gate, fail) = self.with(|l| {
            l.record(format!("confirm {}", sig));
            (l.confirm_gate.take(), l.fail_confirmations)
        });
        if let Some(gate) = gate {
            gate.notified().await;
        }
        if fail {
            return Err(ChainError::Timeout { secs: 90 });
        }
        Ok(())
    }
}

#[async_trait]
impl InventoryResolver for FakeChain {
    async fn wallet_nfts(&self, owner: &Pubkey) -> Result<Vec<Nft>> {
        self.with(|l| {
            if *owner == l.wallet_owner {
                Ok(l.wallet.clone())
            } else {
                Ok(Vec::new())
            }
        })
    }

    async fn resolve_metadata(&self, mints: &[Pubkey]) -> Result<Vec<Nft>> {
        self.with(|l| {
            Ok(mints
                .iter()
                .filter_map(|m| l.deposited.iter().find(|n| &n.mint == m).cloned())
                .collect())
        })
    }
}
