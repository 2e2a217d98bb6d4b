//! Staking session
//!
//! One session binds a wallet to a farm. It owns the UI-facing staking state,
//! rebuilds it from the bank and farm clients, and runs the mutating actions.
//!
//! Every initialization cycle takes a new generation number. State writes
//! carry the generation they were started under and are dropped once a newer
//! cycle has begun, so a slow response from an earlier farm or wallet can
//! never overwrite the current snapshot.

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use gemfarm::calculator::available_for;
use gemfarm::constants::{
    FEEDBACK_CLAIMING, FEEDBACK_DEPOSITING, FEEDBACK_FETCHING_FARMER, FEEDBACK_INITIALIZING,
    FEEDBACK_REFRESHING, FEEDBACK_STAKING, FEEDBACK_UNSTAKING, FEEDBACK_WITHDRAWING,
    WHITELIST_WARNING,
};
use gemfarm::{
    resolve_vault_nfts, run_batch, BatchOutcome, BatchPolicy, FarmerSnapshot, Selection,
    StakingAction,
};
use gemstake_chain::{
    find_farmer_pda, ChainClients, ClientFactory, Connection, FarmAccount, FarmerStatus,
    InventoryResolver, Nft, VaultAccount,
};
use gemstake_core::constants::GEM_AMOUNT;
use gemstake_core::{parse_pubkey, ChainError, Error, Pubkey, Result, SessionError, TxSig};
use tokio::sync::{Mutex, MutexGuard, RwLock};

/// External collaborators a session is wired to
#[derive(Clone)]
pub struct Collaborators {
    pub factory: Arc<dyn ClientFactory>,
    pub connection: Arc<dyn Connection>,
    pub inventory: Arc<dyn InventoryResolver>,
}

/// Farm address and the wallet-bound clients of an initialized session
#[derive(Clone)]
struct SessionContext {
    farm: Pubkey,
    clients: ChainClients,
}

/// Context captured when an action starts
struct ActionContext {
    farm: Pubkey,
    clients: ChainClients,
    generation: u64,
}

/// UI-facing staking state
#[derive(Clone, Default)]
pub struct SessionState {
    pub farm: Option<FarmAccount>,
    pub farmer: FarmerSnapshot,
    pub farmer_status: Option<FarmerStatus>,
    pub vault: Option<VaultAccount>,
    pub wallet_nfts: Vec<Nft>,
    /// `None` until the vault has been resolved once
    pub vault_nfts: Option<Vec<Nft>>,
    pub selected_wallet: Selection,
    pub selected_vault: Selection,
    pub feedback_status: String,
    pub whitelist_warning: String,
    pub last_error: Option<String>,
    context: Option<SessionContext>,
}

impl SessionState {
    pub fn is_initialized(&self) -> bool {
        self.context.is_some()
    }

    pub fn is_locked(&self) -> Option<bool> {
        self.vault.as_ref().map(|v| v.locked)
    }

    /// Whether the vault currently holds any NFT
    pub fn vault_has_gems(&self) -> bool {
        self.vault.as_ref().is_some_and(|v| v.gem_count > 0)
    }

    /// Claimable reward A in base units
    pub fn available_a(&self) -> Option<u64> {
        self.farmer.account().and_then(|f| available_for(&f.reward_a))
    }

    /// Claimable reward B in base units
    pub fn available_b(&self) -> Option<u64> {
        self.farmer.account().and_then(|f| available_for(&f.reward_b))
    }

    /// Actions the UI should offer for this state
    pub fn available_actions(&self) -> Vec<StakingAction> {
        match &self.farmer {
            FarmerSnapshot::NotLoaded => Vec::new(),
            FarmerSnapshot::Missing => vec![StakingAction::InitFarmer],
            FarmerSnapshot::Loaded(_) => {
                let mut actions = vec![StakingAction::RefreshRewards];
                let unlocked = self.is_locked() == Some(false);

                if unlocked && !self.selected_wallet.is_empty() {
                    actions.push(StakingAction::Deposit);
                }
                if unlocked && !self.selected_vault.is_empty() {
                    actions.push(StakingAction::Withdraw);
                }
                match self.farmer_status {
                    Some(FarmerStatus::Unstaked) if self.vault_has_gems() => {
                        actions.push(StakingAction::Stake)
                    }
                    Some(status) if status.can_unstake() => actions.push(StakingAction::Unstake),
                    _ => {}
                }
                if self.available_a().is_some_and(|a| a > 0) {
                    actions.push(StakingAction::Claim);
                }

                actions.sort();
                actions
            }
        }
    }
}

/// Staking session of one wallet
pub struct StakingSession {
    wallet: Pubkey,
    farm_id: RwLock<String>,
    collaborators: Collaborators,
    state: RwLock<SessionState>,
    generation: AtomicU64,
    action_gate: Mutex<()>,
}

impl StakingSession {
    /// Create an idle session. Nothing is fetched until [`Self::initialize`].
    pub fn new(wallet: Pubkey, farm_id: impl Into<String>, collaborators: Collaborators) -> Self {
        Self {
            wallet,
            farm_id: RwLock::new(farm_id.into()),
            collaborators,
            state: RwLock::new(SessionState::default()),
            generation: AtomicU64::new(0),
            action_gate: Mutex::new(()),
        }
    }

    pub fn wallet(&self) -> &Pubkey {
        &self.wallet
    }

    pub async fn farm_id(&self) -> String {
        self.farm_id.read().await.clone()
    }

    /// Copy of the current state
    pub async fn snapshot(&self) -> SessionState {
        self.state.read().await.clone()
    }

    // ─── Initialization ─────────────────────────────────────────────────────

    /// Switch to another farm and rebuild the session for it
    pub async fn change_farm(&self, farm_id: impl Into<String>) -> Result<()> {
        *self.farm_id.write().await = farm_id.into();
        self.initialize().await
    }

    /// Run a full initialization cycle.
    ///
    /// All state is reset first. On failure the farm and farmer stay unloaded
    /// and the error is both logged and returned.
    pub async fn initialize(&self) -> Result<()> {
        let generation = {
            let mut state = self.state.write().await;
            *state = SessionState::default();
            self.generation.fetch_add(1, Ordering::SeqCst) + 1
        };

        let farm_id = self.farm_id().await;
        match self.load(generation, &farm_id).await {
            Ok(()) => Ok(()),
            Err(e) => {
                tracing::error!(
                    wallet = %self.wallet,
                    farm = %farm_id,
                    error = %e,
                    "Staking session initialization failed"
                );
                let message = e.to_string();
                self.commit(generation, |s| {
                    s.farm = None;
                    s.farmer = FarmerSnapshot::NotLoaded;
                    s.farmer_status = None;
                    s.vault = None;
                    s.feedback_status.clear();
                    s.last_error = Some(message);
                    s.context = None;
                })
                .await;
                Err(e)
            }
        }
    }

    async fn load(&self, generation: u64, farm_id: &str) -> Result<()> {
        if farm_id.trim().is_empty() {
            return Err(SessionError::Configuration("No farm ID has been configured.".into()).into());
        }
        let farm = parse_pubkey("farm id", farm_id)?;

        let clients = self.collaborators.factory.connect(&self.wallet).await?;
        let farm_acc = clients.farm.fetch_farm_acc(&farm).await?;

        tracing::info!(wallet = %self.wallet, farm = %farm, "Farm loaded");

        let context = SessionContext {
            farm,
            clients: clients.clone(),
        };
        let current = self
            .commit(generation, |s| {
                s.farm = Some(farm_acc);
                s.context = Some(context);
                s.feedback_status = FEEDBACK_FETCHING_FARMER.to_string();
            })
            .await;
        if !current {
            return Ok(());
        }

        let ctx = ActionContext {
            farm,
            clients,
            generation,
        };
        self.refresh_farmer(&ctx).await?;
        self.load_wallet_nfts(generation).await;
        Ok(())
    }

    // ─── Refresh ────────────────────────────────────────────────────────────

    /// Re-read the farmer, its vault and status, then the vault NFTs.
    ///
    /// A farmer that cannot be fetched, or has no identity, becomes
    /// [`FarmerSnapshot::Missing`]. Vault or status failures leave the previous
    /// snapshot in place and are returned.
    async fn refresh_farmer(&self, ctx: &ActionContext) -> Result<()> {
        let (farmer_pda, _) = find_farmer_pda(&ctx.farm, &self.wallet);

        let fetched = match ctx.clients.farm.fetch_farmer_acc(&farmer_pda).await {
            Ok(account) => FarmerSnapshot::from_fetched(account),
            Err(e) => {
                tracing::debug!(farmer = %farmer_pda, error = %e, "Farmer account not available");
                FarmerSnapshot::Missing
            }
        };

        let farmer = match fetched {
            FarmerSnapshot::Loaded(farmer) => farmer,
            _ => {
                self.commit(ctx.generation, |s| {
                    s.farmer = FarmerSnapshot::Missing;
                    s.farmer_status = None;
                    s.vault = None;
                    s.vault_nfts = None;
                    s.selected_vault.clear();
                    s.feedback_status.clear();
                })
                .await;
                return Ok(());
            }
        };

        let vault = ctx.clients.bank.fetch_vault_acc(&farmer.vault).await?;
        let status = ctx.clients.farm.parse_farmer_state(&farmer)?;
        let vault_address = farmer.vault;

        tracing::debug!(
            farmer = %farmer_pda,
            status = %status,
            gems = vault.gem_count,
            locked = vault.locked,
            "Farmer refreshed"
        );

        let current = self
            .commit(ctx.generation, |s| {
                s.farmer = FarmerSnapshot::Loaded(farmer);
                s.farmer_status = Some(status);
                s.vault = Some(vault);
                s.feedback_status.clear();
            })
            .await;

        if current {
            self.load_vault_nfts(ctx, &vault_address).await;
        }
        Ok(())
    }

    async fn load_vault_nfts(&self, ctx: &ActionContext, vault: &Pubkey) {
        let resolved = resolve_vault_nfts(
            ctx.clients.bank.as_ref(),
            self.collaborators.inventory.as_ref(),
            vault,
        )
        .await;

        match resolved {
            Ok(nfts) => {
                self.commit(ctx.generation, |s| {
                    s.selected_vault.retain_present(&nfts);
                    s.vault_nfts = Some(nfts);
                })
                .await;
            }
            Err(e) => {
                tracing::warn!(vault = %vault, error = %e, "Keeping previous vault NFTs");
            }
        }
    }

    async fn load_wallet_nfts(&self, generation: u64) {
        match self.collaborators.inventory.wallet_nfts(&self.wallet).await {
            Ok(nfts) => {
                self.commit(generation, |s| {
                    s.selected_wallet.retain_present(&nfts);
                    s.wallet_nfts = nfts;
                })
                .await;
            }
            Err(e) => {
                tracing::warn!(wallet = %self.wallet, error = %e, "Failed to load wallet NFTs");
            }
        }
    }

    /// Apply `apply` to the state if `generation` is still current
    async fn commit(&self, generation: u64, apply: impl FnOnce(&mut SessionState)) -> bool {
        let mut state = self.state.write().await;
        if self.generation.load(Ordering::SeqCst) != generation {
            tracing::debug!(generation, "Discarding stale session update");
            return false;
        }
        apply(&mut state);
        true
    }

    // ─── Selection ──────────────────────────────────────────────────────────

    /// Toggle a wallet NFT in or out of the deposit selection
    pub async fn toggle_wallet_item(&self, mint: &Pubkey) -> Result<bool> {
        let mut guard = self.state.write().await;
        let state = &mut *guard;
        Ok(state.selected_wallet.toggle_in(mint, &state.wallet_nfts)?)
    }

    /// Toggle a vault NFT in or out of the withdraw selection
    pub async fn toggle_vault_item(&self, mint: &Pubkey) -> Result<bool> {
        let mut guard = self.state.write().await;
        let state = &mut *guard;
        let available = state.vault_nfts.as_deref().unwrap_or_default();
        Ok(state.selected_vault.toggle_in(mint, available)?)
    }

    // ─── Actions ────────────────────────────────────────────────────────────

    /// Deposit every selected wallet NFT into the vault.
    ///
    /// A failed item is recorded and the batch moves on; the whitelist warning
    /// is raised for it.
    pub async fn deposit_selected(&self) -> Result<BatchOutcome> {
        let _gate = self.enter()?;
        let ctx = self.action_context().await?;

        let (items, bank, vault) = {
            let state = self.state.read().await;
            if state.selected_wallet.is_empty() {
                return Err(SessionError::not_allowed("no wallet NFTs selected").into());
            }
            let (bank, vault) = transfer_accounts(&state)?;
            (state.selected_wallet.items().cloned().collect::<Vec<_>>(), bank, vault)
        };

        self.settle(&ctx, FEEDBACK_DEPOSITING, async {
            self.commit(ctx.generation, |s| s.whitelist_warning.clear())
                .await;

            let ctx = &ctx;
            let outcome = run_batch(items, BatchPolicy::CONTINUE, |nft| async move {
                let result = self.deposit_one(ctx, &bank, &vault, &nft).await;
                if result.is_err() {
                    self.commit(ctx.generation, |s| {
                        s.whitelist_warning = WHITELIST_WARNING.to_string()
                    })
                    .await;
                }
                result
            })
            .await;

            tracing::info!(
                confirmed = outcome.confirmed_count(),
                failed = outcome.failed_count(),
                "Deposit batch finished"
            );

            self.complete_transfer(ctx).await?;
            Ok(outcome)
        })
        .await
    }

    async fn deposit_one(
        &self,
        ctx: &ActionContext,
        bank: &Pubkey,
        vault: &Pubkey,
        nft: &Nft,
    ) -> std::result::Result<TxSig, ChainError> {
        let creator = nft.first_creator().ok_or_else(|| ChainError::WhitelistRejection {
            mint: nft.mint.to_string(),
        })?;

        let sig = ctx
            .clients
            .bank
            .deposit_gem_wallet(bank, vault, GEM_AMOUNT, &nft.mint, &nft.pubkey, &creator)
            .await?;
        self.collaborators.connection.confirm_transaction(&sig).await?;
        tracing::info!(mint = %nft.mint, tx = %sig, "Deposit confirmed");
        Ok(sig)
    }

    /// Withdraw every selected vault NFT back to the wallet.
    ///
    /// The first failed item aborts the batch and later items are not
    /// submitted. If earlier items already went through, the farmer and both
    /// NFT lists are re-read so those items drop out of the selection; the
    /// remaining selection is kept.
    pub async fn withdraw_selected(&self) -> Result<BatchOutcome> {
        let _gate = self.enter()?;
        let ctx = self.action_context().await?;

        let (items, bank, vault) = {
            let state = self.state.read().await;
            if state.selected_vault.is_empty() {
                return Err(SessionError::not_allowed("no vault NFTs selected").into());
            }
            let (bank, vault) = transfer_accounts(&state)?;
            (state.selected_vault.items().cloned().collect::<Vec<_>>(), bank, vault)
        };

        self.settle(&ctx, FEEDBACK_WITHDRAWING, async {
            let ctx = &ctx;
            let outcome = run_batch(items, BatchPolicy::ABORT, |nft| async move {
                let sig = ctx
                    .clients
                    .bank
                    .withdraw_gem_wallet(&bank, &vault, GEM_AMOUNT, &nft.mint)
                    .await?;
                self.collaborators.connection.confirm_transaction(&sig).await?;
                tracing::info!(mint = %nft.mint, tx = %sig, "Withdrawal confirmed");
                Ok(sig)
            })
            .await;

            if outcome.aborted {
                let error = outcome
                    .first_error()
                    .cloned()
                    .unwrap_or_else(|| ChainError::rpc("withdrawal aborted"));

                if outcome.confirmed_count() > 0 {
                    if let Err(e) = self.refresh_farmer(ctx).await {
                        tracing::warn!(error = %e, "Refresh after partial withdrawal failed");
                    }
                    self.load_wallet_nfts(ctx.generation).await;
                }
                return Err(error.into());
            }

            self.complete_transfer(ctx).await?;
            Ok(outcome)
        })
        .await
    }

    /// Stake the vault in the farm
    pub async fn stake(&self) -> Result<TxSig> {
        let _gate = self.enter()?;
        let ctx = self.action_context().await?;
        {
            let state = self.state.read().await;
            if !state.farmer.is_loaded() {
                return Err(SessionError::not_allowed("farmer account is not initialized").into());
            }
            if state.farmer_status != Some(FarmerStatus::Unstaked) {
                return Err(SessionError::not_allowed("farmer is already staked").into());
            }
            if !state.vault_has_gems() {
                return Err(SessionError::not_allowed("vault holds no NFTs").into());
            }
        }

        self.settle(&ctx, FEEDBACK_STAKING, async {
            let sig = ctx.clients.farm.stake_wallet(&ctx.farm).await?;
            self.confirm_and_refresh(&ctx, &sig).await?;
            Ok(sig)
        })
        .await
    }

    /// Unstake, or end the cooldown when one is pending
    pub async fn unstake(&self) -> Result<TxSig> {
        let _gate = self.enter()?;
        let ctx = self.action_context().await?;
        let status = self.state.read().await.farmer_status;
        if !status.is_some_and(|s| s.can_unstake()) {
            return Err(SessionError::not_allowed("farmer is not staked").into());
        }

        self.settle(&ctx, FEEDBACK_UNSTAKING, async {
            let sig = ctx.clients.farm.unstake_wallet(&ctx.farm).await?;
            self.confirm_and_refresh(&ctx, &sig).await?;
            Ok(sig)
        })
        .await
    }

    /// Claim both reward slots
    pub async fn claim(&self) -> Result<TxSig> {
        let _gate = self.enter()?;
        let ctx = self.action_context().await?;

        let (mint_a, mint_b) = {
            let state = self.state.read().await;
            match state.available_a() {
                Some(a) if a > 0 => {}
                Some(_) => return Err(SessionError::not_allowed("no reward to claim").into()),
                None => {
                    return Err(SessionError::not_allowed(
                        "paid-out reward exceeds accrued reward",
                    )
                    .into())
                }
            }
            let farm = state.farm.as_ref().ok_or(SessionError::NotInitialized)?;
            (farm.reward_a.reward_mint, farm.reward_b.reward_mint)
        };

        self.settle(&ctx, FEEDBACK_CLAIMING, async {
            let sig = ctx
                .clients
                .farm
                .claim_wallet(&ctx.farm, &mint_a, &mint_b)
                .await?;
            self.confirm_and_refresh(&ctx, &sig).await?;
            Ok(sig)
        })
        .await
    }

    /// Create the farmer account for this wallet
    pub async fn init_farmer(&self) -> Result<TxSig> {
        let _gate = self.enter()?;
        let ctx = self.action_context().await?;
        if !self.state.read().await.farmer.is_missing() {
            return Err(SessionError::not_allowed("farmer account already exists").into());
        }

        self.settle(&ctx, FEEDBACK_INITIALIZING, async {
            let sig = ctx.clients.farm.init_farmer_wallet(&ctx.farm).await?;
            self.confirm_and_refresh(&ctx, &sig).await?;
            tracing::info!(wallet = %self.wallet, farm = %ctx.farm, "Farmer initialized");
            Ok(sig)
        })
        .await
    }

    /// Recompute accrued rewards on chain.
    ///
    /// Returns `Ok(false)` without doing anything when the session is not
    /// initialized or the farmer has no identity yet.
    pub async fn refresh_rewards(&self) -> Result<bool> {
        let _gate = self.enter()?;
        let ctx = match self.action_context().await {
            Ok(ctx) => ctx,
            Err(_) => return Ok(false),
        };
        let identity = {
            let state = self.state.read().await;
            match state.farmer.account().and_then(|f| f.identity) {
                Some(identity) => identity,
                None => return Ok(false),
            }
        };

        self.settle(&ctx, FEEDBACK_REFRESHING, async {
            let sig = ctx
                .clients
                .farm
                .refresh_farmer_wallet(&ctx.farm, &identity)
                .await?;
            self.confirm_and_refresh(&ctx, &sig).await?;
            Ok(true)
        })
        .await
    }

    // ─── Action plumbing ────────────────────────────────────────────────────

    fn enter(&self) -> Result<MutexGuard<'_, ()>> {
        self.action_gate
            .try_lock()
            .map_err(|_| Error::from(SessionError::ActionInProgress))
    }

    async fn action_context(&self) -> Result<ActionContext> {
        let state = self.state.read().await;
        let context = state.context.as_ref().ok_or(SessionError::NotInitialized)?;
        Ok(ActionContext {
            farm: context.farm,
            clients: context.clients.clone(),
            generation: self.generation.load(Ordering::SeqCst),
        })
    }

    /// Show `feedback` while `action` runs; clear it once the action settles
    async fn settle<T>(
        &self,
        ctx: &ActionContext,
        feedback: &str,
        action: impl Future<Output = Result<T>>,
    ) -> Result<T> {
        self.commit(ctx.generation, |s| {
            s.feedback_status = feedback.to_string();
            s.last_error = None;
        })
        .await;

        let result = action.await;

        let error = result.as_ref().err().map(|e| e.to_string());
        if let Some(message) = &error {
            tracing::warn!(action = feedback, error = %message, "Staking action failed");
        }
        self.commit(ctx.generation, |s| {
            s.feedback_status.clear();
            if error.is_some() {
                s.last_error = error;
            }
        })
        .await;

        result
    }

    async fn confirm_and_refresh(&self, ctx: &ActionContext, sig: &TxSig) -> Result<()> {
        self.collaborators.connection.confirm_transaction(sig).await?;
        tracing::info!(tx = %sig, "Transaction confirmed");
        self.refresh_farmer(ctx).await
    }

    async fn complete_transfer(&self, ctx: &ActionContext) -> Result<()> {
        self.refresh_farmer(ctx).await?;
        self.load_wallet_nfts(ctx.generation).await;
        self.commit(ctx.generation, |s| {
            s.selected_wallet.clear();
            s.selected_vault.clear();
        })
        .await;
        Ok(())
    }
}

/// Bank and vault addresses for a transfer, provided the vault is unlocked
fn transfer_accounts(state: &SessionState) -> Result<(Pubkey, Pubkey)> {
    let farm = state.farm.as_ref().ok_or(SessionError::NotInitialized)?;
    let farmer = state
        .farmer
        .account()
        .ok_or_else(|| SessionError::not_allowed("farmer account is not initialized"))?;
    match state.is_locked() {
        Some(false) => Ok((farm.bank, farmer.vault)),
        Some(true) => Err(SessionError::not_allowed("vault is locked").into()),
        None => Err(SessionError::not_allowed("vault is not loaded").into()),
    }
}
