//! Application state shared across API handlers

use std::sync::Arc;

use gemstake_core::{AppConfig, Pubkey, Result};
use tokio::sync::RwLock;

use crate::session::{Collaborators, StakingSession};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: RwLock<AppConfig>,
    collaborators: Collaborators,
    session: RwLock<Option<Arc<StakingSession>>>,
}

impl AppState {
    pub fn new(config: AppConfig, collaborators: Collaborators) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                config: RwLock::new(config),
                collaborators,
                session: RwLock::new(None),
            }),
        }
    }

    /// Get current config
    pub async fn config(&self) -> AppConfig {
        self.inner.config.read().await.clone()
    }

    /// Get the active session, if a wallet is connected
    pub async fn session(&self) -> Option<Arc<StakingSession>> {
        self.inner.session.read().await.clone()
    }

    /// Bind `wallet` to a farm and initialize the session.
    ///
    /// The same wallet keeps its session and is re-targeted; a different
    /// wallet replaces it. `farm_id` falls back to the configured farm. The
    /// session is returned even when initialization failed so callers can
    /// still report its state.
    pub async fn open_session(
        &self,
        wallet: Pubkey,
        farm_id: Option<String>,
    ) -> (Arc<StakingSession>, Result<()>) {
        let farm_id = match farm_id {
            Some(farm_id) => farm_id,
            None => self.config().await.farm_id,
        };

        let existing = self
            .session()
            .await
            .filter(|session| session.wallet() == &wallet);

        match existing {
            Some(session) => {
                tracing::info!(wallet = %wallet, farm = %farm_id, "Re-targeting staking session");
                let result = session.change_farm(farm_id).await;
                (session, result)
            }
            None => {
                tracing::info!(wallet = %wallet, farm = %farm_id, "Opening staking session");
                let session = Arc::new(StakingSession::new(
                    wallet,
                    farm_id,
                    self.inner.collaborators.clone(),
                ));
                *self.inner.session.write().await = Some(session.clone());
                let result = session.initialize().await;
                (session, result)
            }
        }
    }

    /// Disconnect the wallet (drop the session)
    pub async fn close_session(&self) {
        let mut session = self.inner.session.write().await;
        if let Some(closed) = session.take() {
            tracing::info!(wallet = %closed.wallet(), "Staking session closed");
        }
    }
}
