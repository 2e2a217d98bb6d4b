//! `Connection` backed by a Solana JSON-RPC endpoint

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use gemstake_core::{ChainError, RpcConfig, TxSig};
use solana_rpc_client::nonblocking::rpc_client::RpcClient;

use crate::clients::Connection;
use crate::Result;

/// RPC connection with a bounded confirmation wait
#[derive(Clone)]
pub struct RpcConnection {
    inner: Arc<RpcClient>,
    confirm_timeout: Duration,
    config: RpcConfig,
}

impl RpcConnection {
    pub fn new(config: RpcConfig) -> Self {
        let inner = RpcClient::new(config.url.clone());
        Self {
            inner: Arc::new(inner),
            confirm_timeout: Duration::from_secs(config.confirm_timeout_secs),
            config,
        }
    }

    pub fn config(&self) -> &RpcConfig {
        &self.config
    }
}

/// Delay between signature status polls
const STATUS_POLL_INTERVAL: Duration = Duration::from_millis(500);

#[async_trait]
impl Connection for RpcConnection {
    async fn confirm_transaction(&self, sig: &TxSig) -> Result<()> {
        tracing::debug!(tx = %sig, "Awaiting confirmation");
        let client = &self.inner;
        let signature = sig.signature();
        let limit = self.confirm_timeout;

        await_confirmation(limit, STATUS_POLL_INTERVAL, move || {
            timed_request(limit, client.get_signature_status(signature))
        })
        .await
        .inspect_err(|e| tracing::warn!(tx = %sig, error = %e, "Transaction not confirmed"))?;

        tracing::debug!(tx = %sig, "Transaction confirmed");
        Ok(())
    }
}

/// Poll `fetch_status` every `interval` until the transaction settles.
///
/// `None` means the signature is not known yet. The whole wait is bounded by
/// `limit`.
async fn await_confirmation<F, Fut, E>(
    limit: Duration,
    interval: Duration,
    mut fetch_status: F,
) -> Result<()>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<Option<std::result::Result<(), E>>>>,
    E: std::fmt::Display,
{
    let poll = async {
        loop {
            match fetch_status().await? {
                Some(Ok(())) => return Ok(()),
                Some(Err(e)) => return Err(ChainError::rpc(format!("transaction failed: {}", e))),
                None => tokio::time::sleep(interval).await,
            }
        }
    };

    tokio::time::timeout(limit, poll)
        .await
        .map_err(|_| ChainError::Timeout {
            secs: limit.as_secs(),
        })?
}

async fn timed_request<T, E: std::fmt::Display>(
    limit: Duration,
    fut: impl Future<Output = std::result::Result<T, E>>,
) -> Result<T> {
    tokio::time::timeout(limit, fut)
        .await
        .map_err(|_| ChainError::Timeout {
            secs: limit.as_secs(),
        })?
        .map_err(|e| ChainError::rpc(e.to_string()))
}
