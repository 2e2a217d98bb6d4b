//! Sequential batch transfers
//!
//! Deposits and withdrawals move one NFT per transaction. Items are submitted
//! strictly one at a time, in selection order, each awaited to confirmation
//! before the next starts. What happens after a failed item is decided by a
//! single [`BatchPolicy`] instead of per-action loops.

use std::future::Future;

use gemstake_chain::Nft;
use gemstake_core::{ChainError, Pubkey, TxSig};

/// Per-item failure policy of a batch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchPolicy {
    pub continue_on_item_failure: bool,
}

impl BatchPolicy {
    /// Record the failure and move on to the next item
    pub const CONTINUE: Self = Self {
        continue_on_item_failure: true,
    };

    /// Stop at the first failure; remaining items are never submitted
    pub const ABORT: Self = Self {
        continue_on_item_failure: false,
    };
}

/// Result of one submitted item
#[derive(Debug, Clone)]
pub enum ItemOutcome {
    Confirmed(TxSig),
    Failed(ChainError),
}

/// Per-item results of a batch, in submission order
#[derive(Debug, Clone, Default)]
pub struct BatchOutcome {
    pub results: Vec<(Pubkey, ItemOutcome)>,
    /// True when the batch stopped before every item was submitted
    pub aborted: bool,
}

impl BatchOutcome {
    pub fn confirmed_count(&self) -> usize {
        self.results
            .iter()
            .filter(|(_, o)| matches!(o, ItemOutcome::Confirmed(_)))
            .count()
    }

    pub fn failed_count(&self) -> usize {
        self.results.len() - self.confirmed_count()
    }

    pub fn first_error(&self) -> Option<&ChainError> {
        self.results.iter().find_map(|(_, o)| match o {
            ItemOutcome::Failed(e) => Some(e),
            ItemOutcome::Confirmed(_) => None,
        })
    }
}

/// Run `submit` for each item sequentially under `policy`.
///
/// `submit` must resolve only once the item's transaction is confirmed.
pub async fn run_batch<F, Fut>(items: Vec<Nft>, policy: BatchPolicy, mut submit: F) -> BatchOutcome
where
    F: FnMut(Nft) -> Fut,
    Fut: Future<Output = Result<TxSig, ChainError>>,
{
    let mut outcome = BatchOutcome::default();

    for nft in items {
        let mint = nft.mint;
        match submit(nft).await {
            Ok(sig) => {
                tracing::debug!(mint = %mint, tx = %sig, "Batch item confirmed");
                outcome.results.push((mint, ItemOutcome::Confirmed(sig)));
            }
            Err(e) => {
                tracing::warn!(mint = %mint, error = %e, "Batch item failed");
                outcome.results.push((mint, ItemOutcome::Failed(e)));
                if !policy.continue_on_item_failure {
                    outcome.aborted = true;
                    break;
                }
            }
        }
    }

    outcome
}
