//! Gem Farm Staking Protocol
//!
//! Users deposit NFTs from their wallet into a gem bank vault, then stake the
//! vault in a gem farm to accrue up to two reward tokens. This crate holds the
//! protocol-side logic that sits between the raw chain clients and a staking
//! session: reward math, farmer snapshots, selection sets, vault NFT
//! resolution and sequential batch transfers.

pub mod batch;
pub mod calculator;
pub mod constants;
pub mod fetch;
pub mod selection;
pub mod state;

// Re-exports
pub use batch::{run_batch, BatchOutcome, BatchPolicy, ItemOutcome};
pub use calculator::{available_reward, format_reward, to_display};
pub use fetch::resolve_vault_nfts;
pub use selection::Selection;
pub use state::{FarmerSnapshot, StakingAction};
