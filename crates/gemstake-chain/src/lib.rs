//! gemstake-chain: Contracts for the chain-side collaborators of a staking session
//!
//! The gem bank and gem farm programs are reached through typed clients that
//! this crate only describes as traits. It also provides the account shapes
//! those clients return, farmer address derivation, and a `Connection`
//! implementation backed by a Solana RPC endpoint.

pub mod accounts;
pub mod clients;
pub mod nft;
pub mod pda;
pub mod rpc;

pub use accounts::{
    DepositRecord, FarmAccount, FarmReward, FarmerAccount, FarmerReward, FarmerStatus,
    VaultAccount,
};
pub use clients::{BankClient, ChainClients, ClientFactory, Connection, FarmClient, InventoryResolver};
pub use nft::{Creator, Nft, NftMetadata};
pub use pda::{find_farmer_pda, GEM_BANK_PROGRAM_ID, GEM_FARM_PROGRAM_ID};
pub use rpc::RpcConnection;

/// Result type for chain collaborator calls
pub type Result<T> = std::result::Result<T, gemstake_core::ChainError>;
