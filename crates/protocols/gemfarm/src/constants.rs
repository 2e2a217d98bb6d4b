//! Gem Farm Constants
//!
//! User-facing status strings shown while actions run.

/// Feedback while depositing the wallet selection
pub const FEEDBACK_DEPOSITING: &str = "Depositing NFTs to the vault...";
/// Feedback while withdrawing the vault selection
pub const FEEDBACK_WITHDRAWING: &str = "Withdrawing NFTs...";
pub const FEEDBACK_STAKING: &str = "Staking...";
pub const FEEDBACK_UNSTAKING: &str = "Unstaking wallet...";
pub const FEEDBACK_CLAIMING: &str = "Claiming rewards...";
pub const FEEDBACK_INITIALIZING: &str = "Initializing farmer...";
pub const FEEDBACK_REFRESHING: &str = "Refreshing rewards...";
pub const FEEDBACK_FETCHING_FARMER: &str = "Fetching farmer account...";

/// Warning after a deposit the bank refused
pub const WHITELIST_WARNING: &str = "Could not deposit your NFT.";
