//! Gemstake-api: Staking session and HTTP API
//!
//! Hosts the staking session of the connected wallet and exposes its state
//! and actions over a small REST API.

pub mod dto;
pub mod routes;
pub mod server;
pub mod session;
pub mod state;

#[cfg(test)]
pub(crate) mod testing;

pub use server::*;
pub use session::{Collaborators, SessionState, StakingSession};
pub use state::AppState;
