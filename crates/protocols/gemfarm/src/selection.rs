//! Selection sets of NFTs pending a transfer

use gemstake_chain::Nft;
use gemstake_core::{Pubkey, SessionError};
use indexmap::IndexMap;

/// NFTs toggled by the user, keyed by mint.
///
/// Items are submitted in the order they were selected.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    items: IndexMap<Pubkey, Nft>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Toggle `nft` in or out of the set. Returns whether it is now selected.
    pub fn toggle(&mut self, nft: &Nft) -> bool {
        if self.items.shift_remove(&nft.mint).is_some() {
            false
        } else {
            self.items.insert(nft.mint, nft.clone());
            true
        }
    }

    /// Toggle the NFT with `mint`, which must be part of `available`
    pub fn toggle_in(&mut self, mint: &Pubkey, available: &[Nft]) -> Result<bool, SessionError> {
        let nft = available
            .iter()
            .find(|n| &n.mint == mint)
            .ok_or_else(|| SessionError::not_allowed(format!("NFT {} is not in this list", mint)))?;
        Ok(self.toggle(nft))
    }

    /// Drop selected mints that are no longer in `available`
    pub fn retain_present(&mut self, available: &[Nft]) {
        self.items
            .retain(|mint, _| available.iter().any(|n| &n.mint == mint));
    }

    pub fn contains(&self, mint: &Pubkey) -> bool {
        self.items.contains_key(mint)
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn items(&self) -> impl Iterator<Item = &Nft> {
        self.items.values()
    }

    pub fn mints(&self) -> Vec<Pubkey> {
        self.items.keys().copied().collect()
    }
}
