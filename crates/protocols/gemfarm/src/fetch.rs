//! Vault NFT resolution
//!
//! The vault itself only knows deposit receipts. The NFTs shown for it are
//! rebuilt from those receipts and enriched through the inventory resolver.

use gemstake_chain::{BankClient, InventoryResolver, Nft};
use gemstake_core::{ChainError, Pubkey};

/// Resolve the NFTs currently deposited in `vault`.
///
/// Receipts whose metadata cannot be resolved are dropped with a warning; a
/// failing receipt listing or resolver call is returned as an error so the
/// caller can keep its previous list.
pub async fn resolve_vault_nfts(
    bank: &dyn BankClient,
    inventory: &dyn InventoryResolver,
    vault: &Pubkey,
) -> Result<Vec<Nft>, ChainError> {
    let records = bank.fetch_all_gdr_pdas(vault).await?;
    let mints: Vec<Pubkey> = records.iter().map(|gdr| gdr.gem_mint).collect();

    if mints.is_empty() {
        tracing::debug!(vault = %vault, "Vault holds no deposit receipts");
        return Ok(Vec::new());
    }

    let nfts = inventory.resolve_metadata(&mints).await?;

    if nfts.len() < mints.len() {
        tracing::warn!(
            vault = %vault,
            receipts = mints.len(),
            resolved = nfts.len(),
            "Some vault NFTs could not be resolved"
        );
    }

    tracing::info!(vault = %vault, count = nfts.len(), "Resolved vault NFTs");
    Ok(nfts)
}
