//! NFT records as returned by the inventory resolver

use gemstake_core::Pubkey;
use serde::{Deserialize, Serialize};
use serde_with::{serde_as, DisplayFromStr};

/// Metaplex creator entry
#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Creator {
    #[serde_as(as = "DisplayFromStr")]
    pub address: Pubkey,
    pub verified: bool,
    pub share: u8,
}

/// On-chain metadata of an NFT
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NftMetadata {
    pub name: String,
    pub symbol: String,
    pub uri: String,
    #[serde(default)]
    pub creators: Vec<Creator>,
}

/// A single NFT owned by the wallet or held in the vault
#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Nft {
    #[serde_as(as = "DisplayFromStr")]
    pub mint: Pubkey,
    /// Token account holding the NFT
    #[serde_as(as = "DisplayFromStr")]
    pub pubkey: Pubkey,
    pub metadata: NftMetadata,
}

impl Nft {
    /// First listed creator; the bank whitelist is checked against it
    pub fn first_creator(&self) -> Option<Pubkey> {
        self.metadata.creators.first().map(|c| c.address)
    }
}
