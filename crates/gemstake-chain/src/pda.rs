//! Program-derived addresses of the gem farm program

use gemstake_core::Pubkey;

/// Gem farm program id
pub const GEM_FARM_PROGRAM_ID: Pubkey =
    Pubkey::from_str_const("farmL4xeBFVXJqtfxCzU9b28QACM7E2W2ctT6epAjvE");

/// Gem bank program id
pub const GEM_BANK_PROGRAM_ID: Pubkey =
    Pubkey::from_str_const("bankHHdqMuaaST4qQk6mkzxGeKPHWmqdgor6Gs8r88m");

const FARMER_SEED: &[u8] = b"farmer";

/// Farmer account address for `identity` within `farm`.
///
/// Seeds: `["farmer", farm, identity]` under the gem farm program.
pub fn find_farmer_pda(farm: &Pubkey, identity: &Pubkey) -> (Pubkey, u8) {
    Pubkey::find_program_address(
        &[FARMER_SEED, farm.as_ref(), identity.as_ref()],
        &GEM_FARM_PROGRAM_ID,
    )
}
