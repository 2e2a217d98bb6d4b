//! Reward Calculator
//!
//! Pure math functions for farmer reward values. No async, no chain.
//!
//! The claimable amount of a reward slot is:
//!   available = accrued - paid_out
//!
//! Reward tokens carry 9 decimals, so 1_000_000_000 base units display as 1.

use gemstake_chain::FarmerReward;
use gemstake_core::constants::{REWARD_DECIMALS, REWARD_DENOMINATION};

/// Claimable reward in base units.
///
/// Returns `None` when `paid_out` exceeds `accrued`. That state should never
/// exist on chain and must not be read as a claimable amount.
pub fn available_reward(accrued: u64, paid_out: u64) -> Option<u64> {
    accrued.checked_sub(paid_out)
}

/// Claimable amount of a farmer reward slot
pub fn available_for(reward: &FarmerReward) -> Option<u64> {
    available_reward(reward.accrued_reward, reward.paid_out_reward)
}

/// Scale base units to whole reward tokens
pub fn to_display(amount: u64) -> f64 {
    amount as f64 / REWARD_DENOMINATION as f64
}

/// Render base units as a fixed-point string with `decimals` fraction digits.
///
/// Uses integer math and truncates, so the output never rounds a balance up.
pub fn format_reward(amount: u64, decimals: u32) -> String {
    let decimals = decimals.min(REWARD_DECIMALS);
    let whole = amount / REWARD_DENOMINATION;
    if decimals == 0 {
        return whole.to_string();
    }

    let frac = amount % REWARD_DENOMINATION;
    let frac = frac / 10u64.pow(REWARD_DECIMALS - decimals);
    format!("{}.{:0width$}", whole, frac, width = decimals as usize)
}
