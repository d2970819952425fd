// Voting weight decay - the time-based veToken value of a lock

use crate::ledger::lock::Lock;
use crate::ledger::schedule::{LockPhase, MAX_LOCK_PERIODS};
use alloy_primitives::U256;

/// Scale a principal by a period count against the maximum lock duration:
/// `amount * periods / MAX_LOCK_PERIODS`, truncating toward zero.
///
/// Periods never exceed 2^33, so the product stays far below 2^256 for any
/// 18-decimal token amount.
fn scaled_by_periods(amount: U256, periods: u64) -> U256 {
    amount * U256::from(periods) / U256::from(MAX_LOCK_PERIODS)
}

/// Compute the lock's effective voting weight at `now`.
///
/// Decay is purely time-based and independent of withdrawals:
/// - at or after expiration the weight is zero;
/// - inside the cliff the weight is a constant plateau, the principal scaled
///   by the lock's total duration over the 104-period maximum;
/// - inside the slope window the weight is the principal scaled by the whole
///   periods remaining until expiration, rounded up so a partial remaining
///   period still counts in full.
pub fn current_weight(lock: &Lock, now: u64) -> U256 {
    let schedule = lock.schedule();
    match schedule.phase_at(now) {
        LockPhase::Expired => U256::ZERO,
        LockPhase::Cliff => scaled_by_periods(lock.amount(), schedule.total_periods()),
        LockPhase::Decay => {
            scaled_by_periods(lock.amount(), schedule.periods_until_expiration(now))
        }
    }
}
