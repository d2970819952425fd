// Vesting ledger reconciliation - remaining principal and current weight

use crate::ledger::lock::{Lock, LockId, Withdrawal};
use crate::ledger::schedule::LockPhase;
use crate::ledger::weight::current_weight;
use alloy_primitives::{Address, U256};
use serde::{Deserialize, Serialize};

/// Reconciled state of one lock at the evaluation instant
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockAmounts {
    lock_id: LockId,
    original: U256,
    withdrawn: U256,
    remaining: U256,
    current_weight: U256,
}

impl LockAmounts {
    /// Get the lock this row describes
    pub fn lock_id(&self) -> LockId {
        self.lock_id
    }

    /// Get the nominal principal at creation
    pub fn original(&self) -> U256 {
        self.original
    }

    /// Get the portion of the principal inferred to have been withdrawn
    pub fn withdrawn(&self) -> U256 {
        self.withdrawn
    }

    /// Get the principal still locked (`original - withdrawn`, floored at zero)
    pub fn remaining(&self) -> U256 {
        self.remaining
    }

    /// Get the decayed voting weight at the evaluation instant
    pub fn current_weight(&self) -> U256 {
        self.current_weight
    }
}

/// Find the anchor event: the single most recent withdrawal.
///
/// The accounting model assumes a withdrawal always sweeps every vested
/// amount at its instant, so only the latest event matters when
/// reconstructing per-lock remaining balances.
pub fn latest_withdrawal(withdrawals: &[Withdrawal]) -> Option<u64> {
    withdrawals.iter().map(|w| w.timestamp()).max()
}

/// How much of the lock's principal had vested out (and, by the sweep
/// assumption, been withdrawn) as of the anchor instant.
///
/// A lock created strictly after the anchor is untouched by it.
pub fn withdrawn_at(lock: &Lock, anchor: u64) -> U256 {
    if lock.created_at() > anchor {
        return U256::ZERO;
    }

    let schedule = lock.schedule();
    match schedule.phase_at(anchor) {
        LockPhase::Expired => lock.amount(),
        LockPhase::Cliff => U256::ZERO,
        LockPhase::Decay => {
            // slope > 0 whenever the decay window is non-empty
            let slope = lock.slope() as u64;
            if slope == 0 {
                return lock.amount();
            }
            let elapsed = schedule.periods_into_slope(anchor);
            lock.amount() * U256::from(elapsed) / U256::from(slope)
        }
    }
}

/// Reconcile an account's locks against its withdrawal history.
///
/// Produces one [`LockAmounts`] row per lock owned by `account`, in input
/// order. Locks with a different owner are ignored even if present in the
/// input. With `account` absent there is nothing to reconcile and the result
/// is empty; no error is raised for empty inputs.
///
/// Phase A infers `withdrawn` from the most recent withdrawal event alone.
/// Phase B evaluates the voting weight at `now`, independent of withdrawals.
pub fn reconcile_lock_amounts(
    locks: &[Lock],
    withdrawals: &[Withdrawal],
    account: Option<Address>,
    now: u64,
) -> Vec<LockAmounts> {
    let Some(account) = account else {
        return Vec::new();
    };

    let anchor = latest_withdrawal(withdrawals);

    locks
        .iter()
        .filter(|lock| lock.is_owned_by(account))
        .map(|lock| {
            let withdrawn = match anchor {
                Some(anchor) => withdrawn_at(lock, anchor),
                None => U256::ZERO,
            };
            LockAmounts {
                lock_id: lock.id(),
                original: lock.amount(),
                withdrawn,
                remaining: lock.amount().saturating_sub(withdrawn),
                current_weight: current_weight(lock, now),
            }
        })
        .collect()
}
