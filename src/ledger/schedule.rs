// Lock schedule math - periods, derived instants and phase classification

use serde::{Deserialize, Serialize};

/// Seconds in one period (one week). Lock durations are whole weeks.
pub const WEEK_SECS: u64 = 7 * 24 * 3600;

/// Maximum total lock duration in periods (2 years). Used as the normalizing
/// denominator for voting-weight decay.
pub const MAX_LOCK_PERIODS: u64 = 104;

/// Where a lock sits relative to its own timeline at some instant
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum LockPhase {
    /// Before the vesting start: full weight, nothing vested
    Cliff,
    /// Between vesting start and expiration: linear decay in whole periods
    Decay,
    /// At or after expiration: fully vested, zero weight
    Expired,
}

/// The derived timeline of a lock: cliff and slope lengths plus the
/// pre-computed expiration instant supplied by the data source.
///
/// `start_time` and `vesting_start` are derived backwards from `expiration`
/// rather than forwards from the creation event, because a relock moves the
/// schedule without touching the creation instant.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockSchedule {
    cliff: u32,
    slope: u32,
    expiration: u64,
}

impl LockSchedule {
    /// Build a schedule from cliff/slope period counts and the expiration
    pub fn new(cliff: u32, slope: u32, expiration: u64) -> Self {
        Self {
            cliff,
            slope,
            expiration,
        }
    }

    /// Total lock duration in whole periods
    pub fn total_periods(&self) -> u64 {
        self.cliff as u64 + self.slope as u64
    }

    /// The instant the lock's timeline began
    pub fn start_time(&self) -> u64 {
        self.expiration
            .saturating_sub(self.total_periods() * WEEK_SECS)
    }

    /// The instant decay begins (end of the cliff)
    pub fn vesting_start(&self) -> u64 {
        self.expiration
            .saturating_sub(self.slope as u64 * WEEK_SECS)
    }

    /// The instant the principal is fully unlocked
    pub fn expiration(&self) -> u64 {
        self.expiration
    }

    /// Classify the lock's regime at the given instant
    pub fn phase_at(&self, at: u64) -> LockPhase {
        if at >= self.expiration {
            LockPhase::Expired
        } else if at < self.vesting_start() {
            LockPhase::Cliff
        } else {
            LockPhase::Decay
        }
    }

    /// Whole periods elapsed since the vesting start, truncating and capped
    /// at the slope length. Zero before the vesting start.
    pub fn periods_into_slope(&self, at: u64) -> u64 {
        let elapsed = at.saturating_sub(self.vesting_start()) / WEEK_SECS;
        elapsed.min(self.slope as u64)
    }

    /// Whole periods until expiration, rounded up: a partial remaining period
    /// still counts as a full period. Zero at or after expiration.
    pub fn periods_until_expiration(&self, at: u64) -> u64 {
        let left = self.expiration.saturating_sub(at);
        left.div_ceil(WEEK_SECS)
    }
}
