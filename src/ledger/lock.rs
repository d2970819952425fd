// Lock and withdrawal models - the read-only inputs from the locking ledger

use crate::ledger::schedule::LockSchedule;
use alloy_primitives::{Address, U256};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique identifier for a lock, assigned by the external locking ledger
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LockId(u64);

impl LockId {
    /// Create a lock ID from its raw ledger index
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    /// Get the raw ledger index
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl From<u64> for LockId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl fmt::Display for LockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "lock:{}", self.0)
    }
}

/// A vesting grant as reported by the locking ledger.
///
/// Locks are created and superseded by the external ledger only; this crate
/// never mutates them. `expiration` is pre-computed by the data source from
/// the current period index, and `created_at` comes from the attached
/// creation-event metadata (a relock moves the schedule but not the creation
/// instant).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lock {
    id: LockId,
    owner: Address,
    amount: U256,
    cliff: u32,
    slope: u32,
    expiration: u64,
    created_at: u64,
}

impl Lock {
    /// Create a lock record from ledger data
    pub fn new(
        id: LockId,
        owner: Address,
        amount: U256,
        cliff: u32,
        slope: u32,
        expiration: u64,
        created_at: u64,
    ) -> Self {
        Self {
            id,
            owner,
            amount,
            cliff,
            slope,
            expiration,
            created_at,
        }
    }

    /// Get the lock ID
    pub fn id(&self) -> LockId {
        self.id
    }

    /// Get the owning account
    pub fn owner(&self) -> Address {
        self.owner
    }

    /// Get the nominal principal, in smallest token units
    pub fn amount(&self) -> U256 {
        self.amount
    }

    /// Get the cliff length in whole periods
    pub fn cliff(&self) -> u32 {
        self.cliff
    }

    /// Get the decay (slope) length in whole periods
    pub fn slope(&self) -> u32 {
        self.slope
    }

    /// Get the instant at which the principal is fully unlocked
    pub fn expiration(&self) -> u64 {
        self.expiration
    }

    /// Get the creation timestamp from the lock's creation event
    pub fn created_at(&self) -> u64 {
        self.created_at
    }

    /// Check whether the lock is owned by the given account
    pub fn is_owned_by(&self, account: Address) -> bool {
        self.owner == account
    }

    /// Derive the lock's time schedule (start, vesting start, phases)
    pub fn schedule(&self) -> LockSchedule {
        LockSchedule::new(self.cliff, self.slope, self.expiration)
    }
}

/// A historical partial-withdrawal event for the reconciled account.
///
/// Withdrawals are append-only facts produced by the external ledger. The
/// reconciler only needs their timestamps: the accounting model assumes every
/// withdrawal swept all vested amounts at that instant.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Withdrawal {
    timestamp: u64,
}

impl Withdrawal {
    /// Create a withdrawal event record
    pub fn new(timestamp: u64) -> Self {
        Self { timestamp }
    }

    /// Get the instant the withdrawal happened
    pub fn timestamp(&self) -> u64 {
        self.timestamp
    }
}
