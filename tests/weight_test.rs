// Voting Weight Tests
// Tests for the time-based veToken decay of vesting locks

use alloy_primitives::{Address, U256};
use proptest::prelude::*;
use veledger::ledger::{current_weight, Lock, LockId, WEEK_SECS};

// ============================================================================
// HELPER FUNCTIONS
// ============================================================================

const START: u64 = 1_700_000_000;

fn e18(tokens: u64) -> U256 {
    U256::from(tokens) * U256::from(10).pow(U256::from(18))
}

fn u256(s: &str) -> U256 {
    U256::from_str_radix(s, 10).unwrap()
}

fn lock_with(cliff: u32, slope: u32, amount: U256) -> Lock {
    let expiration = START + (cliff as u64 + slope as u64) * WEEK_SECS;
    Lock::new(
        LockId::new(1),
        Address::repeat_byte(0xaa),
        amount,
        cliff,
        slope,
        expiration,
        START,
    )
}

// ============================================================================
// CLIFF PLATEAU
// ============================================================================

#[test]
fn test_full_duration_lock_starts_at_full_weight() {
    // cliff 10 + slope 94 = the 104-period maximum: weight equals the amount
    let lock = lock_with(10, 94, e18(1000));

    assert_eq!(current_weight(&lock, START), e18(1000));
}

#[test]
fn test_cliff_weight_is_constant() {
    let lock = lock_with(10, 42, e18(1000));
    let vesting_start = lock.schedule().vesting_start();

    // 52 of 104 periods -> half the principal, everywhere inside the cliff
    let expected = e18(500);
    assert_eq!(current_weight(&lock, START), expected);
    assert_eq!(current_weight(&lock, START + 3 * WEEK_SECS), expected);
    assert_eq!(current_weight(&lock, vesting_start - 1), expected);
}

#[test]
fn test_plateau_scales_by_total_duration() {
    let lock = lock_with(6, 20, e18(1040));

    // 26 of 104 periods -> a quarter of the principal
    assert_eq!(current_weight(&lock, START), e18(260));
}

// ============================================================================
// LINEAR DECAY
// ============================================================================

#[test]
fn test_decay_follows_remaining_periods() {
    // 47 weeks into the lock's life, 57 whole weeks remain until expiration:
    // 1000e18 * 57 / 104, truncating
    let lock = lock_with(10, 94, e18(1000));

    let weight = current_weight(&lock, START + 47 * WEEK_SECS);
    assert_eq!(weight, u256("548076923076923076923"));
}

#[test]
fn test_decay_47_periods_into_slope() {
    // 47 weeks past the vesting start leaves 47 of the 94 slope periods:
    // 1000e18 * 47 / 104, truncating
    let lock = lock_with(10, 94, e18(1000));
    let vesting_start = lock.schedule().vesting_start();

    let weight = current_weight(&lock, vesting_start + 47 * WEEK_SECS);
    assert_eq!(weight, u256("451923076923076923076"));
}

#[test]
fn test_first_decay_step_drops_below_plateau() {
    let lock = lock_with(10, 94, e18(1000));
    let vesting_start = lock.schedule().vesting_start();

    // At the vesting start exactly 94 periods remain
    let weight = current_weight(&lock, vesting_start);
    assert_eq!(weight, u256("903846153846153846153"));
    assert!(weight < current_weight(&lock, vesting_start - 1));
}

#[test]
fn test_partial_period_counts_in_full() {
    let lock = lock_with(10, 94, e18(1040));
    let expiration = lock.schedule().expiration();

    // One second short of a boundary still charges the whole period
    assert_eq!(current_weight(&lock, expiration - 1), e18(10));
    assert_eq!(current_weight(&lock, expiration - WEEK_SECS), e18(10));
    assert_eq!(current_weight(&lock, expiration - WEEK_SECS - 1), e18(20));
}

// ============================================================================
// FULL DECAY
// ============================================================================

#[test]
fn test_zero_weight_at_and_after_expiration() {
    let lock = lock_with(10, 94, e18(1000));
    let expiration = lock.schedule().expiration();

    assert_eq!(current_weight(&lock, expiration), U256::ZERO);
    assert_eq!(current_weight(&lock, expiration + 1), U256::ZERO);
    assert_eq!(current_weight(&lock, expiration + 500 * WEEK_SECS), U256::ZERO);
}

// ============================================================================
// DEGENERATE LOCKS
// ============================================================================

#[test]
fn test_zero_amount_lock_has_zero_weight() {
    let lock = lock_with(10, 94, U256::ZERO);

    assert_eq!(current_weight(&lock, START), U256::ZERO);
    assert_eq!(current_weight(&lock, START + 50 * WEEK_SECS), U256::ZERO);
}

#[test]
fn test_zero_slope_lock_plateaus_until_expiration() {
    let lock = lock_with(8, 0, e18(1040));
    let expiration = lock.schedule().expiration();

    // No decay window: the plateau runs right up to the end
    assert_eq!(current_weight(&lock, expiration - 1), e18(80));
    assert_eq!(current_weight(&lock, expiration), U256::ZERO);
}

// ============================================================================
// MONOTONICITY
// ============================================================================

proptest! {
    #[test]
    fn test_weight_never_increases_over_time(
        cliff in 0u32..=20,
        slope in 0u32..=94,
        raw_amount in any::<u64>(),
        off_a in 0u64..=120 * WEEK_SECS,
        off_b in 0u64..=120 * WEEK_SECS,
    ) {
        let lock = lock_with(cliff, slope, U256::from(raw_amount));
        let (early, late) = if off_a <= off_b {
            (off_a, off_b)
        } else {
            (off_b, off_a)
        };

        prop_assert!(
            current_weight(&lock, START + early) >= current_weight(&lock, START + late)
        );
    }
}
