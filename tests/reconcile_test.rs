// Reconciliation Tests
// Tests for attributing withdrawn/remaining principal from withdrawal history

use alloy_primitives::{Address, U256};
use proptest::prelude::*;
use veledger::ledger::{
    latest_withdrawal, reconcile_lock_amounts, withdrawn_at, Lock, LockId, Withdrawal, WEEK_SECS,
};

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

fn alice() -> Address {
    Address::repeat_byte(0xaa)
}

fn bob() -> Address {
    Address::repeat_byte(0xbb)
}

fn lock_for(id: u64, owner: Address, amount: U256, cliff: u32, slope: u32, start: u64) -> Lock {
    let expiration = start + (cliff as u64 + slope as u64) * WEEK_SECS;
    Lock::new(LockId::new(id), owner, amount, cliff, slope, expiration, start)
}

// ============================================================================
// NO WITHDRAWALS
// ============================================================================

#[test]
fn test_no_withdrawals_is_identity() {
    let locks = vec![
        lock_for(1, alice(), e18(1000), 10, 94, START),
        lock_for(2, alice(), e18(250), 0, 52, START),
    ];

    let rows = reconcile_lock_amounts(&locks, &[], Some(alice()), START + WEEK_SECS);

    assert_eq!(rows.len(), 2);
    for row in &rows {
        assert_eq!(row.withdrawn(), U256::ZERO);
        assert_eq!(row.remaining(), row.original());
    }
}

// ============================================================================
// ANCHOR SELECTION
// ============================================================================

#[test]
fn test_latest_withdrawal_picks_max_timestamp() {
    let history = vec![
        Withdrawal::new(300),
        Withdrawal::new(100),
        Withdrawal::new(200),
    ];

    assert_eq!(latest_withdrawal(&history), Some(300));
    assert_eq!(latest_withdrawal(&[]), None);
}

#[test]
fn test_only_latest_event_matters() {
    let locks = vec![lock_for(1, alice(), e18(1000), 10, 94, START)];
    let vesting_start = locks[0].schedule().vesting_start();
    let now = vesting_start + 30 * WEEK_SECS;

    let full_history = vec![
        Withdrawal::new(vesting_start + 5 * WEEK_SECS),
        Withdrawal::new(vesting_start + 20 * WEEK_SECS),
    ];
    let latest_only = vec![Withdrawal::new(vesting_start + 20 * WEEK_SECS)];

    let from_full = reconcile_lock_amounts(&locks, &full_history, Some(alice()), now);
    let from_latest = reconcile_lock_amounts(&locks, &latest_only, Some(alice()), now);

    assert_eq!(from_full, from_latest);
}

// ============================================================================
// WITHDRAWAL ATTRIBUTION
// ============================================================================

#[test]
fn test_mid_decay_withdrawal_truncates() {
    // 20 of 94 slope periods elapsed at the anchor:
    // withdrawn = 1000e18 * 20 / 94, truncating
    let locks = vec![lock_for(1, alice(), e18(1000), 10, 94, START)];
    let vesting_start = locks[0].schedule().vesting_start();
    let anchor = vesting_start + 20 * WEEK_SECS;

    let rows = reconcile_lock_amounts(&locks, &[Withdrawal::new(anchor)], Some(alice()), anchor);

    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].withdrawn(), u256("212765957446808510638"));
    assert_eq!(rows[0].remaining(), u256("787234042553191489362"));
    assert_eq!(rows[0].withdrawn() + rows[0].remaining(), rows[0].original());
}

#[test]
fn test_withdrawal_during_cliff_takes_nothing() {
    let lock = lock_for(1, alice(), e18(1000), 10, 94, START);
    let anchor = lock.schedule().vesting_start() - 1;

    assert_eq!(withdrawn_at(&lock, anchor), U256::ZERO);
}

#[test]
fn test_withdrawal_after_expiration_takes_everything() {
    let lock = lock_for(1, alice(), e18(1000), 10, 94, START);
    let expiration = lock.schedule().expiration();

    assert_eq!(withdrawn_at(&lock, expiration), e18(1000));
    assert_eq!(withdrawn_at(&lock, expiration + 40 * WEEK_SECS), e18(1000));
}

#[test]
fn test_whole_periods_only() {
    // A second short of the next boundary attributes the lower period count
    let lock = lock_for(1, alice(), e18(940), 10, 94, START);
    let vesting_start = lock.schedule().vesting_start();

    assert_eq!(
        withdrawn_at(&lock, vesting_start + 3 * WEEK_SECS - 1),
        e18(20)
    );
    assert_eq!(withdrawn_at(&lock, vesting_start + 3 * WEEK_SECS), e18(30));
}

#[test]
fn test_lock_created_after_anchor_is_untouched() {
    let older = lock_for(1, alice(), e18(1000), 10, 94, START);
    let anchor = older.schedule().vesting_start() + 20 * WEEK_SECS;
    let newer = lock_for(2, alice(), e18(500), 0, 52, anchor + 1);

    let locks = vec![older, newer];
    let rows =
        reconcile_lock_amounts(&locks, &[Withdrawal::new(anchor)], Some(alice()), anchor + 2);

    assert_eq!(rows.len(), 2);
    assert!(rows[0].withdrawn() > U256::ZERO);
    assert_eq!(rows[1].withdrawn(), U256::ZERO);
    assert_eq!(rows[1].remaining(), e18(500));
}

// ============================================================================
// OWNERSHIP AND ACCOUNT
// ============================================================================

#[test]
fn test_foreign_locks_are_excluded() {
    let locks = vec![
        lock_for(1, alice(), e18(100), 10, 94, START),
        lock_for(2, bob(), e18(200), 10, 94, START),
        lock_for(3, alice(), e18(300), 0, 52, START),
    ];

    let rows = reconcile_lock_amounts(&locks, &[], Some(alice()), START);

    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].lock_id(), LockId::new(1));
    assert_eq!(rows[1].lock_id(), LockId::new(3));
}

#[test]
fn test_missing_account_reconciles_nothing() {
    let locks = vec![lock_for(1, alice(), e18(100), 10, 94, START)];

    let rows = reconcile_lock_amounts(&locks, &[], None, START);

    assert!(rows.is_empty());
}

#[test]
fn test_output_follows_input_order() {
    let locks = vec![
        lock_for(5, alice(), e18(1), 10, 94, START),
        lock_for(2, alice(), e18(2), 10, 94, START),
        lock_for(9, alice(), e18(3), 10, 94, START),
    ];

    let rows = reconcile_lock_amounts(&locks, &[], Some(alice()), START);

    let ids: Vec<u64> = rows.iter().map(|r| r.lock_id().as_u64()).collect();
    assert_eq!(ids, vec![5, 2, 9]);
}

// ============================================================================
// WEIGHT INDEPENDENCE
// ============================================================================

#[test]
fn test_weight_ignores_withdrawal_history() {
    let locks = vec![lock_for(1, alice(), e18(1000), 10, 94, START)];
    let vesting_start = locks[0].schedule().vesting_start();
    let now = vesting_start + 30 * WEEK_SECS;
    let history = vec![Withdrawal::new(vesting_start + 20 * WEEK_SECS)];

    let with_history = reconcile_lock_amounts(&locks, &history, Some(alice()), now);
    let without_history = reconcile_lock_amounts(&locks, &[], Some(alice()), now);

    assert_ne!(with_history[0].withdrawn(), without_history[0].withdrawn());
    assert_eq!(
        with_history[0].current_weight(),
        without_history[0].current_weight()
    );
}

// ============================================================================
// FIXTURES
// ============================================================================

#[test]
fn test_lock_fixtures_deserialize() {
    let json = r#"[{
        "id": 7,
        "owner": "0xaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa",
        "amount": "1000000000000000000000",
        "cliff": 10,
        "slope": 94,
        "expiration": 1762899200,
        "created_at": 1700000000
    }]"#;

    let locks: Vec<Lock> = serde_json::from_str(json).unwrap();

    assert_eq!(locks.len(), 1);
    assert_eq!(locks[0].id(), LockId::new(7));
    assert_eq!(locks[0].owner(), alice());
    assert_eq!(locks[0].amount(), e18(1000));
    assert_eq!(locks[0].schedule().start_time(), START);
}

#[test]
fn test_withdrawal_fixtures_deserialize() {
    let json = r#"[{"timestamp": 1712345678}, {"timestamp": 1709876543}]"#;

    let history: Vec<Withdrawal> = serde_json::from_str(json).unwrap();

    assert_eq!(history.len(), 2);
    assert_eq!(latest_withdrawal(&history), Some(1_712_345_678));
}

// ============================================================================
// BOUNDS
// ============================================================================

proptest! {
    #[test]
    fn test_withdrawn_stays_within_principal(
        cliff in 0u32..=20,
        slope in 0u32..=94,
        raw_amount in any::<u64>(),
        anchor_off in 0u64..=200 * WEEK_SECS,
    ) {
        let lock = lock_for(1, alice(), U256::from(raw_amount), cliff, slope, START);
        let history = [Withdrawal::new(START + anchor_off)];

        let rows =
            reconcile_lock_amounts(&[lock], &history, Some(alice()), START + anchor_off);

        prop_assert_eq!(rows.len(), 1);
        prop_assert!(rows[0].withdrawn() <= rows[0].original());
        prop_assert_eq!(rows[0].remaining(), rows[0].original() - rows[0].withdrawn());
    }
}
