// vel - operator CLI for inspecting ve-token vesting locks
// Loads lock/withdrawal fixtures from JSON and prints reconciled amounts

use anyhow::{ensure, Context, Result};
use clap::{Parser, Subcommand};
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing_subscriber::EnvFilter;

use alloy_primitives::{Address, U256};
use veledger::ledger::{
    current_weight, reconcile_lock_amounts, Lock, LockPhase, Withdrawal, WEEK_SECS,
};

#[derive(Parser)]
#[command(name = "vel", version, about = "Inspect and reconcile ve-token vesting locks")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Reconcile withdrawn/remaining principal and current voting weight
    Reconcile {
        /// JSON file holding an array of lock records
        #[arg(long)]
        locks: PathBuf,
        /// JSON file holding an array of withdrawal events
        #[arg(long)]
        withdrawals: Option<PathBuf>,
        /// Account to reconcile (0x-prefixed address)
        #[arg(long)]
        account: String,
        /// Evaluation instant, Unix seconds or RFC 3339 (defaults to now)
        #[arg(long)]
        now: Option<String>,
    },
    /// Show a lock's derived schedule and its week-by-week weight decay
    Schedule {
        /// JSON file holding an array of lock records
        #[arg(long)]
        locks: PathBuf,
        /// Id of the lock to inspect
        #[arg(long)]
        lock_id: u64,
        /// Evaluation instant, Unix seconds or RFC 3339 (defaults to now)
        #[arg(long)]
        now: Option<String>,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Reconcile {
            locks,
            withdrawals,
            account,
            now,
        } => run_reconcile(&locks, withdrawals.as_deref(), &account, now.as_deref()),
        Commands::Schedule {
            locks,
            lock_id,
            now,
        } => run_schedule(&locks, lock_id, now.as_deref()),
    }
}

fn run_reconcile(
    locks_path: &Path,
    withdrawals_path: Option<&Path>,
    account: &str,
    now: Option<&str>,
) -> Result<()> {
    let locks: Vec<Lock> = load_json(locks_path, "locks")?;
    let withdrawals: Vec<Withdrawal> = match withdrawals_path {
        Some(path) => load_json(path, "withdrawals")?,
        None => Vec::new(),
    };
    let account = Address::from_str(account)
        .with_context(|| format!("invalid account address: {account}"))?;
    let now = resolve_now(now)?;

    let rows = reconcile_lock_amounts(&locks, &withdrawals, Some(account), now);

    println!("account {account}  now {now}  locks {}", rows.len());
    println!(
        "{:<12} {:>28} {:>28} {:>28} {:>28}",
        "lock", "original", "withdrawn", "remaining", "weight"
    );
    for row in &rows {
        println!(
            "{:<12} {:>28} {:>28} {:>28} {:>28}",
            row.lock_id().to_string(),
            format_units(row.original()),
            format_units(row.withdrawn()),
            format_units(row.remaining()),
            format_units(row.current_weight()),
        );
    }
    Ok(())
}

fn run_schedule(locks_path: &Path, lock_id: u64, now: Option<&str>) -> Result<()> {
    let locks: Vec<Lock> = load_json(locks_path, "locks")?;
    let lock = locks
        .iter()
        .find(|l| l.id().as_u64() == lock_id)
        .with_context(|| format!("no lock with id {lock_id} in {}", locks_path.display()))?;
    let now = resolve_now(now)?;

    let sched = lock.schedule();
    println!("{}  owner {}", lock.id(), lock.owner());
    println!("amount          {}", format_units(lock.amount()));
    println!("cliff/slope     {} + {} periods", lock.cliff(), lock.slope());
    println!("start           {}", fmt_instant(sched.start_time()));
    println!("vesting start   {}", fmt_instant(sched.vesting_start()));
    println!("expiration      {}", fmt_instant(sched.expiration()));
    println!("phase at now    {}", phase_name(sched.phase_at(now)));

    let remaining = sched.periods_until_expiration(now);
    println!();
    println!("{:>12} {:>10} {:>28}", "instant", "periods", "weight");
    println!(
        "{:>12} {:>10} {:>28}",
        now,
        remaining,
        format_units(current_weight(lock, now))
    );
    // Boundaries after now, down to expiration itself; before the lock has
    // started the weight is a plateau, so the table begins at the start
    let table_rows = remaining.min(sched.total_periods());
    for k in (0..table_rows).rev() {
        let at = sched.expiration().saturating_sub(k * WEEK_SECS);
        println!(
            "{:>12} {:>10} {:>28}",
            at,
            k,
            format_units(current_weight(lock, at))
        );
    }
    Ok(())
}

fn load_json<T: serde::de::DeserializeOwned>(path: &Path, what: &str) -> Result<T> {
    let data = fs::read_to_string(path)
        .with_context(|| format!("reading {what} from {}", path.display()))?;
    serde_json::from_str(&data)
        .with_context(|| format!("parsing {what} from {}", path.display()))
}

fn resolve_now(arg: Option<&str>) -> Result<u64> {
    match arg {
        Some(s) => parse_instant(s),
        None => Ok(chrono::Utc::now().timestamp().max(0) as u64),
    }
}

fn parse_instant(s: &str) -> Result<u64> {
    if let Ok(secs) = s.parse::<u64>() {
        return Ok(secs);
    }
    let parsed = chrono::DateTime::parse_from_rfc3339(s)
        .with_context(|| format!("invalid instant (expected Unix seconds or RFC 3339): {s}"))?;
    let secs = parsed.timestamp();
    ensure!(secs >= 0, "instant predates the Unix epoch: {s}");
    Ok(secs as u64)
}

fn fmt_instant(secs: u64) -> String {
    match chrono::DateTime::from_timestamp(secs as i64, 0) {
        Some(dt) => format!("{secs} ({})", dt.to_rfc3339()),
        None => secs.to_string(),
    }
}

fn phase_name(phase: LockPhase) -> &'static str {
    match phase {
        LockPhase::Cliff => "cliff",
        LockPhase::Decay => "decay",
        LockPhase::Expired => "expired",
    }
}

/// Render a smallest-unit amount as a whole-token decimal (18 decimals)
fn format_units(value: U256) -> String {
    const DECIMALS: usize = 18;
    let base = U256::from(10).pow(U256::from(DECIMALS));
    let whole = value / base;
    let frac = value % base;
    if frac.is_zero() {
        return whole.to_string();
    }
    let padded = format!("{:0>width$}", frac.to_string(), width = DECIMALS);
    format!("{whole}.{}", padded.trim_end_matches('0'))
}
