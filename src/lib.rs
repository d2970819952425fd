// veledger - vesting-ledger reconciliation for ve-token governance
// Pure lock accounting plus a cached, rate-limited explorer query service

pub mod explorer;
pub mod ledger;
