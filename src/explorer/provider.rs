// Explorer providers - upstream token-transfer sources and their shapes
// Two known upstream APIs return structurally different JSON; everything
// downstream sees only the canonical TokenTransfer record

use alloy_primitives::{Address, U256};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use thiserror::Error;

// ============================================================================
// PROVIDER KIND
// ============================================================================

/// Which upstream explorer API a payload came from
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProviderKind {
    /// Etherscan-compatible API (flat string fields, decimal timestamps)
    Celoscan,
    /// Blockscout native API (nested counterparties, RFC 3339 timestamps)
    Blockscout,
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderKind::Celoscan => write!(f, "celoscan"),
            ProviderKind::Blockscout => write!(f, "blockscout"),
        }
    }
}

// ============================================================================
// TRANSACTION HASH
// ============================================================================

/// 32-byte transaction hash, displayed as 0x-prefixed lowercase hex
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct TxHash([u8; 32]);

impl TxHash {
    /// Wrap raw hash bytes
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Get the raw hash bytes
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Parse from a hex string, with or without a 0x prefix
    pub fn parse(s: &str) -> Result<Self, NormalizeError> {
        let stripped = s.strip_prefix("0x").unwrap_or(s);
        let bytes = hex::decode(stripped)
            .map_err(|_| NormalizeError::InvalidTxHash(s.to_string()))?;
        let bytes: [u8; 32] = bytes
            .try_into()
            .map_err(|_| NormalizeError::InvalidTxHash(s.to_string()))?;
        Ok(Self(bytes))
    }
}

impl fmt::Display for TxHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl fmt::Debug for TxHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TxHash({})", self)
    }
}

impl FromStr for TxHash {
    type Err = NormalizeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for TxHash {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for TxHash {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).map_err(serde::de::Error::custom)
    }
}

// ============================================================================
// CANONICAL TRANSFER
// ============================================================================

/// One token transfer in canonical form, independent of which provider
/// shape it arrived in
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenTransfer {
    tx_hash: TxHash,
    from: Address,
    to: Address,
    value: U256,
    timestamp: u64,
}

impl TokenTransfer {
    /// Create a canonical transfer record
    pub fn new(tx_hash: TxHash, from: Address, to: Address, value: U256, timestamp: u64) -> Self {
        Self {
            tx_hash,
            from,
            to,
            value,
            timestamp,
        }
    }

    /// Get the transaction hash
    pub fn tx_hash(&self) -> &TxHash {
        &self.tx_hash
    }

    /// Get the sending address
    pub fn from(&self) -> Address {
        self.from
    }

    /// Get the receiving address
    pub fn to(&self) -> Address {
        self.to
    }

    /// Get the transferred value in smallest token units
    pub fn value(&self) -> U256 {
        self.value
    }

    /// Get the transfer timestamp in Unix seconds
    pub fn timestamp(&self) -> u64 {
        self.timestamp
    }
}

// ============================================================================
// PROVIDER SHAPES
// ============================================================================

/// Etherscan-style response envelope: every field is a flat string
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CeloscanEnvelope {
    pub status: String,
    pub message: String,
    #[serde(default)]
    pub result: Vec<CeloscanTokenTx>,
}

/// One row of an Etherscan-style token-transfer listing
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CeloscanTokenTx {
    pub hash: String,
    pub from: String,
    pub to: String,
    /// Decimal string, already in smallest token units
    pub value: String,
    /// Decimal string of Unix seconds
    #[serde(rename = "timeStamp")]
    pub time_stamp: String,
}

/// Blockscout native items page
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BlockscoutPage {
    pub items: Vec<BlockscoutTokenTransfer>,
}

/// One Blockscout token-transfer item: counterparties nested, value under
/// `total`, timestamp as RFC 3339
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BlockscoutTokenTransfer {
    pub tx_hash: String,
    pub from: BlockscoutAddressParam,
    pub to: BlockscoutAddressParam,
    pub total: BlockscoutTotal,
    pub timestamp: String,
}

/// Nested counterparty wrapper
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BlockscoutAddressParam {
    pub hash: String,
}

/// Value wrapper. `value` is in smallest token units; `decimals` is display
/// metadata and is not applied here.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BlockscoutTotal {
    pub value: String,
    pub decimals: String,
}

/// Payload returned by a provider, tagged by which shape it carries.
///
/// Serde deserialization is untagged: the two shapes are structurally
/// disjoint, so raw JSON resolves to the right variant on its own.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ProviderPayload {
    Celoscan(CeloscanEnvelope),
    Blockscout(BlockscoutPage),
}

impl ProviderPayload {
    /// Which shape this payload carries
    pub fn kind(&self) -> ProviderKind {
        match self {
            ProviderPayload::Celoscan(_) => ProviderKind::Celoscan,
            ProviderPayload::Blockscout(_) => ProviderKind::Blockscout,
        }
    }
}

// ============================================================================
// NORMALIZATION
// ============================================================================

/// Errors raised while converting a provider payload to canonical rows
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NormalizeError {
    #[error("Invalid transaction hash: {0}")]
    InvalidTxHash(String),

    #[error("Invalid address in {field}: {value}")]
    InvalidAddress { field: &'static str, value: String },

    #[error("Invalid token value: {0}")]
    InvalidValue(String),

    #[error("Invalid timestamp: {0}")]
    InvalidTimestamp(String),

    #[error("Provider rejected the query: {0}")]
    ProviderRejected(String),
}

/// Convert either provider shape into canonical transfer rows.
///
/// This is the only place provider-specific field layouts are interpreted;
/// nothing downstream of it sees raw payloads.
pub fn normalize(payload: &ProviderPayload) -> Result<Vec<TokenTransfer>, NormalizeError> {
    match payload {
        ProviderPayload::Celoscan(envelope) => normalize_celoscan(envelope),
        ProviderPayload::Blockscout(page) => normalize_blockscout(page),
    }
}

fn normalize_celoscan(envelope: &CeloscanEnvelope) -> Result<Vec<TokenTransfer>, NormalizeError> {
    if envelope.status != "1" {
        // An empty listing is a successful query, not a provider error
        if envelope.message == "No transactions found" {
            return Ok(Vec::new());
        }
        return Err(NormalizeError::ProviderRejected(envelope.message.clone()));
    }

    envelope
        .result
        .iter()
        .map(|row| {
            let tx_hash = TxHash::parse(&row.hash)?;
            let from = parse_address("from", &row.from)?;
            let to = parse_address("to", &row.to)?;
            let value = parse_value(&row.value)?;
            let timestamp = row
                .time_stamp
                .parse::<u64>()
                .map_err(|_| NormalizeError::InvalidTimestamp(row.time_stamp.clone()))?;
            Ok(TokenTransfer::new(tx_hash, from, to, value, timestamp))
        })
        .collect()
}

fn normalize_blockscout(page: &BlockscoutPage) -> Result<Vec<TokenTransfer>, NormalizeError> {
    page.items
        .iter()
        .map(|item| {
            let tx_hash = TxHash::parse(&item.tx_hash)?;
            let from = parse_address("from.hash", &item.from.hash)?;
            let to = parse_address("to.hash", &item.to.hash)?;
            let value = parse_value(&item.total.value)?;
            let timestamp = parse_rfc3339(&item.timestamp)?;
            Ok(TokenTransfer::new(tx_hash, from, to, value, timestamp))
        })
        .collect()
}

fn parse_address(field: &'static str, s: &str) -> Result<Address, NormalizeError> {
    Address::from_str(s).map_err(|_| NormalizeError::InvalidAddress {
        field,
        value: s.to_string(),
    })
}

fn parse_value(s: &str) -> Result<U256, NormalizeError> {
    U256::from_str_radix(s, 10).map_err(|_| NormalizeError::InvalidValue(s.to_string()))
}

fn parse_rfc3339(s: &str) -> Result<u64, NormalizeError> {
    let parsed = chrono::DateTime::parse_from_rfc3339(s)
        .map_err(|_| NormalizeError::InvalidTimestamp(s.to_string()))?;
    let secs = parsed.timestamp();
    if secs < 0 {
        return Err(NormalizeError::InvalidTimestamp(s.to_string()));
    }
    Ok(secs as u64)
}

// ============================================================================
// PROVIDER TRAIT
// ============================================================================

/// Trait for upstream explorer APIs
#[async_trait]
pub trait ExplorerProvider: Send + Sync {
    /// Which shape this provider responds with
    fn kind(&self) -> ProviderKind;

    /// Fetch the raw token-transfer payload for an account
    /// Returns the provider-shaped payload on success, error message on failure
    async fn token_transfers(&self, account: Address) -> Result<ProviderPayload, String>;
}

// ============================================================================
// MOCK PROVIDER
// ============================================================================

/// Mock implementation of ExplorerProvider for testing
pub struct MockProvider {
    kind: ProviderKind,
    payload: Option<ProviderPayload>,
    failure_message: Option<String>,
    delay_ms: u64,
    failures_before_success: AtomicUsize,
    call_count: AtomicUsize,
}

impl MockProvider {
    /// Create a new mock provider (defaults to failure)
    pub fn new(kind: ProviderKind) -> Self {
        Self {
            kind,
            payload: None,
            failure_message: None,
            delay_ms: 0,
            failures_before_success: AtomicUsize::new(0),
            call_count: AtomicUsize::new(0),
        }
    }

    /// Configure to succeed with the given payload
    pub fn with_payload(mut self, payload: ProviderPayload) -> Self {
        self.payload = Some(payload);
        self
    }

    /// Configure to always fail with a message
    pub fn with_failure(mut self, message: String) -> Self {
        self.payload = None;
        self.failure_message = Some(message);
        self
    }

    /// Add a delay before responding
    pub fn with_delay_ms(mut self, ms: u64) -> Self {
        self.delay_ms = ms;
        self
    }

    /// Fail N times, then serve the configured payload
    pub fn with_failures_then_success(mut self, failures: usize) -> Self {
        self.failures_before_success = AtomicUsize::new(failures);
        self
    }

    /// How many times token_transfers has been called
    pub fn calls(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ExplorerProvider for MockProvider {
    fn kind(&self) -> ProviderKind {
        self.kind
    }

    async fn token_transfers(&self, _account: Address) -> Result<ProviderPayload, String> {
        // Apply delay if configured
        if self.delay_ms > 0 {
            tokio::time::sleep(Duration::from_millis(self.delay_ms)).await;
        }

        let call_num = self.call_count.fetch_add(1, Ordering::SeqCst);
        let failures_remaining = self.failures_before_success.load(Ordering::SeqCst);

        // Check if we should fail first
        if failures_remaining > 0 && call_num < failures_remaining {
            return Err(self
                .failure_message
                .clone()
                .unwrap_or_else(|| "Mock provider failure".to_string()));
        }

        match &self.payload {
            Some(payload) => Ok(payload.clone()),
            None => Err(self
                .failure_message
                .clone()
                .unwrap_or_else(|| "Mock provider failure".to_string())),
        }
    }
}
