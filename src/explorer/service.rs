// Explorer service - one owned value tying cache, limiter and providers
// Query pipeline: cache -> limiter -> primary -> fallback -> normalize -> cache

use super::cache::{Clock, ResponseCache, SystemClock};
use super::limiter::SlidingWindowLimiter;
use super::provider::{
    normalize, ExplorerProvider, NormalizeError, ProviderKind, TokenTransfer,
};
use alloy_primitives::Address;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

// ============================================================================
// EXPLORER CONFIG
// ============================================================================

/// Configuration for the explorer service
#[derive(Clone, Debug)]
pub struct ExplorerConfig {
    /// Seconds a cached response stays fresh
    pub cache_ttl_secs: u64,
    /// Length of the rate-limit window in seconds
    pub window_secs: u64,
    /// Upstream calls admitted per window
    pub max_requests_per_window: usize,
}

impl ExplorerConfig {
    /// Create a new config with builder pattern
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the cache TTL in seconds
    pub fn with_cache_ttl_secs(mut self, secs: u64) -> Self {
        self.cache_ttl_secs = secs;
        self
    }

    /// Set the rate-limit window length in seconds
    pub fn with_window_secs(mut self, secs: u64) -> Self {
        self.window_secs = secs;
        self
    }

    /// Set the per-window request budget
    pub fn with_max_requests_per_window(mut self, max: usize) -> Self {
        self.max_requests_per_window = max;
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ExplorerError> {
        if self.cache_ttl_secs == 0 {
            return Err(ExplorerError::InvalidConfig(
                "cache_ttl_secs must be > 0".to_string(),
            ));
        }
        if self.window_secs == 0 {
            return Err(ExplorerError::InvalidConfig(
                "window_secs must be > 0".to_string(),
            ));
        }
        if self.max_requests_per_window == 0 {
            return Err(ExplorerError::InvalidConfig(
                "max_requests_per_window must be > 0".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for ExplorerConfig {
    fn default() -> Self {
        Self {
            cache_ttl_secs: 60,
            window_secs: 10,
            max_requests_per_window: 5,
        }
    }
}

// ============================================================================
// EXPLORER STATS
// ============================================================================

/// Statistics about service traffic
#[derive(Clone, Debug, Default)]
pub struct ExplorerStats {
    pub cache_hits: u64,
    pub cache_misses: u64,
    pub rate_limited: u64,
    pub provider_errors: u64,
    pub fallback_fetches: u64,
}

// ============================================================================
// EXPLORER ERROR
// ============================================================================

/// Errors surfaced by the explorer service
#[derive(Error, Debug)]
pub enum ExplorerError {
    #[error("Rate limited, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error("Provider {kind} failed: {message}")]
    Provider { kind: ProviderKind, message: String },

    #[error("Both providers failed: primary: {primary}; fallback: {fallback}")]
    BothProvidersFailed { primary: String, fallback: String },

    #[error("Malformed provider payload: {0}")]
    Normalize(#[from] NormalizeError),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

// ============================================================================
// EXPLORER SERVICE
// ============================================================================

/// Long-lived explorer query service.
///
/// Owns its cache and rate limiter; nothing here is global. The limiter is
/// charged only for real upstream calls, never for cache hits, and a refusal
/// is reported to the caller instead of slept through.
pub struct ExplorerService {
    config: ExplorerConfig,
    cache: ResponseCache<Vec<TokenTransfer>>,
    limiter: SlidingWindowLimiter,
    primary: Box<dyn ExplorerProvider>,
    fallback: Option<Box<dyn ExplorerProvider>>,
    stats: ExplorerStats,
}

impl ExplorerService {
    /// Create a service on the system clock
    pub fn new(
        config: ExplorerConfig,
        primary: Box<dyn ExplorerProvider>,
    ) -> Result<Self, ExplorerError> {
        Self::with_clock(config, primary, Arc::new(SystemClock))
    }

    /// Create a service on an injected clock
    pub fn with_clock(
        config: ExplorerConfig,
        primary: Box<dyn ExplorerProvider>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, ExplorerError> {
        config.validate()?;
        let cache = ResponseCache::new(config.cache_ttl_secs, clock.clone());
        let limiter = SlidingWindowLimiter::new(
            config.window_secs,
            config.max_requests_per_window,
            clock,
        );
        Ok(Self {
            config,
            cache,
            limiter,
            primary,
            fallback: None,
            stats: ExplorerStats::default(),
        })
    }

    /// Set a secondary provider used when the primary fails
    pub fn with_fallback(mut self, provider: Box<dyn ExplorerProvider>) -> Self {
        self.fallback = Some(provider);
        self
    }

    /// Check if a fallback provider is configured
    pub fn has_fallback(&self) -> bool {
        self.fallback.is_some()
    }

    /// Get the configuration
    pub fn config(&self) -> &ExplorerConfig {
        &self.config
    }

    /// Get traffic statistics
    pub fn stats(&self) -> &ExplorerStats {
        &self.stats
    }

    /// Sweep expired cache entries, returning how many were evicted
    pub fn purge_expired(&mut self) -> usize {
        self.cache.purge_expired()
    }

    /// Canonical token transfers for an account.
    ///
    /// Serves from cache when fresh; otherwise charges the limiter, fetches
    /// from the primary provider (falling back to the secondary on failure),
    /// normalizes the payload and caches the rows.
    pub async fn token_transfers(
        &mut self,
        account: Address,
    ) -> Result<Vec<TokenTransfer>, ExplorerError> {
        let key = cache_key(account);

        if let Some(rows) = self.cache.get(&key) {
            self.stats.cache_hits += 1;
            debug!(account = %account, rows = rows.len(), "explorer cache hit");
            return Ok(rows.clone());
        }
        self.stats.cache_misses += 1;

        if let Err(retry_after_secs) = self.limiter.try_acquire() {
            self.stats.rate_limited += 1;
            debug!(account = %account, retry_after_secs, "explorer query rate limited");
            return Err(ExplorerError::RateLimited { retry_after_secs });
        }

        let payload = match self.primary.token_transfers(account).await {
            Ok(payload) => payload,
            Err(primary_err) => {
                self.stats.provider_errors += 1;
                warn!(
                    provider = %self.primary.kind(),
                    error = %primary_err,
                    "primary provider failed"
                );
                let Some(fallback) = &self.fallback else {
                    return Err(ExplorerError::Provider {
                        kind: self.primary.kind(),
                        message: primary_err,
                    });
                };
                self.stats.fallback_fetches += 1;
                info!(provider = %fallback.kind(), "fetching from fallback provider");
                match fallback.token_transfers(account).await {
                    Ok(payload) => payload,
                    Err(fallback_err) => {
                        self.stats.provider_errors += 1;
                        return Err(ExplorerError::BothProvidersFailed {
                            primary: primary_err,
                            fallback: fallback_err,
                        });
                    }
                }
            }
        };

        let rows = normalize(&payload)?;
        debug!(
            account = %account,
            rows = rows.len(),
            source = %payload.kind(),
            "explorer fetch cached"
        );
        self.cache.insert(key, rows.clone());
        Ok(rows)
    }
}

fn cache_key(account: Address) -> String {
    format!("token-transfers:{account}")
}
