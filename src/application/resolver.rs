//! Tiered configuration resolution.
//!
//! ## Fetch order
//!
//! 1. **Fast cache**: the in-process (or shared) low-latency tier
//! 2. **Durable cache**: consulted only when durable reads are enabled
//! 3. **Source**: parse the configuration file
//!
//! The first candidate that passes [`Configuration::is_valid`] wins and the
//! remaining fetchers are never invoked. Cache repair depends on the winner:
//!
//! | Winner        | Writes                                   |
//! |---------------|------------------------------------------|
//! | fast cache    | none                                     |
//! | durable cache | fast cache                               |
//! | source        | durable cache (no expiry), then fast     |
//! | nobody        | delete both keys, return empty           |
//!
//! Resolution never fails. Fetch errors, misses, and invalid candidates are
//! all treated as "try the next fetcher".

use std::{fmt, sync::Arc, time::Instant};

use metrics::{counter, histogram};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::cache::{CacheError, CacheKeys, DurableCache, FastCache, Ttl};
use crate::domain::configuration::Configuration;
use crate::infra::source::{SourceError, SourceLocator, load_source};

const METRIC_FETCH_TOTAL: &str = "shortcodes_config_fetch_total";
const METRIC_PURGE_TOTAL: &str = "shortcodes_config_purge_total";
const METRIC_RESOLVE_MS: &str = "shortcodes_config_resolve_ms";

/// Identifies a fetch strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FetcherKind {
    FastCache,
    DurableCache,
    Source,
}

impl FetcherKind {
    pub fn as_str(self) -> &'static str {
        match self {
            FetcherKind::FastCache => "fast_cache",
            FetcherKind::DurableCache => "durable_cache",
            FetcherKind::Source => "source",
        }
    }
}

impl fmt::Display for FetcherKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a single fetcher produced no candidate.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("{fetcher} backend failed: {source}")]
    Cache {
        fetcher: FetcherKind,
        #[source]
        source: CacheError,
    },
    #[error(transparent)]
    Source(#[from] SourceError),
}

type FetchFn<'a> = Box<dyn Fn() -> Result<Option<Value>, FetchError> + 'a>;

/// A named, zero-argument fetch strategy.
pub struct Fetcher<'a> {
    kind: FetcherKind,
    fetch: FetchFn<'a>,
}

impl<'a> Fetcher<'a> {
    pub fn new<F>(kind: FetcherKind, fetch: F) -> Self
    where
        F: Fn() -> Result<Option<Value>, FetchError> + 'a,
    {
        Self {
            kind,
            fetch: Box::new(fetch),
        }
    }

    pub fn kind(&self) -> FetcherKind {
        self.kind
    }

    /// `Ok(None)` means the tier had nothing for the key.
    pub fn fetch(&self) -> Result<Option<Value>, FetchError> {
        (self.fetch)()
    }
}

impl fmt::Debug for Fetcher<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Fetcher").field("kind", &self.kind).finish()
    }
}

/// Outcome of a successful resolution, including which fetcher won.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    pub config: Configuration,
    pub winner: Option<FetcherKind>,
}

/// Resolves the shortcode configuration through the cache tiers.
///
/// Tiers are shared handles; the resolver owns neither. No locking is done
/// across concurrent resolvers: every write stores the same value derived from
/// the same file, so the last writer winning is harmless.
#[derive(Clone)]
pub struct ConfigResolver {
    fast: Arc<dyn FastCache>,
    durable: Option<Arc<dyn DurableCache>>,
    read_durable: bool,
    locator: SourceLocator,
    keys: CacheKeys,
}

impl ConfigResolver {
    pub fn new(fast: Arc<dyn FastCache>, locator: SourceLocator) -> Self {
        Self {
            fast,
            durable: None,
            read_durable: false,
            locator,
            keys: CacheKeys::default(),
        }
    }

    /// Attach a durable tier. It is written on source hits and purged on
    /// total misses; it is only read when `read` is true.
    pub fn with_durable(mut self, durable: Arc<dyn DurableCache>, read: bool) -> Self {
        self.durable = Some(durable);
        self.read_durable = read;
        self
    }

    pub fn with_keys(mut self, keys: CacheKeys) -> Self {
        self.keys = keys;
        self
    }

    pub fn keys(&self) -> &CacheKeys {
        &self.keys
    }

    pub fn locator(&self) -> &SourceLocator {
        &self.locator
    }

    /// The ordered fetch strategies for one resolution.
    pub fn fetchers(&self) -> Vec<Fetcher<'_>> {
        let mut fetchers = Vec::with_capacity(3);

        fetchers.push(Fetcher::new(FetcherKind::FastCache, move || {
            self.fast
                .get(&self.keys.fast)
                .map_err(|source| FetchError::Cache {
                    fetcher: FetcherKind::FastCache,
                    source,
                })
        }));

        if self.read_durable
            && let Some(durable) = self.durable.as_deref()
        {
            fetchers.push(Fetcher::new(FetcherKind::DurableCache, move || {
                durable
                    .get(&self.keys.durable)
                    .map_err(|source| FetchError::Cache {
                        fetcher: FetcherKind::DurableCache,
                        source,
                    })
            }));
        }

        fetchers.push(Fetcher::new(FetcherKind::Source, move || {
            let path = self.locator.config_path();
            load_source(&path).map(Some).map_err(FetchError::from)
        }));

        fetchers
    }

    /// Resolve the configuration. Always returns a value; an empty
    /// configuration signals that nothing valid was found.
    pub fn resolve(&self) -> Configuration {
        self.resolve_detailed().config
    }

    /// Like [`ConfigResolver::resolve`], also reporting the winning fetcher.
    pub fn resolve_detailed(&self) -> Resolution {
        let started_at = Instant::now();

        let resolution = match Self::first_valid(self.fetchers()) {
            Some((winner, config)) => {
                self.repair(winner, &config);
                info!(
                    target = "application::resolver",
                    op = "resolver::resolve",
                    result = "hit",
                    fetcher = %winner,
                    shortcodes = config.entries().count(),
                    "Resolved shortcode configuration"
                );
                Resolution {
                    config,
                    winner: Some(winner),
                }
            }
            None => {
                warn!(
                    target = "application::resolver",
                    op = "resolver::resolve",
                    result = "miss",
                    path = %self.locator.config_path().display(),
                    "No valid shortcode configuration found; purging caches"
                );
                self.purge_keys("total_miss");
                Resolution {
                    config: Configuration::empty(),
                    winner: None,
                }
            }
        };

        histogram!(METRIC_RESOLVE_MS).record(started_at.elapsed().as_secs_f64() * 1000.0);
        resolution
    }

    fn first_valid(fetchers: Vec<Fetcher<'_>>) -> Option<(FetcherKind, Configuration)> {
        for fetcher in fetchers {
            let kind = fetcher.kind();
            let outcome = match fetcher.fetch() {
                Ok(Some(candidate)) => match Configuration::try_from(candidate) {
                    Ok(config) => {
                        record_fetch(kind, "hit");
                        return Some((kind, config));
                    }
                    Err(err) => {
                        debug!(
                            target = "application::resolver",
                            op = "resolver::fetch",
                            fetcher = %kind,
                            result = "invalid",
                            error = %err,
                            "Discarding invalid configuration candidate"
                        );
                        "invalid"
                    }
                },
                Ok(None) => {
                    debug!(
                        target = "application::resolver",
                        op = "resolver::fetch",
                        fetcher = %kind,
                        result = "miss",
                        "Fetcher had no configuration"
                    );
                    "miss"
                }
                Err(err) => {
                    debug!(
                        target = "application::resolver",
                        op = "resolver::fetch",
                        fetcher = %kind,
                        result = "error",
                        error = %err,
                        "Fetcher failed; trying next"
                    );
                    "error"
                }
            };
            record_fetch(kind, outcome);
        }
        None
    }

    fn repair(&self, winner: FetcherKind, config: &Configuration) {
        match winner {
            FetcherKind::Source => {
                if let Some(durable) = self.durable.as_deref()
                    && let Err(err) = durable.set(&self.keys.durable, config.as_value(), Ttl::Never)
                {
                    warn_write_failed(FetcherKind::DurableCache, &err);
                }
                self.warm_fast(config);
            }
            FetcherKind::DurableCache => self.warm_fast(config),
            FetcherKind::FastCache => {}
        }
    }

    fn warm_fast(&self, config: &Configuration) {
        if let Err(err) = self.fast.set(&self.keys.fast, config.as_value()) {
            warn_write_failed(FetcherKind::FastCache, &err);
        }
    }

    /// Delete both well-known keys. Absent keys are not an error.
    pub fn purge(&self) {
        self.purge_keys("explicit");
    }

    fn purge_keys(&self, reason: &'static str) {
        if let Err(err) = self.fast.delete(&self.keys.fast) {
            warn_delete_failed(FetcherKind::FastCache, &err);
        }
        if let Some(durable) = self.durable.as_deref()
            && let Err(err) = durable.delete(&self.keys.durable)
        {
            warn_delete_failed(FetcherKind::DurableCache, &err);
        }
        counter!(METRIC_PURGE_TOTAL, "reason" => reason).increment(1);
    }
}

impl fmt::Debug for ConfigResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConfigResolver")
            .field("durable", &self.durable.is_some())
            .field("read_durable", &self.read_durable)
            .field("locator", &self.locator)
            .field("keys", &self.keys)
            .finish()
    }
}

fn record_fetch(kind: FetcherKind, outcome: &'static str) {
    counter!(METRIC_FETCH_TOTAL, "fetcher" => kind.as_str(), "outcome" => outcome).increment(1);
}

fn warn_write_failed(tier: FetcherKind, err: &CacheError) {
    warn!(
        target = "application::resolver",
        op = "resolver::repair",
        tier = %tier,
        result = "write_failed",
        error = %err,
        "Failed to populate cache tier"
    );
}

fn warn_delete_failed(tier: FetcherKind, err: &CacheError) {
    warn!(
        target = "application::resolver",
        op = "resolver::purge",
        tier = %tier,
        result = "delete_failed",
        error = %err,
        "Failed to purge cache tier"
    );
}
