//! The coordinator: admission policy across the sketch, the cache, and the
//! whitelist/blacklist rules.

use std::time::Duration;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::cache::TtlCache;
use crate::error::Result;
use crate::rule::{self, CacheRule, RuleConfig};
use crate::topk::{HeavyKeeper, Item, TopK};

/// Matrix depth shared by every sketch the coordinator builds.
const SKETCH_DEPTH: usize = 4;
/// Probabilistic demotion factor on fingerprint collision.
const SKETCH_DECAY: f64 = 0.925;
/// Cells per row, scaled by `ln(k)`.
const SKETCH_WIDTH_BASE: usize = 1024;

/// Coordinator configuration.
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// Sketch top-k target; 0 disables hot-key detection entirely.
    pub hot_key_count: usize,
    /// Cache capacity in entries.
    pub local_cache_cap: usize,
    /// Cache a key automatically when it is admitted to the top-k, unless a
    /// blacklist rule matches it.
    pub auto_cache: bool,
    /// Default TTL, applied to auto-cached entries and to rules without
    /// their own. Must be positive whenever the cache is enabled.
    pub ttl: Duration,
    /// Estimated count a key needs before it reports as hot.
    pub min_count: u64,
    /// Keys matching these rules are always cached, with the rule's TTL.
    pub whitelist: Vec<RuleConfig>,
    /// Keys matching these rules are never cached by the auto-cache path.
    pub blacklist: Vec<RuleConfig>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            hot_key_count: 0,
            local_cache_cap: 0,
            auto_cache: false,
            ttl: Duration::ZERO,
            min_count: 0,
            whitelist: Vec::new(),
            blacklist: Vec::new(),
        }
    }
}

#[derive(Debug)]
struct Inner<V> {
    topk: Option<HeavyKeeper>,
    cache: Option<TtlCache<V>>,
}

/// Hot-key detector with an integrated rule-governed local cache.
///
/// One exclusive mutex guards the sketch and the cache together, so sketch
/// expulsion and the matching cache deletion land in the same critical
/// section. The compiled rule lists are immutable and read without locking.
/// Values are opaque: the coordinator stores and returns them uninspected.
#[derive(Debug)]
pub struct HotKeyCache<V> {
    inner: Mutex<Inner<V>>,
    auto_cache: bool,
    default_ttl: Duration,
    whitelist: Vec<CacheRule>,
    blacklist: Vec<CacheRule>,
}

impl<V> HotKeyCache<V> {
    /// Builds a coordinator from `config`.
    ///
    /// The sketch exists when `hot_key_count` is nonzero; the cache exists
    /// when `auto_cache` is set or the whitelist is non-empty. Both rule
    /// lists compile here, and an unknown mode or an uncompilable pattern
    /// fails construction.
    pub fn new(config: &Config) -> Result<Self> {
        let whitelist = rule::compile_rules(&config.whitelist, config.ttl)?;
        let blacklist = rule::compile_rules(&config.blacklist, config.ttl)?;
        let topk = (config.hot_key_count > 0).then(|| {
            let factor = ((config.hot_key_count as f64).ln() as usize).max(1);
            HeavyKeeper::new(
                config.hot_key_count,
                SKETCH_WIDTH_BASE * factor,
                SKETCH_DEPTH,
                SKETCH_DECAY,
                config.min_count,
            )
        });
        let cache = (config.auto_cache || !whitelist.is_empty())
            .then(|| TtlCache::new(config.local_cache_cap));
        Ok(Self {
            inner: Mutex::new(Inner { topk, cache }),
            auto_cache: config.auto_cache,
            default_ttl: config.ttl,
            whitelist,
            blacklist,
        })
    }

    /// Records `increment` observations of `key` in the sketch.
    ///
    /// Returns whether `key` is hot; always false when the sketch is
    /// disabled.
    pub fn add(&self, key: &str, increment: u64) -> bool {
        let mut inner = self.inner.lock();
        let Some(topk) = inner.topk.as_mut() else {
            return false;
        };
        let (_, hot) = topk.add(key, increment);
        hot
    }

    /// Records `key` and, where policy admits it, caches `value`.
    ///
    /// A key expelled from the top-k by this admission is dropped from the
    /// cache before the call returns. Auto-cache stores newly hot keys
    /// unless the blacklist matches; otherwise a whitelist match stores the
    /// value with the rule's TTL, and that path does not re-check the
    /// blacklist. Returns whether `key` is hot.
    pub fn add_with_value(&self, key: &str, value: V, increment: u64) -> bool {
        let mut inner = self.inner.lock();
        if inner.topk.is_none() && inner.cache.is_none() {
            return false;
        }
        let mut added = false;
        if let Some(topk) = inner.topk.as_mut() {
            let (expelled, hot) = topk.add(key, increment);
            added = hot;
            if let Some(expelled) = expelled {
                debug!(key = %expelled, "expelled from top-k");
                if let Some(cache) = inner.cache.as_mut() {
                    cache.remove(&expelled);
                }
            }
            if self.auto_cache && added {
                if !self.in_blacklist(key) {
                    debug!(%key, "auto-caching hot key");
                    if let Some(cache) = inner.cache.as_mut() {
                        cache.set(key, value, self.default_ttl);
                    }
                }
                return added;
            }
        }
        if let Some(rule) = rule::find_match(&self.whitelist, key) {
            if let Some(cache) = inner.cache.as_mut() {
                cache.set(key, value, rule.ttl());
            }
        }
        added
    }

    /// Drops `key` from the cache.
    pub fn del(&self, key: &str) {
        let mut inner = self.inner.lock();
        if let Some(cache) = inner.cache.as_mut() {
            cache.remove(key);
        }
    }

    /// Looks up `key`, sweeping expired entries first.
    ///
    /// Always misses when the cache does not exist.
    pub fn get(&self, key: &str) -> Option<V>
    where
        V: Clone,
    {
        let mut inner = self.inner.lock();
        let cache = inner.cache.as_mut()?;
        cache.remove_expired();
        cache.get(key).cloned()
    }

    /// Halves every sketch count, demoting stale heavy hitters.
    pub fn fading(&self) {
        let mut inner = self.inner.lock();
        if let Some(topk) = inner.topk.as_mut() {
            topk.fading();
        }
    }

    /// Snapshot of the current top-k, sorted by count descending.
    pub fn list(&self) -> Vec<Item> {
        let inner = self.inner.lock();
        match inner.topk.as_ref() {
            Some(topk) => topk.list(),
            None => Vec::new(),
        }
    }

    fn in_blacklist(&self, key: &str) -> bool {
        rule::find_match(&self.blacklist, key).is_some()
    }
}
