//! Hot-key detection with an integrated local cache.
//!
//! A [`HeavyKeeper`] sketch estimates the k most frequent keys in a
//! high-throughput stream under sub-linear memory, and a rule-governed
//! [`TtlCache`] serves values for those keys locally. [`HotKeyCache`] ties
//! the two together behind one handle: it routes increments to the sketch,
//! reconciles top-k expulsions with cache deletions, and applies the
//! whitelist/blacklist/auto-cache admission policy.
//!
//! ```
//! use std::time::Duration;
//!
//! use hotkey_cache::{Config, HotKeyCache};
//!
//! let detector = HotKeyCache::new(&Config {
//!     hot_key_count: 100,
//!     local_cache_cap: 100,
//!     auto_cache: true,
//!     ttl: Duration::from_millis(500),
//!     ..Config::default()
//! })?;
//!
//! if detector.add_with_value("user:42", "payload".to_owned(), 1) {
//!     // "user:42" is currently one of the 100 hottest keys.
//! }
//! let cached = detector.get("user:42");
//! # assert!(cached.is_some());
//! # Ok::<(), hotkey_cache::Error>(())
//! ```

mod cache;
mod error;
mod heap;
mod hotkey;
mod rule;
mod topk;
mod util;

pub use cache::{Clock, TtlCache};
pub use error::{Error, Result};
pub use hotkey::{Config, HotKeyCache};
pub use rule::RuleConfig;
pub use topk::{HeavyKeeper, Item, TopK};
