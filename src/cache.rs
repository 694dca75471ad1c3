/*!
A bounded cache mapping pattern text to compiled regexes.

Callers that repeatedly build regexes from runtime strings (say, a rule
file evaluated per request) would otherwise pay parse and compile cost on
every use. The cache is an explicit value with no global state; share one
behind whatever synchronization the application already has.
*/

use std::sync::Arc;

use crate::{
    parse::BuildError,
    regex::{Config, Regex},
};

/// Entries kept when the cache is built with [`RegexCache::new`].
const DEFAULT_CAPACITY: usize = 64;

/// The identity of a compiled regex: its pattern plus every configuration
/// option. The same pattern under different flags compiles to a different
/// program, so it gets its own entry.
#[derive(Clone, Debug, Eq, PartialEq)]
struct Key {
    pattern: String,
    case_insensitive: bool,
    multi_line: bool,
    dot_matches_new_line: bool,
    backtrack_limit: usize,
}

impl Key {
    fn new(pattern: &str, config: &Config) -> Key {
        Key {
            pattern: pattern.to_string(),
            case_insensitive: config.get_case_insensitive(),
            multi_line: config.get_multi_line(),
            dot_matches_new_line: config.get_dot_matches_new_line(),
            backtrack_limit: config.get_backtrack_limit(),
        }
    }
}

/// A least-recently-used cache of compiled regexes.
///
/// [`RegexCache::get_or_compile`] returns an [`Arc<Regex>`], so an entry
/// evicted while still in use by a caller stays alive until that caller
/// drops it.
///
/// # Example
///
/// ```
/// use regex_backtrack::{Config, RegexCache};
///
/// let mut cache = RegexCache::new();
/// let re = cache.get_or_compile(r"\d+", Config::new())?;
/// let again = cache.get_or_compile(r"\d+", Config::new())?;
/// // The second lookup is a hit, not a recompile.
/// assert!(std::sync::Arc::ptr_eq(&re, &again));
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Clone, Debug)]
pub struct RegexCache {
    capacity: usize,
    /// In use order: least recently used first. Linear scans are fine at
    /// the capacities this cache is meant for.
    entries: Vec<(Key, Arc<Regex>)>,
}

impl RegexCache {
    /// Create a cache with the default capacity.
    pub fn new() -> RegexCache {
        RegexCache::with_capacity(DEFAULT_CAPACITY)
    }

    /// Create a cache that holds at most `capacity` compiled regexes.
    ///
    /// # Panics
    ///
    /// This panics when `capacity` is zero.
    pub fn with_capacity(capacity: usize) -> RegexCache {
        assert!(capacity > 0, "regex cache capacity must be non-zero");
        RegexCache { capacity, entries: Vec::with_capacity(capacity) }
    }

    /// Returns the number of compiled regexes currently cached.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true when the cache holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Return the compiled regex for the given pattern and configuration,
    /// compiling and inserting it on a miss. When the cache is full, the
    /// least recently used entry is evicted first.
    ///
    /// Patterns that fail to build are not cached; every call with an
    /// invalid pattern reports the error again.
    pub fn get_or_compile(
        &mut self,
        pattern: &str,
        config: Config,
    ) -> Result<Arc<Regex>, BuildError> {
        let key = Key::new(pattern, &config);
        if let Some(i) = self.entries.iter().position(|(k, _)| *k == key) {
            let entry = self.entries.remove(i);
            let re = Arc::clone(&entry.1);
            self.entries.push(entry);
            return Ok(re);
        }
        debug!("regex cache miss for {:?}", pattern);
        let re = Arc::new(
            Regex::builder().configure(config).build(pattern)?,
        );
        if self.entries.len() == self.capacity {
            self.entries.remove(0);
        }
        self.entries.push((key, Arc::clone(&re)));
        Ok(re)
    }
}

impl Default for RegexCache {
    fn default() -> RegexCache {
        RegexCache::new()
    }
}
