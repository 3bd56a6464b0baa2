//! A chained hash table whose buckets are [`RankedTree`]s.
//!
//! Keys are hashed with `key mod buckets`. Once the table holds as many keys as it has buckets it
//! grows to `buckets * growth_multiple - 1` buckets and every entry moves to its new bucket.
//!
//! # Examples
//!
//! ```
//! use ranked_avl::table::ChainedTable;
//!
//! let mut table = ChainedTable::new();
//! for key in 0..10 {
//!     table.insert(key, key * 10)?;
//! }
//!
//! assert_eq!(table.get(7), Some(&70));
//! assert!(table.bucket_count() > 3);
//! # Ok::<(), ranked_avl::Error>(())
//! ```

use tracing::debug;

use crate::error::{Error, Result};
use crate::ranked::RankedTree;

/// Sizing knobs for a [`ChainedTable`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableConfig {
    /// Number of buckets in a new table. Must be at least 1.
    pub initial_buckets: usize,
    /// On growth the bucket count becomes `buckets * growth_multiple - 1`. Must be at least 2, and
    /// the first growth must end up with more than `initial_buckets` buckets.
    pub growth_multiple: usize,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            initial_buckets: 3,
            growth_multiple: 2,
        }
    }
}

impl TableConfig {
    fn validate(&self) -> Result<()> {
        if self.initial_buckets == 0 {
            return Err(Error::InvalidConfig("initial_buckets must be at least 1"));
        }
        if self.growth_multiple < 2 {
            return Err(Error::InvalidConfig("growth_multiple must be at least 2"));
        }
        // An overflowing first growth is reported by `grow` instead.
        let first_growth = self
            .initial_buckets
            .checked_mul(self.growth_multiple)
            .map(|n| n - 1);
        if first_growth.map_or(false, |n| n <= self.initial_buckets) {
            return Err(Error::InvalidConfig(
                "growth must add buckets (initial_buckets * growth_multiple - 1 too small)",
            ));
        }
        Ok(())
    }
}

type Bucket<V> = RankedTree<i64, V, i64>;

/// A hash table from `i64` keys to values, chaining collisions into balanced trees.
#[derive(Debug, Clone)]
pub struct ChainedTable<V> {
    buckets: Vec<Bucket<V>>,
    len: usize,
    config: TableConfig,
}

impl<V> Default for ChainedTable<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> ChainedTable<V> {
    /// An empty table using [`TableConfig::default`].
    pub fn new() -> Self {
        let config = TableConfig::default();
        Self {
            buckets: Self::empty_buckets(config.initial_buckets),
            len: 0,
            config,
        }
    }

    /// An empty table with the given sizing.
    pub fn with_config(config: TableConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            buckets: Self::empty_buckets(config.initial_buckets),
            len: 0,
            config,
        })
    }

    fn empty_buckets(count: usize) -> Vec<Bucket<V>> {
        std::iter::repeat_with(RankedTree::new).take(count).collect()
    }

    /// The number of keys in the table.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the table has no keys.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The current number of buckets.
    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    fn index(key: i64, buckets: usize) -> usize {
        // `rem_euclid` is never negative and always below `buckets`.
        key.rem_euclid(buckets as i64) as usize
    }

    fn bucket(&self, key: i64) -> &Bucket<V> {
        &self.buckets[Self::index(key, self.buckets.len())]
    }

    fn bucket_mut(&mut self, key: i64) -> &mut Bucket<V> {
        let index = Self::index(key, self.buckets.len());
        &mut self.buckets[index]
    }

    /// Whether `key` is in the table.
    pub fn contains_key(&self, key: i64) -> bool {
        self.bucket(key).contains_key(&key)
    }

    /// The value stored for `key`, or `None` if `key` is absent.
    pub fn get(&self, key: i64) -> Option<&V> {
        self.bucket(key).get(&key)
    }

    /// A mutable reference to the value stored for `key`, or `None` if `key` is absent.
    pub fn get_mut(&mut self, key: i64) -> Option<&mut V> {
        self.bucket_mut(key).get_mut(&key)
    }

    /// Inserts `key` unless it is already present. Returns whether it was added.
    ///
    /// When the table fills up it grows. If the larger bucket array can't be allocated, or its size
    /// doesn't fit in a `usize`, the new key stays stored in the old buckets and the error is
    /// returned. The next insert tries to grow again.
    pub fn insert(&mut self, key: i64, value: V) -> Result<bool> {
        if !self.bucket_mut(key).insert(key, value) {
            return Ok(false);
        }
        self.len += 1;

        if self.len >= self.buckets.len() {
            self.grow()?;
        }
        Ok(true)
    }

    /// Removes `key` and returns its value, or `None` if it wasn't present.
    pub fn remove(&mut self, key: i64) -> Option<V> {
        let removed = self.bucket_mut(key).remove(&key);
        if removed.is_some() {
            self.len -= 1;
        }
        removed
    }

    /// Moves every entry into a larger bucket array. The new array is reserved up front so a
    /// failure leaves the current buckets in place.
    fn grow(&mut self) -> Result<()> {
        let old_count = self.buckets.len();
        let new_count = old_count
            .checked_mul(self.config.growth_multiple)
            .ok_or(Error::CapacityOverflow)?
            - 1;

        let mut buckets = Vec::new();
        buckets.try_reserve_exact(new_count)?;
        buckets.extend(std::iter::repeat_with(RankedTree::new).take(new_count));

        debug!(old_count, new_count, len = self.len, "growing table");
        for (key, value) in std::mem::replace(&mut self.buckets, buckets)
            .into_iter()
            .flatten()
        {
            self.bucket_mut(key).insert(key, value);
        }
        Ok(())
    }
}
