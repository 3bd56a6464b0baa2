//! A self-balancing BST (an AVL tree) where every key also carries a numeric rank, and the ranks
//! of every key in a range can be bumped at once in `O(lg N)`.
//!
//! Range updates don't visit the keys they change. Instead, every node has a `collector`: a
//! pending delta for itself and its whole subtree. A range update tags the collectors of the
//! nodes on the two search paths to the range boundaries, and a rank query adds up the collectors
//! on the search path to its key. Rotations resolve the collectors of the nodes they move first so
//! a subtree never picks up a delta that was meant for its old ancestors.
//!
//! # Examples
//!
//! ```
//! use ranked_avl::RankedTree;
//!
//! let mut tree = RankedTree::new();
//! for key in [10, 20, 30, 40, 50] {
//!     tree.insert(key, key.to_string());
//! }
//!
//! // Every key in [15, 45) gets +5.
//! tree.update_rank_range(&15, &45, 5);
//! assert_eq!(tree.rank(&20), Some(5));
//! assert_eq!(tree.rank(&40), Some(5));
//! assert_eq!(tree.rank(&10), Some(0));
//! assert_eq!(tree.rank(&50), Some(0));
//!
//! // New keys always start at rank 0, whatever happened before them.
//! tree.insert(35, "35".to_string());
//! assert_eq!(tree.rank(&35), Some(0));
//!
//! assert_eq!(tree.remove(&30), Some("30".to_string()));
//! assert_eq!(tree.rank(&40), Some(5));
//! ```

mod iter;
mod node;

use std::fmt;

use tracing::trace;

use crate::error::{Error, Result};
use crate::rank::Rank;

pub use iter::{IntoIter, Iter};
use node::{Link, Node};

/// An AVL tree mapping unique keys to values, with a rank per key that supports `O(lg N)` range
/// updates. See the [module docs](self) for an overview.
#[derive(Clone)]
pub struct RankedTree<K, V, R> {
    root: Link<K, V, R>,
    len: usize,
}

impl<K, V, R> Default for RankedTree<K, V, R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V, R> RankedTree<K, V, R> {
    /// Generate a new, empty `RankedTree`.
    pub fn new() -> Self {
        Self { root: None, len: 0 }
    }

    /// The number of keys in the tree.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the tree has no keys.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The length of the longest path from the root to a leaf. A single node has height 0 and an
    /// empty tree has height -1.
    pub fn height(&self) -> i32 {
        node::height(&self.root)
    }

    /// The key stored at the root, if any.
    pub fn root_key(&self) -> Option<&K> {
        self.root.as_ref().map(|n| &n.key)
    }
}

impl<K, V, R> RankedTree<K, V, R>
where
    K: Ord,
    R: Rank,
{
    /// Inserts `key` with `value` and a rank of zero. If `key` is already present nothing changes
    /// (neither its value nor its rank) and `false` is returned.
    ///
    /// # Examples
    ///
    /// ```
    /// use ranked_avl::RankedTree;
    ///
    /// let mut tree = RankedTree::new();
    /// assert!(tree.insert(1, "one"));
    /// tree.update_rank_range(&0, &2, 3);
    ///
    /// assert!(!tree.insert(1, "uno"));
    /// assert_eq!(tree.get(&1), Some(&"one"));
    /// assert_eq!(tree.rank(&1), Some(3));
    /// ```
    pub fn insert(&mut self, key: K, value: V) -> bool {
        let inserted = Node::insert(&mut self.root, key, value, R::default());
        if inserted {
            self.len += 1;
        }
        inserted
    }

    /// Removes `key` from the tree and returns its value. If the tree does not contain `key`,
    /// nothing happens. The ranks of all other keys are unaffected.
    ///
    /// # Examples
    ///
    /// ```
    /// use ranked_avl::RankedTree;
    ///
    /// let mut tree: RankedTree<_, _, i64> = RankedTree::new();
    /// tree.insert(1, 2);
    ///
    /// assert_eq!(tree.remove(&1), Some(2));
    /// assert_eq!(tree.remove(&1), None);
    /// ```
    pub fn remove(&mut self, key: &K) -> Option<V> {
        let removed = Node::remove(&mut self.root, key);
        if removed.is_some() {
            self.len -= 1;
        }
        removed
    }

    /// Whether `key` is in the tree.
    pub fn contains_key(&self, key: &K) -> bool {
        self.find(key).is_some()
    }

    /// The value stored for `key`, or `None` if `key` is absent.
    pub fn get(&self, key: &K) -> Option<&V> {
        self.find(key).map(|n| &n.value)
    }

    /// A mutable reference to the value stored for `key`, or `None` if `key` is absent.
    pub fn get_mut(&mut self, key: &K) -> Option<&mut V> {
        self.root
            .as_deref_mut()?
            .find_mut(key)
            .map(|n| &mut n.value)
    }

    /// The current rank of `key`, or `None` if `key` is absent.
    pub fn rank(&self, key: &K) -> Option<R> {
        self.root.as_deref()?.rank(key)
    }

    /// Adds `amount` to the rank of every key `k` with `low <= k < high`. Does nothing when
    /// `low >= high`. Runs in `O(lg N)` regardless of how many keys are in the range.
    ///
    /// # Examples
    ///
    /// ```
    /// use ranked_avl::RankedTree;
    ///
    /// let mut tree = RankedTree::new();
    /// for key in 0..10 {
    ///     tree.insert(key, ());
    /// }
    ///
    /// tree.update_rank_range(&3, &7, 1.5);
    ///
    /// let ranks: Vec<f64> = tree.iter().map(|(_, _, rank)| rank).collect();
    /// assert_eq!(ranks, [0.0, 0.0, 0.0, 1.5, 1.5, 1.5, 1.5, 0.0, 0.0, 0.0]);
    /// ```
    pub fn update_rank_range(&mut self, low: &K, high: &K, amount: R) {
        if low >= high {
            return;
        }
        let Some(root) = self.root.as_deref_mut() else {
            return;
        };
        trace!(len = self.len, "range rank update");
        root.update_range(low, high, amount);
    }

    /// Checks that every structural invariant holds: keys are in order, every recorded height
    /// matches its children, every balance factor is within `[-1, 1]`, and [`len`](Self::len)
    /// matches the number of nodes.
    pub fn validate(&self) -> Result<()> {
        let count = match self.root.as_deref() {
            Some(root) => root.validate(None, None)?,
            None => 0,
        };
        if count != self.len {
            return Err(Error::Invariant(format!(
                "tree records {} keys but holds {}",
                self.len, count
            )));
        }
        Ok(())
    }

    fn find(&self, key: &K) -> Option<&Node<K, V, R>> {
        self.root.as_deref()?.find(key)
    }
}

impl<K, V, R: Rank> RankedTree<K, V, R> {
    /// Iterates over the tree in key order, yielding every key and value with its rank.
    pub fn iter(&self) -> Iter<'_, K, V, R> {
        Iter::new(&self.root, self.len)
    }

    /// Iterates over the keys in order.
    pub fn keys(&self) -> impl Iterator<Item = &K> + '_ {
        self.iter().map(|(key, _, _)| key)
    }
}

impl<K, V, R> fmt::Debug for RankedTree<K, V, R>
where
    K: fmt::Debug,
    V: fmt::Debug,
    R: Rank,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.iter().map(|(key, value, _)| (key, value)))
            .finish()
    }
}

impl<'a, K, V, R: Rank> IntoIterator for &'a RankedTree<K, V, R> {
    type Item = (&'a K, &'a V, R);
    type IntoIter = Iter<'a, K, V, R>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<K, V, R> IntoIterator for RankedTree<K, V, R> {
    type Item = (K, V);
    type IntoIter = IntoIter<K, V, R>;

    fn into_iter(self) -> Self::IntoIter {
        IntoIter::new(self.root, self.len)
    }
}

impl<K: Ord, V, R: Rank> Extend<(K, V)> for RankedTree<K, V, R> {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (key, value) in iter {
            self.insert(key, value);
        }
    }
}

impl<K: Ord, V, R: Rank> FromIterator<(K, V)> for RankedTree<K, V, R> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut tree = Self::new();
        tree.extend(iter);
        tree
    }
}
