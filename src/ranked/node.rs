use std::cmp::Ordering;
use std::mem;

use tracing::{error, trace};

use crate::error::{Error, Result};
use crate::rank::Rank;

pub(super) type Link<K, V, R> = Option<Box<Node<K, V, R>>>;

/// Height of an empty subtree. A leaf has height 0.
pub(super) const EMPTY_HEIGHT: i32 = -1;

pub(super) fn height<K, V, R>(link: &Link<K, V, R>) -> i32 {
    link.as_ref().map_or(EMPTY_HEIGHT, |n| n.height)
}

/// A node of a [`RankedTree`](super::RankedTree). Each node is owned by exactly one parent (or by
/// the tree when it is the root).
///
/// The effective rank of `key` is `rank` plus the `collector` of every node from the root down to
/// and including this one.
#[derive(Clone)]
pub(super) struct Node<K, V, R> {
    pub(super) key: K,
    pub(super) value: V,
    pub(super) rank: R,
    /// Pending delta for this node and its whole subtree.
    pub(super) collector: R,
    pub(super) height: i32,
    pub(super) left: Link<K, V, R>,
    pub(super) right: Link<K, V, R>,
}

/// The key, value, and rank of a node that was cut out of a subtree. `rank` is relative to the
/// parent of the subtree it was cut from.
struct Detached<K, V, R> {
    key: K,
    value: V,
    rank: R,
}

/// See https://en.wikipedia.org/wiki/AVL_tree#Rebalancing for terminology.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Rotation {
    Right,
    LeftRight,
    Left,
    RightLeft,
}

impl<K, V, R: Rank> Node<K, V, R> {
    /// A new leaf. `collector` should cancel out whatever the ancestors of its insertion point
    /// have pending so the new key starts with an effective rank of zero.
    fn leaf(key: K, value: V, collector: R) -> Box<Self> {
        Box::new(Node {
            key,
            value,
            rank: R::default(),
            collector,
            height: 0,
            left: None,
            right: None,
        })
    }

    /// Adjusts the height of `self` to be the max of its children's heights + 1.
    fn fix_height(&mut self) {
        self.height = height(&self.left).max(height(&self.right)) + 1;
    }

    /// `height(left) - height(right)`. Positive when the left side is taller.
    pub(super) fn balance_factor(&self) -> i32 {
        height(&self.left) - height(&self.right)
    }

    /// Resolves this node's collector into its own rank and hands it to both children.
    fn flush(&mut self) {
        let collector = mem::take(&mut self.collector);
        self.rank += collector;
        for child in [self.left.as_mut(), self.right.as_mut()]
            .into_iter()
            .flatten()
        {
            child.collector += collector;
        }
    }

    /// Flushes `self` and then both of its children. Afterwards `self` and its children all have
    /// a zero collector, so any of the grandchildren can be moved under a different one of those
    /// three nodes without changing a single effective rank.
    fn flush_for_rotation(&mut self) {
        self.flush();
        for child in [self.left.as_mut(), self.right.as_mut()]
            .into_iter()
            .flatten()
        {
            child.flush();
        }
    }

    /// Rotate self to the right. This moves the left child up vertically and self down vertically.
    /// Used to rebalance the tree when the left child is too tall. As such, it must only be called
    /// when there _is_ a left child.
    ///
    /// ## Panics
    ///
    /// When called on a node without a left child.
    ///
    /// # Diagram
    ///
    /// ```text
    ///   old_root (i.e. "self")    pivot
    ///    /     \                  /     \
    ///  pivot    z     rotate ->  x    old_root
    ///  / \                               /  \
    /// x   y                             y    z
    /// ```
    fn rotate_right(mut self: Box<Self>) -> Box<Self> {
        trace!(height = self.height, "rotate right");
        self.flush_for_rotation();

        let mut pivot = self.left.take().expect("Rotate right => left child");
        self.left = pivot.right.take();
        self.fix_height();

        pivot.right = Some(self);
        pivot.fix_height();
        pivot
    }

    /// Mirror image of [`Node::rotate_right`].
    fn rotate_left(mut self: Box<Self>) -> Box<Self> {
        trace!(height = self.height, "rotate left");
        self.flush_for_rotation();

        let mut pivot = self.right.take().expect("Rotate left => right child");
        self.right = pivot.left.take();
        self.fix_height();

        pivot.left = Some(self);
        pivot.fix_height();
        pivot
    }

    /// Picks the rotation that fixes `self`, if it needs one. Only valid when both children are
    /// already balanced and their heights differ by at most 2.
    fn rotation(&self) -> Option<Rotation> {
        let child_balance = |child: &Link<K, V, R>| child.as_ref().map(|n| n.balance_factor());
        match self.balance_factor() {
            -1..=1 => None,
            2 => match child_balance(&self.left) {
                Some(b) if b >= 0 => Some(Rotation::Right),
                Some(-1) => Some(Rotation::LeftRight),
                child => invariant_violation(2, child),
            },
            -2 => match child_balance(&self.right) {
                Some(b) if b <= 0 => Some(Rotation::Left),
                Some(1) => Some(Rotation::RightLeft),
                child => invariant_violation(-2, child),
            },
            balance => invariant_violation(balance, None),
        }
    }

    /// Recomputes the height of `self` and rotates if it became unbalanced. Returns the new root of
    /// this subtree.
    fn rebalanced(mut self: Box<Self>) -> Box<Self> {
        self.fix_height();
        match self.rotation() {
            None => self,
            Some(Rotation::Right) => self.rotate_right(),
            Some(Rotation::Left) => self.rotate_left(),
            Some(Rotation::LeftRight) => {
                self.left = self.left.take().map(Self::rotate_left);
                self.rotate_right()
            }
            Some(Rotation::RightLeft) => {
                self.right = self.right.take().map(Self::rotate_right);
                self.rotate_left()
            }
        }
    }

    pub(super) fn rebalance(link: &mut Link<K, V, R>) {
        if let Some(node) = link.take() {
            *link = Some(node.rebalanced());
        }

        if cfg!(debug_assertions) {
            if let Some(node) = link {
                assert!(node.balance_factor().abs() <= 1);
            }
        }
    }

    /// Inserts `key` below `link` unless it is already present. `pending` is the sum of the
    /// collectors of every ancestor of `link`. Returns whether a node was added.
    pub(super) fn insert(link: &mut Link<K, V, R>, key: K, value: V, pending: R) -> bool
    where
        K: Ord,
    {
        let node = match link {
            Some(node) => node,
            None => {
                *link = Some(Self::leaf(key, value, -pending));
                return true;
            }
        };

        let pending = pending + node.collector;
        let inserted = match key.cmp(&node.key) {
            Ordering::Less => Self::insert(&mut node.left, key, value, pending),
            Ordering::Equal => false,
            Ordering::Greater => Self::insert(&mut node.right, key, value, pending),
        };

        if inserted {
            Self::rebalance(link);
        }
        inserted
    }

    /// Removes `key` from below `link`, rebalancing every node on the way back up.
    pub(super) fn remove(link: &mut Link<K, V, R>, key: &K) -> Option<V>
    where
        K: Ord,
    {
        let node = link.as_mut()?;
        let removed = match key.cmp(&node.key) {
            Ordering::Less => Self::remove(&mut node.left, key)?,
            Ordering::Greater => Self::remove(&mut node.right, key)?,
            Ordering::Equal => {
                let (replacement, value) = link.take()?.unlink();
                *link = replacement;
                value
            }
        };

        Self::rebalance(link);
        Some(removed)
    }

    /// Takes `self` out of the tree and returns whatever should take its place along with its
    /// value.
    fn unlink(mut self: Box<Self>) -> (Link<K, V, R>, V) {
        match (self.left.take(), self.right.take()) {
            (None, None) => (None, self.value),
            (Some(mut child), None) | (None, Some(mut child)) => {
                // The child loses `self` as an ancestor.
                child.collector += self.collector;
                (Some(child), self.value)
            }
            (left @ Some(_), Some(right)) => {
                let (right, successor) = right.remove_min();
                self.left = left;
                self.right = right;

                self.key = successor.key;
                self.rank = successor.rank;
                let value = mem::replace(&mut self.value, successor.value);
                (Some(self), value)
            }
        }
    }

    /// Cuts the smallest node out of this subtree. Returns the new root of the subtree and the
    /// detached node, whose rank includes every collector from `self` down to it.
    fn remove_min(mut self: Box<Self>) -> (Link<K, V, R>, Detached<K, V, R>) {
        match self.left.take() {
            Some(left) => {
                let (left, mut min) = left.remove_min();
                min.rank += self.collector;
                self.left = left;
                (Some(self.rebalanced()), min)
            }
            None => {
                let collector = self.collector;
                let right = self.right.take().map(|mut right| {
                    right.collector += collector;
                    right
                });
                let min = Detached {
                    key: self.key,
                    value: self.value,
                    rank: self.rank + collector,
                };
                (right, min)
            }
        }
    }

    pub(super) fn find(&self, key: &K) -> Option<&Self>
    where
        K: Ord,
    {
        match key.cmp(&self.key) {
            Ordering::Less => self.left.as_deref()?.find(key),
            Ordering::Equal => Some(self),
            Ordering::Greater => self.right.as_deref()?.find(key),
        }
    }

    pub(super) fn find_mut(&mut self, key: &K) -> Option<&mut Self>
    where
        K: Ord,
    {
        match key.cmp(&self.key) {
            Ordering::Less => self.left.as_deref_mut()?.find_mut(key),
            Ordering::Equal => Some(self),
            Ordering::Greater => self.right.as_deref_mut()?.find_mut(key),
        }
    }

    /// The effective rank of `key` in this subtree, counting `self`'s collector but none of its
    /// ancestors'.
    pub(super) fn rank(&self, key: &K) -> Option<R>
    where
        K: Ord,
    {
        let mut pending = R::default();
        let mut current = Some(self);
        while let Some(node) = current {
            pending += node.collector;
            current = match key.cmp(&node.key) {
                Ordering::Less => node.left.as_deref(),
                Ordering::Equal => return Some(node.rank + pending),
                Ordering::Greater => node.right.as_deref(),
            };
        }
        None
    }

    /// Adds `amount` to the rank of every key in `[low, high)`. Only the collectors of nodes on
    /// the paths from the split node towards `low` and `high` change.
    pub(super) fn update_range(&mut self, low: &K, high: &K, amount: R)
    where
        K: Ord,
    {
        let Some(split) = self.split_node(low, high) else {
            return;
        };
        Self::tag_at_or_above(Some(&mut *split), low, amount);
        Self::tag_at_or_above(Some(split), high, -amount);
    }

    /// The highest node whose key is not strictly on the same side of both `low` and `high`.
    /// Every key in `[low, high)` lives in its subtree and none of its ancestors is in range.
    fn split_node(&mut self, low: &K, high: &K) -> Option<&mut Self>
    where
        K: Ord,
    {
        if *low < self.key && *high < self.key {
            self.left.as_deref_mut()?.split_node(low, high)
        } else if *low > self.key && *high > self.key {
            self.right.as_deref_mut()?.split_node(low, high)
        } else {
            Some(self)
        }
    }

    /// Adds `amount` to every key `>= bound` below `cursor` by walking towards `bound`.
    ///
    /// A node `>= bound` covers itself and its right subtree, so its collector is tagged before
    /// going left. A node `< bound` and its left subtree must not see the delta, so an active tag
    /// is cancelled on it before going right.
    fn tag_at_or_above(mut cursor: Option<&mut Self>, bound: &K, amount: R)
    where
        K: Ord,
    {
        let mut tagged = false;
        while let Some(node) = cursor {
            if *bound <= node.key {
                if !tagged {
                    node.collector += amount;
                    tagged = true;
                }
                cursor = node.left.as_deref_mut();
            } else {
                if tagged {
                    node.collector -= amount;
                    tagged = false;
                }
                cursor = node.right.as_deref_mut();
            }
        }
    }

    /// Checks ordering, heights, and balance of this subtree. Every key must be strictly between
    /// `lower` and `upper`. Returns the number of nodes.
    pub(super) fn validate(&self, lower: Option<&K>, upper: Option<&K>) -> Result<usize>
    where
        K: Ord,
    {
        if lower.map_or(false, |lower| self.key <= *lower)
            || upper.map_or(false, |upper| self.key >= *upper)
        {
            return Err(Error::Invariant("keys out of order".to_string()));
        }

        let left = match &self.left {
            Some(left) => left.validate(lower, Some(&self.key))?,
            None => 0,
        };
        let right = match &self.right {
            Some(right) => right.validate(Some(&self.key), upper)?,
            None => 0,
        };

        let expected = height(&self.left).max(height(&self.right)) + 1;
        if self.height != expected {
            return Err(Error::Invariant(format!(
                "height is {} but children imply {}",
                self.height, expected
            )));
        }
        if self.balance_factor().abs() > 1 {
            return Err(Error::Invariant(format!(
                "balance factor {} out of range",
                self.balance_factor()
            )));
        }

        Ok(left + right + 1)
    }
}

#[cold]
fn invariant_violation(balance: i32, child_balance: Option<i32>) -> ! {
    error!(balance, ?child_balance, "no rotation matches balance factors");
    panic!("no rotation for balance factor {balance} with child balance {child_balance:?}");
}
