//! This crate exposes an ordered key/value index where every key also carries a numeric
//! "rank" that can be bumped for a whole range of keys at once.
//!
//! ## Binary Search Tree
//!
//! A Binary Search Tree is a data structure supporting operations to
//! insert, find, and delete stored records. BSTs are typically defined
//! recursively using the notion of a `Node`. A `Node` will typically store
//! some sort of value (the value that was inserted, for example) and will
//! sometimes have child `Node`s. The most important invariants of a BST are:
//!
//! 1. For every `Node` in a BST, all the `Node`s in its left subtree have a
//!    key less than its own key.
//! 2. For every `Node` in a BST, all the `Node`s in its right subtree have a
//!    key greater than its own key.
//!
//! Searching takes `O(height)`. The [`RankedTree`] keeps its height at `O(lg N)` by AVL
//! rotations: no node's subtrees differ in height by more than one.
//!
//! ## Ranks
//!
//! On top of that, [`RankedTree::update_rank_range`] adds an amount to the rank of every key in a
//! half-open range without visiting those keys, borrowing the lazy-tag idea from segment trees.
//! See the [`ranked`] module for how that works and how it survives rotations.
//!
//! The [`table`] module has a chained hash table built out of these trees.

#![deny(missing_docs, clippy::clone_on_ref_ptr)]

pub mod error;
mod rank;
pub mod ranked;
pub mod table;

#[cfg(test)]
mod test;

pub use error::{Error, Result};
pub use rank::Rank;
pub use ranked::RankedTree;
