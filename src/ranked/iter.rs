use std::iter::FusedIterator;

use super::node::{Link, Node};
use crate::rank::Rank;

/// In-order iterator over a [`RankedTree`](super::RankedTree), yielding each key and value with
/// its effective rank.
///
/// Created by [`RankedTree::iter`](super::RankedTree::iter).
pub struct Iter<'a, K, V, R> {
    /// Nodes whose left subtree has been visited, each with the sum of the collectors from the
    /// root down to and including it.
    stack: Vec<(&'a Node<K, V, R>, R)>,
    remaining: usize,
}

impl<'a, K, V, R: Rank> Iter<'a, K, V, R> {
    pub(super) fn new(root: &'a Link<K, V, R>, len: usize) -> Self {
        let mut iter = Self {
            stack: Vec::new(),
            remaining: len,
        };
        iter.push_left_spine(root.as_deref(), R::default());
        iter
    }

    fn push_left_spine(&mut self, mut node: Option<&'a Node<K, V, R>>, mut pending: R) {
        while let Some(n) = node {
            pending += n.collector;
            self.stack.push((n, pending));
            node = n.left.as_deref();
        }
    }
}

impl<'a, K, V, R: Rank> Iterator for Iter<'a, K, V, R> {
    type Item = (&'a K, &'a V, R);

    fn next(&mut self) -> Option<Self::Item> {
        let (node, pending) = self.stack.pop()?;
        self.push_left_spine(node.right.as_deref(), pending);
        self.remaining -= 1;
        Some((&node.key, &node.value, node.rank + pending))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V, R: Rank> ExactSizeIterator for Iter<'_, K, V, R> {}
impl<K, V, R: Rank> FusedIterator for Iter<'_, K, V, R> {}

/// Owning in-order iterator over the keys and values of a [`RankedTree`](super::RankedTree).
pub struct IntoIter<K, V, R> {
    stack: Vec<Box<Node<K, V, R>>>,
    remaining: usize,
}

impl<K, V, R> IntoIter<K, V, R> {
    pub(super) fn new(root: Link<K, V, R>, len: usize) -> Self {
        let mut iter = Self {
            stack: Vec::new(),
            remaining: len,
        };
        iter.push_left_spine(root);
        iter
    }

    fn push_left_spine(&mut self, mut link: Link<K, V, R>) {
        while let Some(mut node) = link {
            link = node.left.take();
            self.stack.push(node);
        }
    }
}

impl<K, V, R> Iterator for IntoIter<K, V, R> {
    type Item = (K, V);

    fn next(&mut self) -> Option<Self::Item> {
        let mut node = self.stack.pop()?;
        self.push_left_spine(node.right.take());
        self.remaining -= 1;
        Some((node.key, node.value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V, R> ExactSizeIterator for IntoIter<K, V, R> {}
impl<K, V, R> FusedIterator for IntoIter<K, V, R> {}
