#[cfg(test)]
#[macro_use]
extern crate quickcheck_macros;

mod ranked;

use quickcheck::{Arbitrary, Gen};

/// An enum for the various kinds of "things" to do to
/// ranked trees in a quicktest.
#[derive(Copy, Clone, Debug)]
pub(crate) enum Op<K, V> {
    /// Insert the K, V into the data structure
    Insert(K, V),
    /// Remove the K from the data structure
    Remove(K),
    /// Add the amount to the rank of every key in `[low, high)`
    UpdateRange(K, K, i8),
}

impl<K, V> Arbitrary for Op<K, V>
where
    K: Arbitrary,
    V: Arbitrary,
{
    fn arbitrary(g: &mut Gen) -> Self {
        match g.choose(&[0, 1, 2]).unwrap() {
            0 => Op::Insert(K::arbitrary(g), V::arbitrary(g)),
            1 => Op::Remove(K::arbitrary(g)),
            2 => Op::UpdateRange(K::arbitrary(g), K::arbitrary(g), i8::arbitrary(g)),
            _ => unreachable!(),
        }
    }
}
