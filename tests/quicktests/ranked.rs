use ranked_avl::RankedTree;

use std::collections::{BTreeMap, HashSet};

use crate::Op;

/// Applies a set of operations to a tree and a reference map of `(value, rank)`.
/// This way we can ensure that after a random smattering of inserts,
/// deletes, and range updates we have the same keys, values, and ranks.
fn do_ops<K, V>(
    ops: &[Op<K, V>],
    bst: &mut RankedTree<K, V, i64>,
    map: &mut BTreeMap<K, (V, i64)>,
) where
    K: Ord + Clone,
    V: std::fmt::Debug + PartialEq + Clone,
{
    for op in ops {
        match op {
            Op::Insert(k, v) => {
                bst.insert(k.clone(), v.clone());
                map.entry(k.clone()).or_insert_with(|| (v.clone(), 0));
            }
            Op::Remove(k) => {
                assert_eq!(bst.remove(k), map.remove(k).map(|(v, _)| v));
            }
            Op::UpdateRange(low, high, amount) => {
                bst.update_rank_range(low, high, i64::from(*amount));
                if low < high {
                    for (_, (_, rank)) in map.range_mut(low.clone()..high.clone()) {
                        *rank += i64::from(*amount);
                    }
                }
            }
        }
    }
}

#[quickcheck]
fn fuzz_multiple_operations_i8(ops: Vec<Op<i8, i8>>) -> bool {
    let mut tree = RankedTree::new();
    let mut map = BTreeMap::new();

    do_ops(&ops, &mut tree, &mut map);
    tree.validate().is_ok()
        && tree.len() == map.len()
        && map.iter().all(|(key, (value, rank))| {
            tree.get(key) == Some(value) && tree.rank(key) == Some(*rank)
        })
}

#[quickcheck]
fn iteration_matches_model(ops: Vec<Op<i16, u8>>) -> bool {
    let mut tree = RankedTree::new();
    let mut map = BTreeMap::new();

    do_ops(&ops, &mut tree, &mut map);
    tree.iter()
        .map(|(k, v, r)| (*k, *v, r))
        .eq(map.iter().map(|(k, (v, r))| (*k, *v, *r)))
}

#[quickcheck]
fn contains(xs: Vec<i8>) -> bool {
    let mut tree: RankedTree<i8, i8, i64> = RankedTree::new();
    for x in &xs {
        tree.insert(*x, *x);
    }

    xs.iter().all(|x| tree.get(x) == Some(x))
}

#[quickcheck]
fn contains_not(xs: Vec<i8>, nots: Vec<i8>) -> bool {
    let mut tree: RankedTree<i8, i8, i64> = RankedTree::new();
    for x in &xs {
        tree.insert(*x, *x);
    }
    let added: HashSet<_> = xs.into_iter().collect();
    let nots: HashSet<_> = nots.into_iter().collect();
    let mut nots = nots.difference(&added);

    nots.all(|x| !tree.contains_key(x) && tree.rank(x).is_none())
}

#[quickcheck]
fn with_deletions(xs: Vec<i8>, deletes: Vec<i8>) -> bool {
    let mut tree: RankedTree<i8, i8, i64> = RankedTree::new();
    for x in &xs {
        tree.insert(*x, *x);
    }
    for delete in &deletes {
        tree.remove(delete);
    }

    let mut still_present = xs;
    for delete in &deletes {
        // We may have inserted the same value multiple times - delete each one.
        while let Some(pos) = still_present.iter().position(|x| x == delete) {
            still_present.swap_remove(pos);
        }
    }

    deletes.iter().all(|x| tree.get(x).is_none())
        && still_present.iter().all(|x| tree.get(x).is_some())
        && tree.validate().is_ok()
}

#[quickcheck]
fn fresh_keys_rank_zero(xs: Vec<i8>, updates: Vec<(i8, i8, i8)>, fresh: i8) -> bool {
    let mut tree: RankedTree<i8, (), i64> = xs.into_iter().map(|x| (x, ())).collect();
    for (low, high, amount) in updates {
        tree.update_rank_range(&low, &high, i64::from(amount));
    }

    let was_present = tree.contains_key(&fresh);
    let before = tree.rank(&fresh);
    tree.insert(fresh, ());

    if was_present {
        tree.rank(&fresh) == before
    } else {
        tree.rank(&fresh) == Some(0)
    }
}
