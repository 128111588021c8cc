use std::hash::Hash;

use itertools::Itertools;
use proptest::{
    collection::{hash_map, hash_set, vec},
    prelude::*,
    sample::SizeRange,
};

/// Operations applied against a map and a reference model in lockstep.
///
/// `RemoveNth(n)` names the `n % live`-th smallest live key, so removals
/// always hit an existing entry regardless of the key distribution.
#[derive(Debug, Clone)]
pub enum Op<K, V> {
    Insert(K, V),
    RemoveNth(usize),
}

pub fn ops<K, V>(size: impl Into<SizeRange>) -> impl Strategy<Value = Vec<Op<K, V>>>
where
    K: Arbitrary,
    V: Arbitrary,
{
    vec(
        prop_oneof![
            3 => (any::<K>(), any::<V>()).prop_map(|(key, value)| Op::Insert(key, value)),
            1 => any::<usize>().prop_map(Op::RemoveNth),
        ],
        size,
    )
}

/// Key/value pairs with pairwise-distinct keys, in shuffled order.
pub fn distinct_pairs<K, V>(size: impl Into<SizeRange>) -> impl Strategy<Value = Vec<(K, V)>>
where
    K: Arbitrary + Eq + Hash,
    V: Arbitrary,
{
    hash_map(any::<K>(), any::<V>(), size)
        .prop_map(|pairs| pairs.into_iter().collect_vec())
        .prop_shuffle()
}

/// Distinct keys in strictly ascending order.
pub fn sorted_keys<K>(size: impl Into<SizeRange>) -> impl Strategy<Value = Vec<K>>
where
    K: Arbitrary + Ord + Hash,
{
    hash_set(any::<K>(), size).prop_map(|keys| keys.into_iter().sorted().collect_vec())
}
