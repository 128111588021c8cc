mod error;

pub mod collections;
pub mod prelude;
pub mod testing;

#[doc(hidden)]
/// This is a hidden module to make the macros defined on this crate available for the users.
pub mod __dependencies {
    pub use itertools;
    pub use paste;
    pub use proptest;
    pub use test_strategy;
    pub use thiserror::Error;
}

/// Generates the invariant test suite for one key/value instantiation of
/// [`OrderedMap`](crate::collections::OrderedMap): sorted in-order traversal,
/// conformance against `std::collections::BTreeMap` under arbitrary
/// operation sequences, insert/remove round trips, duplicate-insert
/// idempotence, cursor walk symmetry, and clone independence.
#[macro_export]
macro_rules! test_ordered_map_invariants {
    ($key:ty, $value:ty) => {
        $crate::__dependencies::paste::paste! {
            mod [<test_map_ $key:snake _ $value:snake>] {
                use std::collections::BTreeMap;

                use $crate::__dependencies::{proptest::prelude::*, test_strategy};
                use $crate::prelude::*;
                use $crate::testing::{distinct_pairs, ops, Op};

                #[test_strategy::proptest(fork = false)]
                fn test_in_order_traversal_is_strictly_sorted(map: OrderedMap<$key, $value>) {
                    let keys: Vec<_> = map.iter().map(|(key, _)| key).collect();
                    prop_assert!(keys.windows(2).all(|pair| pair[0] < pair[1]));
                }

                #[test_strategy::proptest(fork = false)]
                fn test_matches_btree_map_model(
                    #[strategy(ops::<$key, $value>(0..100))] ops: Vec<Op<$key, $value>>,
                ) {
                    let mut map = OrderedMap::new();
                    let mut model = BTreeMap::new();

                    for op in ops {
                        match op {
                            Op::Insert(key, value) => {
                                map.insert(key.clone(), value.clone());
                                model.entry(key).or_insert(value);
                            }
                            Op::RemoveNth(n) => {
                                if model.is_empty() {
                                    continue;
                                }
                                let key = model
                                    .keys()
                                    .nth(n % model.len())
                                    .expect("model is non-empty")
                                    .clone();
                                map.remove(&key)?;
                                model.remove(&key);
                            }
                        }
                    }

                    prop_assert_eq!(map.len(), model.len());
                    prop_assert!(map.iter().eq(model.iter()));
                }

                #[test_strategy::proptest(fork = false)]
                fn test_insert_then_remove_all_leaves_empty(
                    #[strategy(distinct_pairs::<$key, $value>(0..40))] pairs: Vec<($key, $value)>,
                ) {
                    let mut map: OrderedMap<$key, $value> = pairs.iter().cloned().collect();
                    prop_assert_eq!(map.len(), pairs.len());

                    for (key, _) in &pairs {
                        map.remove(key)?;
                    }

                    prop_assert!(map.is_empty());
                    prop_assert_eq!(map.len(), 0);
                    prop_assert_eq!(map.begin(), map.end());
                }

                #[test_strategy::proptest(fork = false)]
                fn test_duplicate_insert_keeps_first_value(
                    mut map: OrderedMap<$key, $value>,
                    key: $key,
                    first: $value,
                    second: $value,
                ) {
                    let _ = map.remove(&key);
                    let size = map.len();

                    prop_assert!(map.insert(key.clone(), first.clone()));
                    prop_assert!(!map.insert(key.clone(), second));
                    prop_assert_eq!(map.len(), size + 1);
                    prop_assert_eq!(map.value_of(&key)?, &first);
                }

                #[test_strategy::proptest(fork = false)]
                fn test_cursor_walk_symmetry(map: OrderedMap<$key, $value>) {
                    let mut cursor = map.begin();
                    for _ in 0..map.len() {
                        cursor = cursor.next(&map)?;
                    }
                    prop_assert!(cursor.is_end());

                    if !map.is_empty() {
                        let last = map.end().prev(&map)?;
                        prop_assert_eq!(last.next(&map)?, map.end());
                    }
                }

                #[test_strategy::proptest(fork = false)]
                fn test_clone_is_independent(
                    map: OrderedMap<$key, $value>,
                    key: $key,
                    value: $value,
                ) {
                    let mut copy = map.clone();
                    prop_assert_eq!(&copy, &map);

                    $crate::prop_assert_does_not_change!(
                        {
                            let _ = copy.remove(&key);
                            copy.insert(key.clone(), value.clone());
                        },
                        map.clone()
                    );
                    prop_assert!(copy.find(&key) != copy.end());
                }
            }
        }
    };
}

#[macro_export]
macro_rules! prop_assert_does_not_change {
    ($action: expr, $value: expr) => {
        let old_value = $value.clone();

        $action;

        prop_assert_eq!($value, old_value);
    };
}
