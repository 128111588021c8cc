use std::iter::FusedIterator;

use super::OrderedMap;

/// Double-ended in-order iterator over borrowed entries.
///
/// Steps through parent links; no auxiliary stack.
pub struct Iter<'a, K, V> {
    map: &'a OrderedMap<K, V>,
    front: Option<u32>,
    back: Option<u32>,
    remaining: usize,
}

impl<'a, K, V> Iter<'a, K, V> {
    pub(super) fn new(map: &'a OrderedMap<K, V>) -> Self {
        Self {
            map,
            front: map.first_node(),
            back: map.last_node(),
            remaining: map.len(),
        }
    }
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let idx = self.front?;
        let node = self.map.live(idx)?;
        self.remaining -= 1;
        self.front = if self.remaining == 0 {
            None
        } else {
            self.map.successor(idx)
        };
        Some((&node.key, &node.value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> DoubleEndedIterator for Iter<'_, K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let idx = self.back?;
        let node = self.map.live(idx)?;
        self.remaining -= 1;
        self.back = if self.remaining == 0 {
            None
        } else {
            self.map.predecessor(idx)
        };
        Some((&node.key, &node.value))
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {
    fn len(&self) -> usize {
        self.remaining
    }
}

impl<K, V> FusedIterator for Iter<'_, K, V> {}

impl<K, V> Clone for Iter<'_, K, V> {
    fn clone(&self) -> Self {
        Self {
            map: self.map,
            front: self.front,
            back: self.back,
            remaining: self.remaining,
        }
    }
}

/// Consuming in-order iterator.
///
/// Drains entries through the same structural removal path as `remove`; each
/// step detaches the current minimum (or maximum, from the back).
pub struct IntoIter<K, V> {
    map: OrderedMap<K, V>,
}

impl<K, V> Iterator for IntoIter<K, V> {
    type Item = (K, V);

    fn next(&mut self) -> Option<Self::Item> {
        let idx = self.map.first_node()?;
        Some(self.map.remove_node(idx))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.map.len(), Some(self.map.len()))
    }
}

impl<K, V> DoubleEndedIterator for IntoIter<K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        let idx = self.map.last_node()?;
        Some(self.map.remove_node(idx))
    }
}

impl<K, V> ExactSizeIterator for IntoIter<K, V> {
    fn len(&self) -> usize {
        self.map.len()
    }
}

impl<K, V> FusedIterator for IntoIter<K, V> {}

impl<K, V> IntoIterator for OrderedMap<K, V> {
    type Item = (K, V);
    type IntoIter = IntoIter<K, V>;

    fn into_iter(self) -> IntoIter<K, V> {
        IntoIter { map: self }
    }
}

impl<'a, K, V> IntoIterator for &'a OrderedMap<K, V> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Iter<'a, K, V> {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;
    use test_strategy::proptest;

    use crate::prelude::*;

    #[test]
    fn iter_is_double_ended() {
        let map: OrderedMap<i32, i32> = (0..5).map(|key| (key, key)).collect();
        let forward: Vec<i32> = map.iter().map(|(key, _)| *key).collect();
        let backward: Vec<i32> = map.iter().rev().map(|(key, _)| *key).collect();

        assert_eq!(forward, vec![0, 1, 2, 3, 4]);
        assert_eq!(backward, vec![4, 3, 2, 1, 0]);
    }

    #[test]
    fn iter_ends_meet_in_the_middle() {
        let map: OrderedMap<i32, i32> = (0..4).map(|key| (key, key)).collect();
        let mut iter = map.iter();

        assert_eq!(iter.next().map(|(key, _)| *key), Some(0));
        assert_eq!(iter.next_back().map(|(key, _)| *key), Some(3));
        assert_eq!(iter.next().map(|(key, _)| *key), Some(1));
        assert_eq!(iter.next_back().map(|(key, _)| *key), Some(2));
        assert_eq!(iter.next(), None);
        assert_eq!(iter.next_back(), None);
    }

    #[test]
    fn exact_size_tracks_consumption() {
        let map: OrderedMap<i32, i32> = (0..3).map(|key| (key, key)).collect();
        let mut iter = map.iter();
        assert_eq!(iter.len(), 3);
        iter.next();
        assert_eq!(iter.len(), 2);
    }

    #[test]
    fn for_loop_over_a_reference() {
        let map: OrderedMap<i32, i32> = [(2, 4), (1, 1)].into();
        let mut total = 0;
        for (_, value) in &map {
            total += value;
        }
        assert_eq!(total, 5);
    }

    #[proptest(fork = false)]
    fn into_iter_yields_sorted_pairs(map: OrderedMap<u32, u32>) {
        let pairs: Vec<(u32, u32)> = map.clone().into_iter().collect();
        prop_assert!(pairs.windows(2).all(|pair| pair[0].0 < pair[1].0));
        prop_assert_eq!(pairs.len(), map.len());
        prop_assert!(map.iter().map(|(key, value)| (*key, *value)).eq(pairs));
    }

    #[proptest(fork = false)]
    fn into_iter_back_drains_in_reverse(map: OrderedMap<u32, u32>) {
        let forward: Vec<u32> = map.clone().into_iter().map(|(key, _)| key).collect();
        let mut backward: Vec<u32> = map.into_iter().rev().map(|(key, _)| key).collect();
        backward.reverse();
        prop_assert_eq!(forward, backward);
    }
}
