mod cursor;
mod iter;
mod node;

use std::{
    cmp::Ordering,
    fmt,
    sync::atomic::{AtomicU64, Ordering::Relaxed},
};

use proptest::{collection::vec, prelude::*};

use crate::error::{Error, Result};

pub use cursor::{Cursor, CursorMut};
pub use iter::{IntoIter, Iter};
use node::Node;

static NEXT_TREE_ID: AtomicU64 = AtomicU64::new(1);

fn next_tree_id() -> u64 {
    NEXT_TREE_ID.fetch_add(1, Relaxed)
}

/// An ordered map backed by a plain (unbalanced) binary search tree.
///
/// Nodes live in a slot arena: every link is an `Option<u32>` index into the
/// arena, children are owned through their slot, and parent links are
/// non-owning back-references used for in-order traversal and for relinking
/// on removal. Vacated slots go on a free list and are reused by later
/// insertions.
///
/// Keys are unique; inserting a key that is already present keeps the
/// existing entry untouched. Operations cost O(depth), which degenerates to
/// O(n) under adversarial insertion orders since the tree never rebalances.
///
/// Each map carries a unique tree id. [`Cursor`]s are stamped with the id of
/// the map that produced them and are rejected by any other map, including
/// clones of the original.
pub struct OrderedMap<K, V> {
    slots: Vec<Option<Node<K, V>>>,
    free_list: Vec<u32>,
    root: Option<u32>,
    len: usize,
    id: u64,
}

impl<K, V> OrderedMap<K, V> {
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            free_list: Vec::new(),
            root: None,
            len: 0,
            id: next_tree_id(),
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Drops every entry; stale cursors into the old content are rejected
    /// afterwards.
    pub fn clear(&mut self) {
        self.slots.clear();
        self.free_list.clear();
        self.root = None;
        self.len = 0;
    }

    /// Cursor at the smallest key, or the end cursor when empty.
    pub fn begin(&self) -> Cursor {
        Cursor::new(self.id, self.first_node())
    }

    /// The end cursor: one past the largest key.
    pub fn end(&self) -> Cursor {
        Cursor::new(self.id, None)
    }

    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter::new(self)
    }

    /// Removes the entry under `cursor` and returns it.
    ///
    /// Fails with [`Error::InvalidIterator`] when the cursor belongs to a
    /// different map, is the end cursor, or points at an already removed
    /// entry.
    pub fn remove_at(&mut self, cursor: Cursor) -> Result<(K, V)> {
        let idx = cursor.index_in(self.id).ok_or(Error::InvalidIterator)?;
        if self.live(idx).is_none() {
            return Err(Error::InvalidIterator);
        }
        Ok(self.remove_node(idx))
    }

    /// Mutable access to the value under `cursor`.
    pub fn value_at_mut(&mut self, cursor: Cursor) -> Result<&mut V> {
        let idx = cursor.index_in(self.id).ok_or(Error::OutOfRange)?;
        match self.slots.get_mut(idx as usize).and_then(Option::as_mut) {
            Some(node) => Ok(&mut node.value),
            None => Err(Error::OutOfRange),
        }
    }

    /// Binds a [`CursorMut`] at the position of `cursor`, validating that the
    /// cursor belongs to this map and still points at a live entry (or the
    /// end position).
    pub fn cursor_mut(&mut self, cursor: Cursor) -> Result<CursorMut<'_, K, V>> {
        CursorMut::bind(self, cursor)
    }

    fn tree_id(&self) -> u64 {
        self.id
    }

    fn live(&self, idx: u32) -> Option<&Node<K, V>> {
        self.slots.get(idx as usize)?.as_ref()
    }

    fn node(&self, idx: u32) -> &Node<K, V> {
        self.slots[idx as usize].as_ref().expect("live node index")
    }

    fn node_mut(&mut self, idx: u32) -> &mut Node<K, V> {
        self.slots[idx as usize].as_mut().expect("live node index")
    }

    fn alloc(&mut self, node: Node<K, V>) -> u32 {
        match self.free_list.pop() {
            Some(idx) => {
                self.slots[idx as usize] = Some(node);
                idx
            }
            None => {
                self.slots.push(Some(node));
                (self.slots.len() - 1) as u32
            }
        }
    }

    fn release(&mut self, idx: u32) -> (K, V) {
        let node = self.slots[idx as usize]
            .take()
            .expect("released node is live");
        self.free_list.push(idx);
        self.len -= 1;
        (node.key, node.value)
    }

    fn leftmost(&self, mut idx: u32) -> u32 {
        while let Some(left) = self.node(idx).left {
            idx = left;
        }
        idx
    }

    fn rightmost(&self, mut idx: u32) -> u32 {
        while let Some(right) = self.node(idx).right {
            idx = right;
        }
        idx
    }

    fn first_node(&self) -> Option<u32> {
        self.root.map(|root| self.leftmost(root))
    }

    fn last_node(&self) -> Option<u32> {
        self.root.map(|root| self.rightmost(root))
    }

    /// In-order successor: leftmost of the right subtree, else the first
    /// ancestor reached from its left child. `None` past the largest key.
    fn successor(&self, idx: u32) -> Option<u32> {
        if let Some(right) = self.node(idx).right {
            return Some(self.leftmost(right));
        }
        let mut child = idx;
        let mut parent = self.node(idx).parent;
        while let Some(idx) = parent {
            if self.node(idx).left == Some(child) {
                return Some(idx);
            }
            child = idx;
            parent = self.node(idx).parent;
        }
        None
    }

    /// In-order predecessor, symmetric to [`Self::successor`].
    fn predecessor(&self, idx: u32) -> Option<u32> {
        if let Some(left) = self.node(idx).left {
            return Some(self.rightmost(left));
        }
        let mut child = idx;
        let mut parent = self.node(idx).parent;
        while let Some(idx) = parent {
            if self.node(idx).right == Some(child) {
                return Some(idx);
            }
            child = idx;
            parent = self.node(idx).parent;
        }
        None
    }

    /// Installs `replacement` (possibly vacant) into `target`'s exact tree
    /// position: the root slot, or whichever child slot of `target`'s parent
    /// it occupied. The replacement inherits `target`'s parent and children,
    /// skipping a child that is the replacement itself to avoid
    /// self-parenting. `target` ends fully detached.
    fn replace(&mut self, target: u32, replacement: Option<u32>) {
        let parent = self.node(target).parent;
        match parent {
            None => self.root = replacement,
            Some(idx) => {
                let parent_node = self.node_mut(idx);
                if parent_node.left == Some(target) {
                    parent_node.left = replacement;
                } else {
                    parent_node.right = replacement;
                }
            }
        }

        if let Some(replacement) = replacement {
            self.node_mut(replacement).parent = parent;

            if let Some(right) = self.node(target).right.filter(|&right| right != replacement) {
                self.node_mut(replacement).right = Some(right);
                self.node_mut(right).parent = Some(replacement);
            }
            if let Some(left) = self.node(target).left.filter(|&left| left != replacement) {
                self.node_mut(replacement).left = Some(left);
                self.node_mut(left).parent = Some(replacement);
            }
        }

        let target_node = self.node_mut(target);
        target_node.parent = None;
        target_node.left = None;
        target_node.right = None;
    }

    fn remove_node(&mut self, idx: u32) -> (K, V) {
        let (left, right) = {
            let node = self.node(idx);
            (node.left, node.right)
        };

        match (left, right) {
            (None, _) => self.replace(idx, right),
            (_, None) => self.replace(idx, left),
            (Some(_), Some(right)) => {
                // The in-order successor is the leftmost node of the right
                // subtree; it has no left child, so detaching it is a single
                // replacement by its own right child.
                let successor = self.leftmost(right);
                let successor_right = self.node(successor).right;
                self.replace(successor, successor_right);
                self.replace(idx, Some(successor));
            }
        }

        self.release(idx)
    }
}

impl<K: Ord, V> OrderedMap<K, V> {
    /// Inserts `key`/`value`, returning whether a new entry was created.
    /// An equal key keeps the existing entry and drops `value`.
    pub fn insert(&mut self, key: K, value: V) -> bool {
        self.insert_node(key, value).1
    }

    /// Cursor at the entry for `key`, or the end cursor when absent.
    pub fn find(&self, key: &K) -> Cursor {
        Cursor::new(self.id, self.find_node(key))
    }

    pub fn value_of(&self, key: &K) -> Result<&V> {
        match self.find_node(key) {
            Some(idx) => Ok(&self.node(idx).value),
            None => Err(Error::KeyNotFound),
        }
    }

    pub fn value_of_mut(&mut self, key: &K) -> Result<&mut V> {
        match self.find_node(key) {
            Some(idx) => Ok(&mut self.node_mut(idx).value),
            None => Err(Error::KeyNotFound),
        }
    }

    /// The indexing operation: mutable access to the value for `key`,
    /// inserting a default-constructed value first when the key is absent.
    pub fn get_or_insert_default(&mut self, key: K) -> &mut V
    where
        V: Default,
    {
        let (idx, _) = self.insert_node(key, V::default());
        &mut self.node_mut(idx).value
    }

    /// Looks the key up and removes through the cursor path, so a missing
    /// key surfaces as [`Error::InvalidIterator`].
    pub fn remove(&mut self, key: &K) -> Result<(K, V)> {
        let cursor = self.find(key);
        self.remove_at(cursor)
    }

    fn find_node(&self, key: &K) -> Option<u32> {
        let mut current = self.root;
        while let Some(idx) = current {
            let node = self.node(idx);
            current = match key.cmp(&node.key) {
                Ordering::Greater => node.right,
                Ordering::Less => node.left,
                Ordering::Equal => return Some(idx),
            };
        }
        None
    }

    /// Walks down from the root and attaches a new node at the first vacant
    /// child slot. Returns the slot holding `key` and whether a node was
    /// attached.
    fn insert_node(&mut self, key: K, value: V) -> (u32, bool) {
        let Some(mut current) = self.root else {
            let idx = self.alloc(Node::new(key, value));
            self.root = Some(idx);
            self.len += 1;
            return (idx, true);
        };

        loop {
            match key.cmp(&self.node(current).key) {
                Ordering::Greater => match self.node(current).right {
                    Some(right) => current = right,
                    None => {
                        let idx = self.alloc(Node::new(key, value));
                        self.node_mut(idx).parent = Some(current);
                        self.node_mut(current).right = Some(idx);
                        self.len += 1;
                        return (idx, true);
                    }
                },
                Ordering::Less => match self.node(current).left {
                    Some(left) => current = left,
                    None => {
                        let idx = self.alloc(Node::new(key, value));
                        self.node_mut(idx).parent = Some(current);
                        self.node_mut(current).left = Some(idx);
                        self.len += 1;
                        return (idx, true);
                    }
                },
                Ordering::Equal => return (current, false),
            }
        }
    }
}

impl<K, V> Default for OrderedMap<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Clone, V: Clone> Clone for OrderedMap<K, V> {
    /// Deep structural copy with a fresh tree id; cursors never carry over
    /// from the source.
    fn clone(&self) -> Self {
        Self {
            slots: self.slots.clone(),
            free_list: self.free_list.clone(),
            root: self.root,
            len: self.len,
            id: next_tree_id(),
        }
    }
}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for OrderedMap<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

/// Content equality: size first, then element-wise comparison in increasing
/// key order. Tree shape never participates.
impl<K: PartialEq, V: PartialEq> PartialEq for OrderedMap<K, V> {
    fn eq(&self, other: &Self) -> bool {
        self.len == other.len && self.iter().eq(other.iter())
    }
}

impl<K: Eq, V: Eq> Eq for OrderedMap<K, V> {}

impl<K: Ord, V> Extend<(K, V)> for OrderedMap<K, V> {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (key, value) in iter {
            self.insert(key, value);
        }
    }
}

/// Sequence construction with insert-or-ignore semantics: the first
/// occurrence of a key wins.
impl<K: Ord, V> FromIterator<(K, V)> for OrderedMap<K, V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Self::new();
        map.extend(iter);
        map
    }
}

impl<K: Ord, V, const N: usize> From<[(K, V); N]> for OrderedMap<K, V> {
    fn from(entries: [(K, V); N]) -> Self {
        entries.into_iter().collect()
    }
}

impl<K, V> Arbitrary for OrderedMap<K, V>
where
    K: Arbitrary + Ord + 'static,
    V: Arbitrary + 'static,
{
    type Parameters = ();
    type Strategy = BoxedStrategy<Self>;

    fn arbitrary_with(_: Self::Parameters) -> Self::Strategy {
        vec(any::<(K, V)>(), 0..64)
            .prop_map(|entries| entries.into_iter().collect())
            .boxed()
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;
    use test_strategy::proptest;

    use crate::{prelude::*, testing::sorted_keys};

    crate::test_ordered_map_invariants!(u64, u64);
    crate::test_ordered_map_invariants!(u8, String);

    fn sample() -> OrderedMap<i32, &'static str> {
        OrderedMap::from([
            (5, "five"),
            (3, "three"),
            (8, "eight"),
            (1, "one"),
            (4, "four"),
            (7, "seven"),
            (9, "nine"),
        ])
    }

    #[test]
    fn in_order_traversal_after_inserts() {
        let map = sample();
        assert_eq!(map.len(), 7);

        let keys: Vec<i32> = map.iter().map(|(key, _)| *key).collect();
        assert_eq!(keys, vec![1, 3, 4, 5, 7, 8, 9]);
    }

    #[test]
    fn removing_a_two_child_node_relinks_the_successor() {
        let mut map = sample();
        assert_eq!(map.remove(&5), Ok((5, "five")));
        assert_eq!(map.len(), 6);
        assert_eq!(map.find(&5), map.end());

        let keys: Vec<i32> = map.iter().map(|(key, _)| *key).collect();
        assert_eq!(keys, vec![1, 3, 4, 7, 8, 9]);
    }

    #[test]
    fn removing_every_entry_leaves_an_empty_map() {
        let mut map = sample();
        while !map.is_empty() {
            let cursor = map.begin();
            map.remove_at(cursor).unwrap();
        }

        assert!(map.is_empty());
        assert_eq!(map.len(), 0);
        assert_eq!(map.begin(), map.end());
    }

    #[test]
    fn value_of_missing_key_is_an_error() {
        let map = OrderedMap::from([(1, 10), (2, 20), (3, 30)]);
        assert_eq!(map.value_of(&42), Err(Error::KeyNotFound));
    }

    #[test]
    fn indexing_inserts_a_default_value() {
        let mut map = OrderedMap::from([(1, 10), (2, 20), (3, 30)]);
        assert_eq!(*map.get_or_insert_default(42), 0);
        assert_eq!(map.len(), 4);

        *map.get_or_insert_default(42) = 7;
        assert_eq!(map.value_of(&42), Ok(&7));
        assert_eq!(map.len(), 4);
    }

    #[test]
    fn insert_or_ignore_keeps_the_first_value() {
        let mut map = OrderedMap::new();
        assert!(map.insert(1, "first"));
        assert!(!map.insert(1, "second"));
        assert_eq!(map.len(), 1);
        assert_eq!(map.value_of(&1), Ok(&"first"));
    }

    #[test]
    fn removing_a_missing_key_is_an_invalid_iterator() {
        let mut map = OrderedMap::from([(1, 1)]);
        assert_eq!(map.remove(&2), Err(Error::InvalidIterator));
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn equality_is_content_based_not_structural() {
        let ascending: OrderedMap<i32, i32> = (0..10).map(|key| (key, key * key)).collect();
        let mixed: OrderedMap<i32, i32> = [5, 2, 8, 0, 9, 1, 7, 3, 6, 4]
            .into_iter()
            .map(|key| (key, key * key))
            .collect();
        assert_eq!(ascending, mixed);

        let mut other = mixed.clone();
        *other.value_of_mut(&4).unwrap() = -1;
        assert_ne!(ascending, other);
    }

    #[test]
    fn from_iter_first_occurrence_wins() {
        let map: OrderedMap<i32, &str> = [(1, "a"), (2, "b"), (1, "dup")].into_iter().collect();
        assert_eq!(map.len(), 2);
        assert_eq!(map.value_of(&1), Ok(&"a"));
    }

    #[test]
    fn take_resets_the_source_to_empty() {
        let mut map = sample();
        let moved = std::mem::take(&mut map);

        assert_eq!(moved.len(), 7);
        assert!(map.is_empty());
        assert_eq!(map.begin(), map.end());
    }

    #[test]
    fn cursor_to_a_removed_entry_is_rejected() {
        let mut map = OrderedMap::from([(1, 1), (2, 2)]);
        let cursor = map.find(&1);
        map.remove(&1).unwrap();

        assert_eq!(map.remove_at(cursor), Err(Error::InvalidIterator));
        assert_eq!(cursor.entry(&map), Err(Error::OutOfRange));
        assert_eq!(map.len(), 1);
    }

    #[proptest(fork = false)]
    fn degenerate_chain_still_orders(#[strategy(sorted_keys::<u16>(1..64))] keys: Vec<u16>) {
        // Ascending insertion builds the worst-case right spine.
        let map: OrderedMap<u16, ()> = keys.iter().map(|&key| (key, ())).collect();
        prop_assert_eq!(map.len(), keys.len());
        prop_assert!(map.iter().map(|(key, _)| *key).eq(keys.iter().copied()));
    }
}
