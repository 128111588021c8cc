use super::OrderedMap;
use crate::error::{Error, Result};

/// A detached position inside one specific [`OrderedMap`].
///
/// A cursor stores only the identity of the map that produced it plus an
/// opaque node slot; every navigation or access step revalidates against the
/// owning map. `Cursor::default()` is the unbound cursor, and a cursor with
/// no slot is the end position, one past the last entry.
///
/// Removing the entry a cursor points at invalidates it. Detection is
/// best-effort: a vacated slot is reported as an error, but a slot reused by
/// a later insertion is indistinguishable from a live position.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Cursor {
    pub(super) tree: u64,
    pub(super) node: Option<u32>,
}

impl Cursor {
    pub(super) fn new(tree: u64, node: Option<u32>) -> Self {
        Self { tree, node }
    }

    /// The node slot, provided the cursor belongs to `tree` and is not at
    /// the end position.
    pub(super) fn index_in(self, tree: u64) -> Option<u32> {
        if self.tree == tree {
            self.node
        } else {
            None
        }
    }

    /// True at the end position (and for the unbound cursor).
    pub fn is_end(self) -> bool {
        self.node.is_none()
    }

    /// Steps to the in-order successor; the successor of the last entry is
    /// the end cursor. Stepping the end cursor, an unbound cursor, or a
    /// cursor from another map fails with [`Error::OutOfRange`].
    pub fn next<K, V>(self, map: &OrderedMap<K, V>) -> Result<Self> {
        let idx = self.index_in(map.tree_id()).ok_or(Error::OutOfRange)?;
        if map.live(idx).is_none() {
            return Err(Error::OutOfRange);
        }
        Ok(Self::new(self.tree, map.successor(idx)))
    }

    /// Steps to the in-order predecessor. From the end position this is the
    /// rightmost entry (failing on an empty map); stepping before the first
    /// entry fails with [`Error::OutOfRange`].
    pub fn prev<K, V>(self, map: &OrderedMap<K, V>) -> Result<Self> {
        if self.tree != map.tree_id() {
            return Err(Error::OutOfRange);
        }
        let idx = match self.node {
            None => {
                return map
                    .last_node()
                    .map(|last| Self::new(self.tree, Some(last)))
                    .ok_or(Error::OutOfRange)
            }
            Some(idx) => idx,
        };
        if map.live(idx).is_none() {
            return Err(Error::OutOfRange);
        }
        map.predecessor(idx)
            .map(|prev| Self::new(self.tree, Some(prev)))
            .ok_or(Error::OutOfRange)
    }

    /// The key/value pair under the cursor.
    pub fn entry<'a, K, V>(self, map: &'a OrderedMap<K, V>) -> Result<(&'a K, &'a V)> {
        let idx = self.index_in(map.tree_id()).ok_or(Error::OutOfRange)?;
        map.live(idx)
            .map(|node| (&node.key, &node.value))
            .ok_or(Error::OutOfRange)
    }
}

/// A cursor holding its map mutably: the same navigation as [`Cursor`], plus
/// write access to the value under it.
pub struct CursorMut<'a, K, V> {
    map: &'a mut OrderedMap<K, V>,
    node: Option<u32>,
}

impl<'a, K, V> CursorMut<'a, K, V> {
    pub(super) fn bind(map: &'a mut OrderedMap<K, V>, cursor: Cursor) -> Result<Self> {
        if cursor.tree != map.tree_id() {
            return Err(Error::InvalidIterator);
        }
        if let Some(idx) = cursor.node {
            if map.live(idx).is_none() {
                return Err(Error::InvalidIterator);
            }
        }
        Ok(Self {
            map,
            node: cursor.node,
        })
    }

    pub fn as_cursor(&self) -> Cursor {
        Cursor::new(self.map.tree_id(), self.node)
    }

    pub fn is_end(&self) -> bool {
        self.node.is_none()
    }

    pub fn move_next(&mut self) -> Result<()> {
        self.node = self.as_cursor().next(&*self.map)?.node;
        Ok(())
    }

    pub fn move_prev(&mut self) -> Result<()> {
        self.node = self.as_cursor().prev(&*self.map)?.node;
        Ok(())
    }

    pub fn entry(&self) -> Result<(&K, &V)> {
        self.as_cursor().entry(&*self.map)
    }

    pub fn value_mut(&mut self) -> Result<&mut V> {
        let cursor = self.as_cursor();
        self.map.value_at_mut(cursor)
    }

    /// Removes the entry under the cursor and repositions to its in-order
    /// successor.
    pub fn remove_current(&mut self) -> Result<(K, V)> {
        let cursor = self.as_cursor();
        let successor = match self.node {
            Some(idx) => self.map.successor(idx),
            None => None,
        };
        let entry = self.map.remove_at(cursor)?;
        self.node = successor;
        Ok(entry)
    }
}
