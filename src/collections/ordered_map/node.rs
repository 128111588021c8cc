/// Storage for a single key/value pair plus its tree links.
///
/// Links are arena slot indices rather than references: a child is owned
/// through the slot it indexes, while the parent link is a non-owning
/// back-reference used only for traversal and relinking.
#[derive(Debug, Clone)]
pub(crate) struct Node<K, V> {
    pub(crate) key: K,
    pub(crate) value: V,
    pub(crate) parent: Option<u32>,
    pub(crate) left: Option<u32>,
    pub(crate) right: Option<u32>,
}

impl<K, V> Node<K, V> {
    pub(crate) fn new(key: K, value: V) -> Self {
        Self {
            key,
            value,
            parent: None,
            left: None,
            right: None,
        }
    }
}
