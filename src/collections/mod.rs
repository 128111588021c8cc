mod ordered_map;

pub use ordered_map::{Cursor, CursorMut, IntoIter, Iter, OrderedMap};
