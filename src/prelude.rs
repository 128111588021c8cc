pub use crate::{
    collections::{Cursor, CursorMut, IntoIter, Iter, OrderedMap},
    error::{Error, Result},
};
