use thiserror::Error as ThisError;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ThisError)]
pub enum Error {
    #[error("key not found")]
    KeyNotFound,

    #[error("iterator does not belong to this map or points past the end")]
    InvalidIterator,

    #[error("iterator stepped out of range")]
    OutOfRange,
}
