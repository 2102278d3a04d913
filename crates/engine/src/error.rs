use std::fmt;

use crate::model::PoKey;

#[derive(Debug, Clone, PartialEq)]
pub enum DataError {
    /// A group was built from zero records.
    EmptyGroup { key: PoKey },
    /// A record was placed in a group with a different purchase order.
    KeyMismatch { key: PoKey, row: usize, found: PoKey },
    /// An explicitly selected purchase order has no rows after cleaning.
    UnknownKey { key: PoKey },
}

impl fmt::Display for DataError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyGroup { key } => write!(f, "purchase order {key}: group has no rows"),
            Self::KeyMismatch { key, row, found } => {
                write!(f, "purchase order {key}: row {row} belongs to purchase order {found}")
            }
            Self::UnknownKey { key } => {
                write!(f, "purchase order {key}: no rows in the dataset")
            }
        }
    }
}

impl std::error::Error for DataError {}
