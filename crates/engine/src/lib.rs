//! `claimdoc-engine`: purchase-order claim aggregation.
//!
//! Pure engine crate: receives cleaned records, returns groups, derived
//! fields and placeholder maps. No file IO.

pub mod aggregate;
pub mod error;
pub mod group;
pub mod model;
pub mod placeholders;

pub use aggregate::{aggregate, ClaimFields};
pub use error::DataError;
pub use group::{distinct_keys, group_records};
pub use model::{FilteredGroup, Group, PoKey, ReasonTotal, Record};
pub use placeholders::{DocumentRole, PlaceholderMap};
