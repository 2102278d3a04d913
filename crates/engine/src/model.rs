use std::fmt;
use std::str::FromStr;

use ordered_float::OrderedFloat;
use serde::{Serialize, Serializer};

use crate::error::DataError;

/// Reason recorded for a short delivery. Not physical damage.
pub const REASON_SHORTAGE: &str = "Shortage";
/// Reason recorded for an over-delivery. Not physical damage.
pub const REASON_EXTRA: &str = "Extra";

// ---------------------------------------------------------------------------
// Purchase-order key
// ---------------------------------------------------------------------------

/// Numeric purchase-order identifier.
///
/// Source sheets carry POs as floats, so keys compare by exact numeric value:
/// `100` and `100.0` are the same key while `100.5` is a different one. Only
/// finite values can be keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PoKey(OrderedFloat<f64>);

impl PoKey {
    pub fn new(value: f64) -> Option<Self> {
        value.is_finite().then_some(Self(OrderedFloat(value)))
    }

    pub fn value(&self) -> f64 {
        self.0.into_inner()
    }

    /// Integer part, truncated toward zero. Used in document text and filenames.
    pub fn truncated(&self) -> i64 {
        self.value().trunc() as i64
    }
}

impl fmt::Display for PoKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.truncated())
    }
}

impl FromStr for PoKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        trimmed
            .parse::<f64>()
            .ok()
            .and_then(PoKey::new)
            .ok_or_else(|| format!("not a numeric purchase order: '{trimmed}'"))
    }
}

impl Serialize for PoKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.value())
    }
}

// ---------------------------------------------------------------------------
// Record
// ---------------------------------------------------------------------------

/// One cleaned dataset row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Record {
    /// 1-based row number in the source sheet (header is row 1).
    pub row: usize,
    pub po: PoKey,
    pub invoice_no: String,
    pub product_code: String,
    pub damage: f64,
    pub batch_number: String,
    pub reason: String,
    pub complaint: String,
    pub good_value: f64,
}

impl Record {
    /// Shortage and Extra rows describe quantity discrepancies, not damage.
    pub fn is_quantity_discrepancy(&self) -> bool {
        self.reason == REASON_SHORTAGE || self.reason == REASON_EXTRA
    }
}

// ---------------------------------------------------------------------------
// Groups
// ---------------------------------------------------------------------------

/// All records sharing one purchase-order key. Never empty.
#[derive(Debug, Clone, PartialEq)]
pub struct Group {
    key: PoKey,
    records: Vec<Record>,
}

impl Group {
    pub fn new(key: PoKey, records: Vec<Record>) -> Result<Self, DataError> {
        if records.is_empty() {
            return Err(DataError::EmptyGroup { key });
        }
        if let Some(stray) = records.iter().find(|r| r.po != key) {
            return Err(DataError::KeyMismatch {
                key,
                row: stray.row,
                found: stray.po,
            });
        }
        Ok(Self { key, records })
    }

    /// Caller guarantees `records` is non-empty and keyed by `key`.
    pub(crate) fn from_parts(key: PoKey, records: Vec<Record>) -> Self {
        debug_assert!(!records.is_empty());
        Self { key, records }
    }

    pub fn key(&self) -> PoKey {
        self.key
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Rows that describe physical damage, in original row order.
    pub fn filtered(&self) -> FilteredGroup<'_> {
        FilteredGroup {
            records: self
                .records
                .iter()
                .filter(|r| !r.is_quantity_discrepancy())
                .collect(),
        }
    }
}

/// A group minus its Shortage/Extra rows. May be empty.
#[derive(Debug, Clone)]
pub struct FilteredGroup<'a> {
    records: Vec<&'a Record>,
}

impl<'a> FilteredGroup<'a> {
    pub fn records(&self) -> &[&'a Record] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Damage quantity summed over one distinct reason.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReasonTotal {
    pub reason: String,
    pub quantity: f64,
}
