//! Derived display fields for one purchase-order group.
//!
//! Formatting rules:
//! - quantities print as integers, truncated toward zero;
//! - set-like lists are deduplicated, empty values skipped, joined in
//!   lexicographic order;
//! - `total_value` is rounded to cents half away from zero.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use crate::model::{Group, ReasonTotal, Record};

/// Every value the placeholder maps draw from.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClaimFields {
    pub po_display: String,
    pub damage_narrative: String,
    pub reason_summary_narrative: String,
    pub invoice_list: String,
    pub product_code_list: String,
    pub reason_list: String,
    pub complaint_list: String,
    pub batch_number_list: String,
    pub bag_count: i64,
    pub total_value: f64,
}

impl ClaimFields {
    /// `total_value` with exactly two decimals.
    pub fn total_value_display(&self) -> String {
        format!("{:.2}", self.total_value)
    }
}

pub fn aggregate(group: &Group) -> ClaimFields {
    let all = group.records();
    let filtered = group.filtered();
    let damaged = filtered.records();

    let damage_narrative = damaged
        .iter()
        .map(|r| format!("{} bags {} ({})", quantity(r.damage), r.reason, r.batch_number))
        .collect::<Vec<_>>()
        .join(", ");

    let batch_number_list = damaged
        .iter()
        .map(|r| r.batch_number.as_str())
        .collect::<Vec<_>>()
        .join(" / ");

    let bag_count = quantity(damaged.iter().map(|r| r.damage).sum());

    ClaimFields {
        po_display: group.key().to_string(),
        damage_narrative,
        reason_summary_narrative: reason_summary_narrative(&reason_summary(group)),
        invoice_list: distinct_join(all.iter().map(|r| r.invoice_no.as_str())),
        product_code_list: distinct_join(all.iter().map(|r| r.product_code.as_str())),
        reason_list: distinct_join(damaged.iter().map(|r| r.reason.as_str())),
        complaint_list: distinct_join(all.iter().map(|r| r.complaint.as_str())),
        batch_number_list,
        bag_count,
        total_value: round_cents(all.iter().map(|r: &Record| r.good_value).sum()),
    }
}

/// Full group (Shortage/Extra included) summed per reason, reasons in
/// lexicographic order.
pub fn reason_summary(group: &Group) -> Vec<ReasonTotal> {
    let mut totals: BTreeMap<&str, f64> = BTreeMap::new();
    for record in group.records() {
        *totals.entry(record.reason.as_str()).or_insert(0.0) += record.damage;
    }

    totals
        .into_iter()
        .map(|(reason, quantity)| ReasonTotal {
            reason: reason.to_string(),
            quantity,
        })
        .collect()
}

pub fn reason_summary_narrative(totals: &[ReasonTotal]) -> String {
    totals
        .iter()
        .map(|t| format!("{} bags are found {}", quantity(t.quantity), t.reason))
        .collect::<Vec<_>>()
        .join(", and ")
}

/// Round to two decimals, half away from zero.
///
/// Cents are first snapped to six decimals so that amounts typed as exact
/// halves (`1.005`) round up even when their binary value sits just below.
/// Never returns negative zero.
pub fn round_cents(value: f64) -> f64 {
    let cents = (value * 100.0 * 1e6).round() / 1e6;
    cents.round() / 100.0 + 0.0
}

fn quantity(value: f64) -> i64 {
    value.trunc() as i64
}

fn distinct_join<'a>(values: impl Iterator<Item = &'a str>) -> String {
    values
        .filter(|v| !v.is_empty())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect::<Vec<_>>()
        .join(", ")
}
