use chrono::NaiveDate;
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

use crate::aggregate::ClaimFields;

pub const DATE: &str = "<DATE>";
pub const PO: &str = "<PO>";
pub const INVOICE_NO: &str = "<INVOICE_NO>";
pub const PRODUCT_CODE: &str = "<PRODUCT_CODE>";
pub const DAMAGE: &str = "<DAMAGE>";
pub const BATCH_NUMBER: &str = "<BATCH_NUMBER>";
pub const REASON: &str = "<REASON>";
pub const COMPLAINT: &str = "<COMPLAINT>";
pub const INVOICE_NUM: &str = "<INVOICE_NUM>";
pub const BAG_NUM: &str = "<BAG_NUM>";
pub const VALUE: &str = "<VALUE>";

/// Date format used for `<DATE>`.
pub const DATE_FORMAT: &str = "%Y/%m/%d";

/// Which document of a claim set a template produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentRole {
    /// Certificate of Damage.
    Cod,
    /// Email / complaint summary.
    Email,
}

impl DocumentRole {
    pub const ALL: [DocumentRole; 2] = [DocumentRole::Cod, DocumentRole::Email];

    pub fn label(&self) -> &'static str {
        match self {
            Self::Cod => "COD",
            Self::Email => "Email",
        }
    }

    pub fn default_filename_pattern(&self) -> &'static str {
        match self {
            Self::Cod => "COD {po}.docx",
            Self::Email => "Email {po}.docx",
        }
    }

    /// Tokens this role's map fills.
    pub fn vocabulary(&self) -> &'static [&'static str] {
        match self {
            Self::Cod => &[DATE, PO, INVOICE_NO, PRODUCT_CODE, DAMAGE, BATCH_NUMBER, REASON],
            Self::Email => &[REASON, COMPLAINT, PO, INVOICE_NUM, BAG_NUM, VALUE],
        }
    }

    pub fn placeholder_map(&self, fields: &ClaimFields, date: NaiveDate) -> PlaceholderMap {
        match self {
            Self::Cod => cod_map(fields, date),
            Self::Email => email_map(fields),
        }
    }
}

impl std::fmt::Display for DocumentRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Token → replacement, iterated in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlaceholderMap {
    entries: Vec<(String, String)>,
}

impl PlaceholderMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace. A replaced token keeps its original position.
    pub fn insert(&mut self, token: impl Into<String>, value: impl Into<String>) {
        let token = token.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(t, _)| *t == token) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((token, value)),
        }
    }

    pub fn get(&self, token: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(t, _)| t == token)
            .map(|(_, v)| v.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(t, v)| (t.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for PlaceholderMap {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut map = PlaceholderMap::new();
        for (k, v) in iter {
            map.insert(k, v);
        }
        map
    }
}

impl Serialize for PlaceholderMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (token, value) in &self.entries {
            map.serialize_entry(token, value)?;
        }
        map.end()
    }
}

pub fn cod_map(fields: &ClaimFields, date: NaiveDate) -> PlaceholderMap {
    PlaceholderMap::from_iter([
        (DATE, date.format(DATE_FORMAT).to_string()),
        (PO, fields.po_display.clone()),
        (INVOICE_NO, fields.invoice_list.clone()),
        (PRODUCT_CODE, fields.product_code_list.clone()),
        (DAMAGE, fields.damage_narrative.clone()),
        (BATCH_NUMBER, fields.batch_number_list.clone()),
        (REASON, fields.reason_list.clone()),
    ])
}

/// `<REASON>` here is the per-reason summary sentence, not the COD reason list.
pub fn email_map(fields: &ClaimFields) -> PlaceholderMap {
    PlaceholderMap::from_iter([
        (REASON, fields.reason_summary_narrative.clone()),
        (COMPLAINT, fields.complaint_list.clone()),
        (PO, fields.po_display.clone()),
        (INVOICE_NUM, fields.invoice_list.clone()),
        (BAG_NUM, fields.bag_count.to_string()),
        (VALUE, fields.total_value_display()),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields() -> ClaimFields {
        ClaimFields {
            po_display: "4500".into(),
            damage_narrative: "2 bags Torn (B-1)".into(),
            reason_summary_narrative: "2 bags are found Torn, and 5 bags are found Shortage".into(),
            invoice_list: "INV-1, INV-2".into(),
            product_code_list: "P-1".into(),
            reason_list: "Torn".into(),
            complaint_list: "Replace".into(),
            batch_number_list: "B-1".into(),
            bag_count: 2,
            total_value: 10.5,
        }
    }

    #[test]
    fn cod_map_in_vocabulary_order() {
        let date = NaiveDate::from_ymd_opt(2026, 3, 7).unwrap();
        let map = cod_map(&fields(), date);
        let tokens: Vec<&str> = map.iter().map(|(t, _)| t).collect();
        assert_eq!(tokens, DocumentRole::Cod.vocabulary());
        assert_eq!(map.get(DATE), Some("2026/03/07"));
        assert_eq!(map.get(REASON), Some("Torn"));
        assert_eq!(map.get(DAMAGE), Some("2 bags Torn (B-1)"));
    }

    #[test]
    fn email_reason_is_summary_sentence() {
        let map = email_map(&fields());
        let tokens: Vec<&str> = map.iter().map(|(t, _)| t).collect();
        assert_eq!(tokens, DocumentRole::Email.vocabulary());
        assert_eq!(
            map.get(REASON),
            Some("2 bags are found Torn, and 5 bags are found Shortage")
        );
        assert_eq!(map.get(BAG_NUM), Some("2"));
        assert_eq!(map.get(VALUE), Some("10.50"));
        assert_eq!(map.get(INVOICE_NO), None);
    }

    #[test]
    fn insert_replaces_in_place() {
        let mut map = PlaceholderMap::new();
        map.insert("<A>", "1");
        map.insert("<B>", "2");
        map.insert("<A>", "3");
        let entries: Vec<(&str, &str)> = map.iter().collect();
        assert_eq!(entries, vec![("<A>", "3"), ("<B>", "2")]);
    }

    #[test]
    fn serializes_as_ordered_object() {
        let map: PlaceholderMap = [("<Z>", "z"), ("<A>", "a")].into_iter().collect();
        assert_eq!(serde_json::to_string(&map).unwrap(), r#"{"<Z>":"z","<A>":"a"}"#);
    }

    #[test]
    fn role_labels() {
        assert_eq!(DocumentRole::Cod.to_string(), "COD");
        assert_eq!(DocumentRole::Email.default_filename_pattern(), "Email {po}.docx");
    }
}
