use std::collections::{BTreeMap, BTreeSet};

use crate::model::{Group, PoKey, Record};

/// Partition records into one group per purchase-order key, ascending by key.
///
/// With `selected`, only groups whose key is in the set are kept. A selected
/// key without records is simply absent from the result. Row order inside
/// each group is the input order.
pub fn group_records<I>(records: I, selected: Option<&BTreeSet<PoKey>>) -> Vec<Group>
where
    I: IntoIterator<Item = Record>,
{
    let mut groups: BTreeMap<PoKey, Vec<Record>> = BTreeMap::new();
    let mut skipped = 0usize;

    for record in records {
        if let Some(keys) = selected {
            if !keys.contains(&record.po) {
                skipped += 1;
                continue;
            }
        }
        groups.entry(record.po).or_default().push(record);
    }

    log::debug!(
        "{} purchase-order group(s), {skipped} record(s) outside the selection",
        groups.len()
    );

    groups
        .into_iter()
        .map(|(key, rows)| Group::from_parts(key, rows))
        .collect()
}

/// Distinct keys present in the records, ascending.
pub fn distinct_keys(records: &[Record]) -> Vec<PoKey> {
    records
        .iter()
        .map(|r| r.po)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}
