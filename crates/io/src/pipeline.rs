//! Batch generation: dataset → groups → filled documents on disk.
//!
//! Strictly sequential and fail-fast. Documents written before a failure stay
//! on disk.

use std::collections::BTreeSet;
use std::path::PathBuf;

use chrono::NaiveDate;
use claimdoc_config::{DatasetSource, Job, TemplateSpec};
use claimdoc_engine::{
    aggregate, distinct_keys, group_records, ClaimFields, DataError, DocumentRole, Group,
    PlaceholderMap, PoKey, Record,
};
use serde::Serialize;

use crate::dataset;
use crate::docx::DocxTemplate;
use crate::error::{LoadError, PipelineError, TemplateError, WriteError};
use crate::render::{render, tokens_present};
use crate::writer;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GeneratedDocument {
    pub po: PoKey,
    pub role: DocumentRole,
    pub path: PathBuf,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GenerateReport {
    pub dropped_rows: usize,
    pub documents: Vec<GeneratedDocument>,
}

/// Computed values for one purchase order, without rendering.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupPreview {
    pub po: PoKey,
    pub rows: usize,
    pub fields: ClaimFields,
    pub cod: PlaceholderMap,
    pub email: PlaceholderMap,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Preview {
    pub dropped_rows: usize,
    pub groups: Vec<GroupPreview>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KeyListing {
    pub dropped_rows: usize,
    pub keys: Vec<PoKey>,
}

pub fn run(job: &Job) -> Result<GenerateReport, PipelineError> {
    let dataset = dataset::load(&job.dataset)?;
    let templates = load_templates(&job.templates)?;

    if !job.output_dir.is_dir() {
        return Err(WriteError::MissingDirectory {
            path: job.output_dir.clone(),
        }
        .into());
    }

    let groups = select_groups(dataset.records, job.selection.as_ref())?;

    let mut report = GenerateReport {
        dropped_rows: dataset.dropped_rows,
        documents: Vec::with_capacity(groups.len() * templates.len()),
    };

    for group in &groups {
        let fields = aggregate(group);
        for (spec, template) in &templates {
            let map = spec.role.placeholder_map(&fields, job.date);
            let doc = render(template, &map);
            let filename = spec.filename.render(group.key());
            let path = writer::write(&doc, &job.output_dir, &filename)?;
            report.documents.push(GeneratedDocument {
                po: group.key(),
                role: spec.role,
                path,
            });
        }
    }

    log::info!(
        "generated {} document(s) for {} purchase order(s)",
        report.documents.len(),
        groups.len()
    );
    Ok(report)
}

/// Placeholder maps per purchase order; no templates are read, nothing is written.
pub fn preview(
    source: &DatasetSource,
    selection: Option<&BTreeSet<PoKey>>,
    date: NaiveDate,
) -> Result<Preview, PipelineError> {
    let dataset = dataset::load(source)?;
    let groups = select_groups(dataset.records, selection)?;

    let groups = groups
        .iter()
        .map(|group| {
            let fields = aggregate(group);
            GroupPreview {
                po: group.key(),
                rows: group.len(),
                cod: DocumentRole::Cod.placeholder_map(&fields, date),
                email: DocumentRole::Email.placeholder_map(&fields, date),
                fields,
            }
        })
        .collect();

    Ok(Preview {
        dropped_rows: dataset.dropped_rows,
        groups,
    })
}

/// Distinct purchase orders available for selection.
pub fn list_keys(source: &DatasetSource) -> Result<KeyListing, LoadError> {
    let dataset = dataset::load(source)?;
    Ok(KeyListing {
        dropped_rows: dataset.dropped_rows,
        keys: distinct_keys(&dataset.records),
    })
}

fn load_templates(specs: &[TemplateSpec]) -> Result<Vec<(&TemplateSpec, DocxTemplate)>, TemplateError> {
    specs
        .iter()
        .map(|spec| {
            let template = DocxTemplate::load(&spec.path)?;
            if tokens_present(&template, spec.role.vocabulary()).is_empty() {
                log::warn!(
                    "{} template {} contains no {} placeholders",
                    spec.role,
                    spec.path.display(),
                    spec.role
                );
            }
            Ok((spec, template))
        })
        .collect()
}

/// Group the records, rejecting selected keys that have no rows.
fn select_groups(
    records: Vec<Record>,
    selection: Option<&BTreeSet<PoKey>>,
) -> Result<Vec<Group>, DataError> {
    if let Some(keys) = selection {
        let present: BTreeSet<PoKey> = distinct_keys(&records).into_iter().collect();
        if let Some(missing) = keys.iter().find(|k| !present.contains(k)) {
            return Err(DataError::UnknownKey { key: *missing });
        }
    }
    Ok(group_records(records, selection))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(v: f64) -> PoKey {
        PoKey::new(v).unwrap()
    }

    fn record(po: f64) -> Record {
        Record {
            row: 2,
            po: key(po),
            invoice_no: "INV".into(),
            product_code: "P".into(),
            damage: 1.0,
            batch_number: "B".into(),
            reason: "Torn".into(),
            complaint: String::new(),
            good_value: 1.0,
        }
    }

    #[test]
    fn selection_filters_groups() {
        let selection: BTreeSet<_> = [key(2.0)].into_iter().collect();
        let groups = select_groups(vec![record(1.0), record(2.0)], Some(&selection)).unwrap();
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].key(), key(2.0));
    }

    #[test]
    fn unknown_selected_key_is_a_data_error() {
        let selection: BTreeSet<_> = [key(1.0), key(3.0)].into_iter().collect();
        let err = select_groups(vec![record(1.0)], Some(&selection)).unwrap_err();
        assert_eq!(err, DataError::UnknownKey { key: key(3.0) });
    }

    #[test]
    fn no_selection_means_every_key() {
        let groups = select_groups(vec![record(2.0), record(1.0), record(2.0)], None).unwrap();
        assert_eq!(groups.iter().map(|g| g.key()).collect::<Vec<_>>(), vec![key(1.0), key(2.0)]);
    }
}
