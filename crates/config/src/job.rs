// Job settings: one dataset, up to two templates, an output directory.
// Loaded from a TOML job file, then overridden by command-line flags.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use claimdoc_engine::{DocumentRole, PoKey};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

const PO_SLOT: &str = "{po}";

// ---------------------------------------------------------------------------
// Raw job file
// ---------------------------------------------------------------------------

/// Job settings as written in a `.toml` job file. Every field is optional so
/// the command line can fill the gaps.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct JobConfig {
    /// Spreadsheet (xlsx/xls/xlsb/ods) or csv/tsv file.
    pub dataset: Option<PathBuf>,

    /// Worksheet name; first sheet when absent.
    pub sheet: Option<String>,

    pub cod_template: Option<PathBuf>,

    pub email_template: Option<PathBuf>,

    pub output_dir: Option<PathBuf>,

    /// Purchase orders to generate. Empty = every PO in the dataset.
    pub purchase_orders: Vec<KeyValue>,

    /// Fixed `<DATE>` value; today when absent.
    pub date: Option<String>,

    pub filenames: FilenameSettings,
}

/// A PO written either as a TOML number or a string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum KeyValue {
    Int(i64),
    Float(f64),
    Text(String),
}

impl KeyValue {
    fn to_key(&self) -> Result<PoKey, ConfigError> {
        match self {
            Self::Int(n) => PoKey::new(*n as f64).ok_or_else(|| ConfigError::InvalidKey(n.to_string())),
            Self::Float(n) => PoKey::new(*n).ok_or_else(|| ConfigError::InvalidKey(n.to_string())),
            Self::Text(s) => s.parse().map_err(ConfigError::InvalidKey),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FilenameSettings {
    pub cod: String,
    pub email: String,
}

impl Default for FilenameSettings {
    fn default() -> Self {
        Self {
            cod: DocumentRole::Cod.default_filename_pattern().to_string(),
            email: DocumentRole::Email.default_filename_pattern().to_string(),
        }
    }
}

impl JobConfig {
    pub fn from_toml(input: &str) -> Result<Self, ConfigError> {
        toml::from_str(input).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Read a job file. Relative paths inside it resolve against the file's
    /// directory.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let input = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        let mut config = Self::from_toml(&input)?;
        let base = path.parent().unwrap_or_else(|| Path::new("."));
        config.resolve_relative_to(base);
        log::debug!("loaded job file {}", path.display());
        Ok(config)
    }

    pub fn resolve_relative_to(&mut self, base: &Path) {
        for slot in [
            &mut self.dataset,
            &mut self.cod_template,
            &mut self.email_template,
            &mut self.output_dir,
        ] {
            if let Some(p) = slot.as_mut() {
                if p.is_relative() {
                    *p = base.join(&*p);
                }
            }
        }
    }

    pub fn dataset_source(&self) -> Result<DatasetSource, ConfigError> {
        let path = self.dataset.clone().ok_or(ConfigError::Missing("dataset"))?;
        Ok(DatasetSource {
            path,
            sheet: self.sheet.clone(),
        })
    }

    /// `None` means every purchase order.
    pub fn selection(&self) -> Result<Option<BTreeSet<PoKey>>, ConfigError> {
        if self.purchase_orders.is_empty() {
            return Ok(None);
        }
        let keys = self
            .purchase_orders
            .iter()
            .map(KeyValue::to_key)
            .collect::<Result<BTreeSet<_>, _>>()?;
        Ok(Some(keys))
    }

    /// Configured date, or today's local date.
    pub fn date(&self) -> Result<NaiveDate, ConfigError> {
        match self.date.as_deref() {
            Some(s) => parse_date(s),
            None => Ok(chrono::Local::now().date_naive()),
        }
    }

    pub fn templates(&self) -> Result<Vec<TemplateSpec>, ConfigError> {
        let mut specs = Vec::new();
        for role in DocumentRole::ALL {
            let (path, pattern) = match role {
                DocumentRole::Cod => (&self.cod_template, &self.filenames.cod),
                DocumentRole::Email => (&self.email_template, &self.filenames.email),
            };
            if let Some(path) = path {
                specs.push(TemplateSpec {
                    role,
                    path: path.clone(),
                    filename: FilenamePattern::new(role, pattern)?,
                });
            }
        }
        if specs.is_empty() {
            return Err(ConfigError::NoTemplates);
        }
        Ok(specs)
    }

    /// Resolve into a runnable job. Fails on the first missing or bad setting.
    pub fn validate(&self) -> Result<Job, ConfigError> {
        let dataset = self.dataset_source()?;
        let templates = self.templates()?;
        let output_dir = self
            .output_dir
            .clone()
            .ok_or(ConfigError::Missing("output_dir"))?;
        Ok(Job {
            dataset,
            templates,
            output_dir,
            selection: self.selection()?,
            date: self.date()?,
        })
    }
}

fn parse_date(s: &str) -> Result<NaiveDate, ConfigError> {
    let s = s.trim();
    NaiveDate::parse_from_str(s, "%Y/%m/%d")
        .or_else(|_| NaiveDate::parse_from_str(s, "%Y-%m-%d"))
        .map_err(|_| ConfigError::InvalidDate(s.to_string()))
}

// ---------------------------------------------------------------------------
// Validated job
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct DatasetSource {
    pub path: PathBuf,
    pub sheet: Option<String>,
}

/// Output filename with a `{po}` slot, e.g. `COD {po}.docx`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilenamePattern(String);

impl FilenamePattern {
    pub fn new(role: DocumentRole, pattern: &str) -> Result<Self, ConfigError> {
        let invalid = |reason| ConfigError::InvalidPattern {
            role,
            pattern: pattern.to_string(),
            reason,
        };
        if !pattern.contains(PO_SLOT) {
            return Err(invalid("must contain {po}"));
        }
        if pattern.contains('/') || pattern.contains('\\') {
            return Err(invalid("must be a file name, not a path"));
        }
        Ok(Self(pattern.to_string()))
    }

    pub fn render(&self, key: PoKey) -> String {
        self.0.replace(PO_SLOT, &key.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TemplateSpec {
    pub role: DocumentRole,
    pub path: PathBuf,
    pub filename: FilenamePattern,
}

/// Everything the pipeline needs, fully resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct Job {
    pub dataset: DatasetSource,
    pub templates: Vec<TemplateSpec>,
    pub output_dir: PathBuf,
    pub selection: Option<BTreeSet<PoKey>>,
    pub date: NaiveDate,
}

#[cfg(test)]
mod tests {
    use super::*;

    const FULL: &str = r#"
dataset = "claims.xlsx"
sheet = "May"
cod_template = "templates/cod.docx"
email_template = "templates/email.docx"
output_dir = "out"
purchase_orders = [4500123, "4500124", 4500125.0]
date = "2026/05/31"

[filenames]
cod = "Filled COD Sample {po}.docx"
"#;

    fn key(v: f64) -> PoKey {
        PoKey::new(v).unwrap()
    }

    #[test]
    fn parse_full_job() {
        let config = JobConfig::from_toml(FULL).unwrap();
        assert_eq!(config.sheet.as_deref(), Some("May"));
        assert_eq!(config.filenames.cod, "Filled COD Sample {po}.docx");
        assert_eq!(config.filenames.email, "Email {po}.docx");

        let job = config.validate().unwrap();
        assert_eq!(job.templates.len(), 2);
        assert_eq!(job.templates[0].role, DocumentRole::Cod);
        assert_eq!(job.templates[0].filename.render(key(4500123.0)), "Filled COD Sample 4500123.docx");
        assert_eq!(job.date, NaiveDate::from_ymd_opt(2026, 5, 31).unwrap());

        let selection = job.selection.unwrap();
        assert_eq!(
            selection.into_iter().collect::<Vec<_>>(),
            vec![key(4500123.0), key(4500124.0), key(4500125.0)]
        );
    }

    #[test]
    fn empty_selection_means_all() {
        let config = JobConfig::default();
        assert_eq!(config.selection().unwrap(), None);
    }

    #[test]
    fn rejects_unknown_fields() {
        let err = JobConfig::from_toml("datasets = \"x.xlsx\"").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn rejects_non_numeric_selection() {
        let config = JobConfig::from_toml(r#"purchase_orders = ["N/A"]"#).unwrap();
        assert!(matches!(config.selection(), Err(ConfigError::InvalidKey(_))));
    }

    #[test]
    fn requires_a_template() {
        let config = JobConfig {
            dataset: Some("d.csv".into()),
            output_dir: Some("out".into()),
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::NoTemplates)));
    }

    #[test]
    fn requires_output_dir() {
        let config = JobConfig {
            dataset: Some("d.csv".into()),
            email_template: Some("e.docx".into()),
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::Missing("output_dir"))));
    }

    #[test]
    fn pattern_needs_po_slot_and_no_separators() {
        assert!(FilenamePattern::new(DocumentRole::Cod, "COD.docx").is_err());
        assert!(FilenamePattern::new(DocumentRole::Cod, "sub/COD {po}.docx").is_err());
        let p = FilenamePattern::new(DocumentRole::Email, "{po}-{po}.docx").unwrap();
        assert_eq!(p.render(key(12.9)), "12-12.docx");
    }

    #[test]
    fn date_formats() {
        assert_eq!(parse_date("2026-01-02").unwrap(), NaiveDate::from_ymd_opt(2026, 1, 2).unwrap());
        assert_eq!(parse_date(" 2026/01/02 ").unwrap(), NaiveDate::from_ymd_opt(2026, 1, 2).unwrap());
        assert!(matches!(parse_date("02.01.2026"), Err(ConfigError::InvalidDate(_))));
    }

    #[test]
    fn load_resolves_relative_paths() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("job.toml");
        std::fs::write(&path, FULL).unwrap();

        let config = JobConfig::load(&path).unwrap();
        assert_eq!(config.dataset.unwrap(), dir.path().join("claims.xlsx"));
        assert_eq!(config.output_dir.unwrap(), dir.path().join("out"));
    }

    #[test]
    fn load_missing_file() {
        let err = JobConfig::load(Path::new("/nonexistent/claimdoc/job.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
