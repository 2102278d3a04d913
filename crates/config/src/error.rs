use std::fmt;
use std::path::PathBuf;

use claimdoc_engine::DocumentRole;

#[derive(Debug)]
pub enum ConfigError {
    /// Job file could not be read.
    Read { path: PathBuf, message: String },
    /// TOML parse / deserialization error.
    Parse(String),
    /// A required setting was not given in the file or on the command line.
    Missing(&'static str),
    /// Neither a COD nor an Email template was configured.
    NoTemplates,
    /// A selected purchase order is not numeric.
    InvalidKey(String),
    /// Date override not in YYYY/MM/DD or YYYY-MM-DD form.
    InvalidDate(String),
    /// Output filename pattern rejected.
    InvalidPattern { role: DocumentRole, pattern: String, reason: &'static str },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Read { path, message } => {
                write!(f, "cannot read job file {}: {message}", path.display())
            }
            Self::Parse(msg) => write!(f, "job file parse error: {msg}"),
            Self::Missing(setting) => write!(f, "missing required setting: {setting}"),
            Self::NoTemplates => write!(f, "at least one of cod_template / email_template is required"),
            Self::InvalidKey(msg) => write!(f, "invalid purchase order selection: {msg}"),
            Self::InvalidDate(value) => {
                write!(f, "invalid date '{value}' (expected YYYY/MM/DD)")
            }
            Self::InvalidPattern { role, pattern, reason } => {
                write!(f, "{role} filename pattern '{pattern}': {reason}")
            }
        }
    }
}

impl std::error::Error for ConfigError {}
