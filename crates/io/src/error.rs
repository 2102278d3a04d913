use std::fmt;
use std::path::PathBuf;

use claimdoc_engine::DataError;

#[derive(Debug)]
pub enum LoadError {
    /// Dataset file could not be opened or parsed.
    Open { path: PathBuf, message: String },
    /// Workbook has no worksheets.
    NoSheets { path: PathBuf },
    /// Requested worksheet does not exist.
    UnknownSheet { sheet: String, available: Vec<String> },
    /// Required column absent from the header row.
    MissingColumn { column: String },
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Open { path, message } => {
                write!(f, "cannot read dataset {}: {message}", path.display())
            }
            Self::NoSheets { path } => write!(f, "{} contains no sheets", path.display()),
            Self::UnknownSheet { sheet, available } => {
                write!(f, "sheet '{sheet}' not found (available: {})", available.join(", "))
            }
            Self::MissingColumn { column } => write!(f, "missing column '{column}'"),
        }
    }
}

impl std::error::Error for LoadError {}

#[derive(Debug)]
pub enum TemplateError {
    /// Template file could not be read.
    Open { path: PathBuf, message: String },
    /// Not a readable zip package.
    Archive { path: PathBuf, message: String },
    /// Package has no `word/document.xml`.
    MissingPart { path: PathBuf, part: &'static str },
    /// Main document part is not well-formed XML.
    Xml { path: PathBuf, message: String },
}

impl fmt::Display for TemplateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Open { path, message } => {
                write!(f, "cannot read template {}: {message}", path.display())
            }
            Self::Archive { path, message } => {
                write!(f, "template {} is not a docx package: {message}", path.display())
            }
            Self::MissingPart { path, part } => {
                write!(f, "template {} has no {part}", path.display())
            }
            Self::Xml { path, message } => {
                write!(f, "template {}: malformed XML: {message}", path.display())
            }
        }
    }
}

impl std::error::Error for TemplateError {}

#[derive(Debug)]
pub enum WriteError {
    /// Output directory does not exist or is not a directory.
    MissingDirectory { path: PathBuf },
    /// Document could not be written.
    Io { path: PathBuf, message: String },
}

impl fmt::Display for WriteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingDirectory { path } => {
                write!(f, "output directory {} does not exist or is not a directory", path.display())
            }
            Self::Io { path, message } => write!(f, "cannot write {}: {message}", path.display()),
        }
    }
}

impl std::error::Error for WriteError {}

/// First failure of a generation run.
#[derive(Debug)]
pub enum PipelineError {
    Load(LoadError),
    Template(TemplateError),
    Write(WriteError),
    Data(DataError),
}

impl fmt::Display for PipelineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Load(e) => write!(f, "load error: {e}"),
            Self::Template(e) => write!(f, "template error: {e}"),
            Self::Write(e) => write!(f, "write error: {e}"),
            Self::Data(e) => write!(f, "data error: {e}"),
        }
    }
}

impl std::error::Error for PipelineError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Load(e) => Some(e),
            Self::Template(e) => Some(e),
            Self::Write(e) => Some(e),
            Self::Data(e) => Some(e),
        }
    }
}

impl From<LoadError> for PipelineError {
    fn from(e: LoadError) -> Self {
        Self::Load(e)
    }
}

impl From<TemplateError> for PipelineError {
    fn from(e: TemplateError) -> Self {
        Self::Template(e)
    }
}

impl From<WriteError> for PipelineError {
    fn from(e: WriteError) -> Self {
        Self::Write(e)
    }
}

impl From<DataError> for PipelineError {
    fn from(e: DataError) -> Self {
        Self::Data(e)
    }
}
