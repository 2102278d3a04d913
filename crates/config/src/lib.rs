// Job configuration loading

pub mod error;
pub mod job;

pub use error::ConfigError;
pub use job::{DatasetSource, FilenamePattern, Job, JobConfig, TemplateSpec};
