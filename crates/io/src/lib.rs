// File I/O: claim datasets in, filled Word documents out

pub mod csv;
pub mod dataset;
pub mod docx;
pub mod error;
pub mod pipeline;
pub mod render;
pub mod writer;
pub mod xlsx;
pub mod xml_tree;

pub use dataset::{load, Dataset};
pub use docx::{DocxTemplate, RenderedDocument};
pub use error::{LoadError, PipelineError, TemplateError, WriteError};
pub use pipeline::{
    list_keys, preview, run, GenerateReport, GeneratedDocument, GroupPreview, KeyListing, Preview,
};
pub use render::render;
pub use writer::write;
