//! Word (.docx) packages: load a template once, emit filled copies.
//!
//! Only `word/document.xml` is parsed. Every other part (styles, headers,
//! media, relationships) is carried as raw bytes and written back unchanged,
//! in the original entry order.

use std::io::{Cursor, Read, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use crate::error::TemplateError;
use crate::xml_tree::XmlDocument;

pub const DOCUMENT_PART: &str = "word/document.xml";

#[derive(Debug, Clone)]
struct Part {
    name: String,
    compression: CompressionMethod,
    last_modified: Option<zip::DateTime>,
    content: PartContent,
}

#[derive(Debug, Clone)]
enum PartContent {
    Directory,
    Bytes(Vec<u8>),
    /// Placeholder for the main document, stored separately as a tree.
    Document,
}

/// A loaded template. Read-only once loaded; each render works on a copy.
#[derive(Debug, Clone)]
pub struct DocxTemplate {
    path: PathBuf,
    parts: Arc<Vec<Part>>,
    document: XmlDocument,
}

impl DocxTemplate {
    pub fn load(path: &Path) -> Result<Self, TemplateError> {
        let bytes = std::fs::read(path).map_err(|e| TemplateError::Open {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        let template = Self::from_bytes(path, bytes)?;
        log::debug!("loaded template {}", path.display());
        Ok(template)
    }

    /// Parse an in-memory package. `path` is only used in error messages.
    pub fn from_bytes(path: &Path, bytes: Vec<u8>) -> Result<Self, TemplateError> {
        let archive_err = |e: zip::result::ZipError| TemplateError::Archive {
            path: path.to_path_buf(),
            message: e.to_string(),
        };
        let mut archive = ZipArchive::new(Cursor::new(bytes)).map_err(archive_err)?;

        let mut parts = Vec::with_capacity(archive.len());
        let mut document = None;

        for i in 0..archive.len() {
            let mut file = archive.by_index(i).map_err(archive_err)?;
            let name = file.name().to_string();
            let compression = file.compression();
            let last_modified = file.last_modified();

            let content = if file.is_dir() {
                PartContent::Directory
            } else {
                let mut data = Vec::new();
                file.read_to_end(&mut data).map_err(|e| TemplateError::Archive {
                    path: path.to_path_buf(),
                    message: format!("{name}: {e}"),
                })?;
                if name == DOCUMENT_PART {
                    let xml = String::from_utf8(data).map_err(|e| TemplateError::Xml {
                        path: path.to_path_buf(),
                        message: e.to_string(),
                    })?;
                    let tree = XmlDocument::parse(&xml).map_err(|message| TemplateError::Xml {
                        path: path.to_path_buf(),
                        message,
                    })?;
                    document = Some(tree);
                    PartContent::Document
                } else {
                    PartContent::Bytes(data)
                }
            };

            parts.push(Part {
                name,
                compression,
                last_modified,
                content,
            });
        }

        let document = document.ok_or_else(|| TemplateError::MissingPart {
            path: path.to_path_buf(),
            part: DOCUMENT_PART,
        })?;

        Ok(Self {
            path: path.to_path_buf(),
            parts: Arc::new(parts),
            document,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn document(&self) -> &XmlDocument {
        &self.document
    }

    /// Independent copy of the document for filling. Package parts are shared.
    pub fn instantiate(&self) -> RenderedDocument {
        RenderedDocument {
            parts: Arc::clone(&self.parts),
            document: self.document.clone(),
        }
    }
}

/// A filled document ready to be written.
#[derive(Debug, Clone)]
pub struct RenderedDocument {
    parts: Arc<Vec<Part>>,
    pub(crate) document: XmlDocument,
}

impl RenderedDocument {
    pub fn document(&self) -> &XmlDocument {
        &self.document
    }

    #[cfg(test)]
    pub(crate) fn document_xml(&self) -> String {
        String::from_utf8(self.document.to_bytes().unwrap()).unwrap()
    }

    /// Serialize the package to `.docx` bytes.
    pub fn to_bytes(&self) -> Result<Vec<u8>, zip::result::ZipError> {
        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));

        for part in self.parts.iter() {
            let method = match part.compression {
                CompressionMethod::Stored => CompressionMethod::Stored,
                _ => CompressionMethod::Deflated,
            };
            let mut options = SimpleFileOptions::default().compression_method(method);
            if let Some(modified) = part.last_modified {
                options = options.last_modified_time(modified);
            }

            match &part.content {
                PartContent::Directory => zip.add_directory(part.name.as_str(), options)?,
                PartContent::Bytes(data) => {
                    zip.start_file(part.name.as_str(), options)?;
                    zip.write_all(data)?;
                }
                PartContent::Document => {
                    zip.start_file(part.name.as_str(), options)?;
                    zip.write_all(&self.document.to_bytes()?)?;
                }
            }
        }

        Ok(zip.finish()?.into_inner())
    }
}
