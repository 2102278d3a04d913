// Output writer: rendered document -> <dir>/<filename>

use std::path::{Path, PathBuf};

use crate::docx::RenderedDocument;
use crate::error::WriteError;

/// Write `doc` as `directory/filename`, replacing any existing file.
pub fn write(doc: &RenderedDocument, directory: &Path, filename: &str) -> Result<PathBuf, WriteError> {
    if !directory.is_dir() {
        return Err(WriteError::MissingDirectory {
            path: directory.to_path_buf(),
        });
    }

    let path = directory.join(filename);
    let io_err = |message: String| WriteError::Io {
        path: path.clone(),
        message,
    };

    let bytes = doc.to_bytes().map_err(|e| io_err(e.to_string()))?;
    std::fs::write(&path, bytes).map_err(|e| io_err(e.to_string()))?;

    log::info!("wrote {}", path.display());
    Ok(path)
}
