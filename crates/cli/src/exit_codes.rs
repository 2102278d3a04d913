//! CLI exit code registry.
//!
//! Scripts branch on these, so they are part of the command-line contract.
//!
//! | Code | Meaning                                          |
//! |------|--------------------------------------------------|
//! | 0    | Success                                          |
//! | 1    | Unspecified failure (e.g. stdout closed)         |
//! | 2    | Usage or job configuration error                 |
//! | 3    | Dataset could not be loaded                      |
//! | 4    | Template could not be loaded                     |
//! | 5    | Output could not be written                      |
//! | 6    | Data error (selected purchase order has no rows) |

use claimdoc_io::PipelineError;

pub const EXIT_SUCCESS: u8 = 0;

pub const EXIT_ERROR: u8 = 1;

/// Bad arguments, unreadable or invalid job file, bad filename pattern.
pub const EXIT_USAGE: u8 = 2;

pub const EXIT_LOAD: u8 = 3;

pub const EXIT_TEMPLATE: u8 = 4;

/// Missing output directory or failed file write.
pub const EXIT_WRITE: u8 = 5;

pub const EXIT_DATA: u8 = 6;

pub fn pipeline_exit_code(err: &PipelineError) -> u8 {
    match err {
        PipelineError::Load(_) => EXIT_LOAD,
        PipelineError::Template(_) => EXIT_TEMPLATE,
        PipelineError::Write(_) => EXIT_WRITE,
        PipelineError::Data(_) => EXIT_DATA,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use claimdoc_engine::{DataError, PoKey};
    use claimdoc_io::WriteError;

    #[test]
    fn codes_are_distinct() {
        let codes = [EXIT_SUCCESS, EXIT_ERROR, EXIT_USAGE, EXIT_LOAD, EXIT_TEMPLATE, EXIT_WRITE, EXIT_DATA];
        let unique: std::collections::BTreeSet<_> = codes.iter().collect();
        assert_eq!(unique.len(), codes.len());
    }

    #[test]
    fn pipeline_errors_map_to_their_category() {
        let key = PoKey::new(1.0).unwrap();
        assert_eq!(pipeline_exit_code(&DataError::UnknownKey { key }.into()), EXIT_DATA);
        let write = WriteError::MissingDirectory { path: "out".into() };
        assert_eq!(pipeline_exit_code(&write.into()), EXIT_WRITE);
    }
}
