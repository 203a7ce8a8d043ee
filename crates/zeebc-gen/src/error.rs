//! Error type for output-file handling.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Failures while writing the generated C file.
#[derive(Debug, Error)]
pub enum EmitError {
    /// The output path could not be opened for writing.
    #[error("Failed to open file for writing : {}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Writing or flushing the output failed.
    #[error("Failed to write output file : {}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}
