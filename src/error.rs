use std::path::PathBuf;

use thiserror::Error;

/// Failures at the input boundary. The conversion core itself never fails.
#[derive(Debug, Error)]
pub enum ConvertError {
    #[error("no input source found")]
    NoSource,

    #[error("no text selected")]
    Empty,

    #[error("selected text is empty")]
    WhitespaceOnly,

    #[error("input is not valid UTF-8: {0}")]
    InvalidUtf8(#[from] std::string::FromUtf8Error),

    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
