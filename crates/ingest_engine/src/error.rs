use crate::{FetchError, SourceFormat};

/// Why an extractor produced no text.
///
/// The message of every variant names the failed operation followed by the
/// root cause, so it can be shown to users as-is.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExtractError {
    #[error("Failed to fetch the URL: {0}")]
    Fetch(#[from] FetchError),
    #[error("Failed to read {format} file: {message}")]
    Read {
        format: SourceFormat,
        message: String,
    },
    #[error("Failed to parse {format} file: {message}")]
    Parse {
        format: SourceFormat,
        message: String,
    },
    #[error("Failed to recognize text: {0}")]
    Recognition(String),
    #[error("Unsupported source {path}: {reason}")]
    Unsupported { path: String, reason: String },
}

impl ExtractError {
    pub(crate) fn read(format: SourceFormat, err: impl ToString) -> Self {
        ExtractError::Read {
            format,
            message: err.to_string(),
        }
    }

    pub(crate) fn parse(format: SourceFormat, err: impl ToString) -> Self {
        ExtractError::Parse {
            format,
            message: err.to_string(),
        }
    }
}
