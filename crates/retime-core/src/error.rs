use std::io;

/// Per-file failure. None of these abort a batch; the orchestrator records
/// the failure and moves on to the next file.
#[derive(Debug, thiserror::Error)]
pub enum RetimeError {
    #[error("unsupported file type: {extension}")]
    UnsupportedFileType { extension: String },

    #[error("failed to read metadata: {0}")]
    MetadataRead(String),

    #[error("no video stream found")]
    NoVideoStreamFound,

    #[error("date field {field} missing from metadata")]
    DateFieldMissing { field: &'static str },

    #[error("cannot parse date {value:?}: {reason}")]
    DateParse { value: String, reason: String },

    #[error("failed to set file times: {0}")]
    TimestampWrite(#[source] io::Error),
}

impl RetimeError {
    /// Short, stable name of the failure class for log lines.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::UnsupportedFileType { .. } => "UnsupportedFileType",
            Self::MetadataRead(_) => "MetadataReadError",
            Self::NoVideoStreamFound => "NoVideoStreamFound",
            Self::DateFieldMissing { .. } => "DateFieldMissing",
            Self::DateParse { .. } => "DateParseError",
            Self::TimestampWrite(_) => "TimestampWriteError",
        }
    }
}
