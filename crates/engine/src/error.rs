use pagestitch_producer::ProducerError;
use pagestitch_protocol::ErrorKind;
use pagestitch_stitcher::StitchError;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for document processing
pub type Result<T> = std::result::Result<T, EngineError>;

/// Errors that abort processing of a document
#[derive(Error, Debug)]
pub enum EngineError {
    /// Event production for a batch failed
    #[error("Batch {batch} (pages {first_page}-{last_page}): {source}")]
    Producer {
        batch: usize,
        first_page: u32,
        last_page: u32,
        #[source]
        source: ProducerError,
    },

    /// Stitching a batch failed
    #[error("Batch {batch} (pages {first_page}-{last_page}): {source}")]
    Stitch {
        batch: usize,
        first_page: u32,
        last_page: u32,
        #[source]
        source: StitchError,
    },

    /// The document ended with chunks still open
    #[error("Document {document:?} incomplete: {source}")]
    Incomplete {
        document: String,
        #[source]
        source: StitchError,
    },

    /// Page numbers start at 1
    #[error("Invalid page number {0}: pages are numbered from 1")]
    InvalidPage(u32),

    #[error("Failed to read config {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl EngineError {
    /// Create an invalid config error
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }

    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Producer { source, .. } => source.kind(),
            Self::Stitch { source, .. } | Self::Incomplete { source, .. } => source.kind(),
            Self::InvalidPage(_) | Self::ConfigRead { .. } | Self::InvalidConfig(_) => {
                ErrorKind::InvalidInput
            }
        }
    }

    /// Pages of the batch the error occurred in, if any
    #[must_use]
    pub const fn page_range(&self) -> Option<(u32, u32)> {
        match self {
            Self::Producer {
                first_page,
                last_page,
                ..
            }
            | Self::Stitch {
                first_page,
                last_page,
                ..
            } => Some((*first_page, *last_page)),
            _ => None,
        }
    }
}
