use pagestitch_protocol::{ErrorKind, EventKind};
use thiserror::Error;

/// Result type for stitcher operations
pub type Result<T> = std::result::Result<T, StitchError>;

/// Errors that stop stitching a document
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StitchError {
    /// Fingerprint absent from the page text at or after the cursor
    #[error("{kind} fingerprint {fingerprint:?} not found on page {page} at or after offset {cursor}")]
    FingerprintNotFound {
        page: u32,
        kind: EventKind,
        fingerprint: String,
        cursor: usize,
    },

    /// CONTINUATION or END with nothing open
    #[error("{kind} event on page {page} (fingerprint {fingerprint:?}) has no open chunk (depth {depth})")]
    UnbalancedEvent {
        page: u32,
        kind: EventKind,
        fingerprint: String,
        depth: usize,
    },

    /// Input exhausted with chunks still open; reports the innermost one
    #[error(
        "{level} chunk {:?} opened on page {start_page} was never closed ({depth} chunk(s) still open)",
        .title.as_deref().unwrap_or("untitled")
    )]
    UnclosedChunks {
        start_page: u32,
        level: String,
        title: Option<String>,
        depth: usize,
    },

    /// Strict mode: text left after the last event with no chunk to receive it
    #[error("{len} bytes of trailing text at offset {offset} on page {page} belong to no chunk: {preview:?}")]
    OrphanTrailingText {
        page: u32,
        offset: usize,
        len: usize,
        preview: String,
    },

    /// Events were given for a page whose text is missing from the batch
    #[error("No text supplied for page {page}")]
    MissingPageText { page: u32 },

    /// Pages must arrive in strictly ascending order across batches
    #[error("Page {page} arrived after page {last_page} was already stitched")]
    PageOutOfOrder { page: u32, last_page: u32 },
}

impl StitchError {
    /// Error family, for callers deciding how to report or re-drive
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::FingerprintNotFound { .. } => ErrorKind::FingerprintNotFound,
            Self::UnbalancedEvent { .. } | Self::UnclosedChunks { .. } => {
                ErrorKind::UnbalancedStructure
            }
            Self::OrphanTrailingText { .. } => ErrorKind::OrphanTrailingText,
            Self::MissingPageText { .. } | Self::PageOutOfOrder { .. } => ErrorKind::InvalidInput,
        }
    }

    /// Page the error was detected on
    #[must_use]
    pub const fn page(&self) -> u32 {
        match self {
            Self::FingerprintNotFound { page, .. }
            | Self::UnbalancedEvent { page, .. }
            | Self::OrphanTrailingText { page, .. }
            | Self::MissingPageText { page }
            | Self::PageOutOfOrder { page, .. } => *page,
            Self::UnclosedChunks { start_page, .. } => *start_page,
        }
    }
}

/// Recoverable data-quality findings, reported alongside stitched output
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StitchWarning {
    /// Trailing text discarded because no chunk was open to receive it
    OrphanTrailingText {
        page: u32,
        offset: usize,
        len: usize,
        preview: String,
    },
}

impl std::fmt::Display for StitchWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::OrphanTrailingText {
                page,
                offset,
                len,
                preview,
            } => write!(
                f,
                "discarded {len} bytes of trailing text at offset {offset} on page {page}: {preview:?}"
            ),
        }
    }
}
