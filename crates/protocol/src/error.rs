use thiserror::Error;

pub type Result<T> = std::result::Result<T, ResponseError>;

/// Errors raised while decoding a producer response
#[derive(Error, Debug)]
pub enum ResponseError {
    /// Body is not valid JSON for the response shape
    #[error("Malformed producer response: {0}")]
    Json(#[from] serde_json::Error),

    /// An event carries an empty fingerprint
    #[error("Event #{index} ({kind}) on page {page} has an empty fingerprint")]
    EmptyFingerprint {
        index: usize,
        kind: crate::EventKind,
        page: u32,
    },

    /// Page numbers are 1-based
    #[error("Event #{index} references page 0; page numbers start at 1")]
    ZeroPage { index: usize },
}

/// Error families shared by every pagestitch stage.
///
/// Callers use this to decide whether a document can be re-driven
/// (`PageRangeViolation`, `Cancelled`, `Timeout`) or must be inspected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Events referenced pages outside their batch, even after retries
    PageRangeViolation,
    /// A fingerprint was not found from the cursor onward
    FingerprintNotFound,
    /// END/CONTINUATION without an open chunk, or chunks left open
    UnbalancedStructure,
    /// Text after the last event with no chunk to receive it (strict mode)
    OrphanTrailingText,
    /// Caller-supplied input does not fit the contract (config, page order)
    InvalidInput,
    /// The event producer failed or returned an unreadable body
    Producer,
    /// The caller cancelled the work
    Cancelled,
    /// A producer call exceeded its time limit
    Timeout,
}

impl ErrorKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::PageRangeViolation => "page_range_violation",
            Self::FingerprintNotFound => "fingerprint_not_found",
            Self::UnbalancedStructure => "unbalanced_structure",
            Self::OrphanTrailingText => "orphan_trailing_text",
            Self::InvalidInput => "invalid_input",
            Self::Producer => "producer",
            Self::Cancelled => "cancelled",
            Self::Timeout => "timeout",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
