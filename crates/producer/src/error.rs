use crate::validator::PageRangeViolation;
use pagestitch_protocol::{ErrorKind, ResponseError};
use thiserror::Error;

/// Result type for event production
pub type Result<T> = std::result::Result<T, ProducerError>;

/// Errors that can occur while obtaining events for a batch
#[derive(Error, Debug)]
pub enum ProducerError {
    /// Every attempt referenced pages outside the batch
    #[error("Page range violation after {attempts} attempt(s): {violation}")]
    PageRangeViolation {
        violation: PageRangeViolation,
        attempts: u32,
    },

    /// The producer answered with a body that is not a valid event list
    #[error("Malformed producer response on attempt {attempt}: {source}")]
    MalformedResponse {
        attempt: u32,
        #[source]
        source: ResponseError,
    },

    /// Transport or provider failure inside the producer
    #[error("Producer error: {0}")]
    Producer(String),

    /// Caller cancelled the request
    #[error("Event production cancelled")]
    Cancelled,

    /// A single attempt exceeded its time limit
    #[error("Producer attempt {attempt} timed out after {timeout_ms}ms")]
    Timeout { attempt: u32, timeout_ms: u64 },

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl ProducerError {
    /// Create a producer failure
    pub fn producer(msg: impl Into<String>) -> Self {
        Self::Producer(msg.into())
    }

    /// Create an invalid config error
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }

    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::PageRangeViolation { .. } => ErrorKind::PageRangeViolation,
            Self::MalformedResponse { .. } | Self::Producer(_) => ErrorKind::Producer,
            Self::Cancelled => ErrorKind::Cancelled,
            Self::Timeout { .. } => ErrorKind::Timeout,
            Self::InvalidConfig(_) => ErrorKind::InvalidInput,
        }
    }
}
