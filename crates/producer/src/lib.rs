//! # Pagestitch Producer
//!
//! Obtains structural events for a batch of pages from an external producer
//! and guarantees they only reference pages of that batch.
//!
//! ```text
//! BatchContext ──> prompts ──> EventProducer (async, external)
//!                                  │ raw JSON
//!                                  ▼
//!                           parse_response ──> validate_page_numbers
//!                                  ▲                 │ violation
//!                                  └── correction ◄──┘ (bounded by max_attempts)
//! ```

mod error;
mod producer;
pub mod prompts;
mod retry;
mod scripted;
mod validator;

pub use error::{ProducerError, Result};
pub use producer::{BatchContext, EventProducer, ProducerRequest};
pub use retry::{RetryConfig, RetryController};
pub use scripted::ScriptedProducer;
pub use tokio_util::sync::CancellationToken;
pub use validator::{validate_page_numbers, PageRangeViolation};
