//! # Pagestitch Engine
//!
//! Turns a paginated document into assembled chunk records.
//!
//! ```text
//! pages ──> split_into_batches ──┐
//!                                ▼ per batch
//!        RetryController::obtain_validated_events (open chunks in the prompt)
//!                                ▼
//!        Stitcher::process_batch (stack carried across batches)
//!                                ▼ after the last batch
//!        Stitcher::finish ──> FinalAssembler::assemble ──> ChunkRecord[]
//! ```

mod batching;
mod config;
mod engine;
mod error;

pub use batching::{split_into_batches, PageBatch};
pub use config::{
    BatchingConfig, EngineConfig, ENV_ATTEMPT_TIMEOUT_MS, ENV_MAX_ATTEMPTS, ENV_PAGE_BATCH_SIZE,
    ENV_STRICT_TRAILING_TEXT,
};
pub use engine::{ChunkingEngine, DocumentOutcome};
pub use error::{EngineError, Result};
