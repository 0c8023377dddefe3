//! # Pagestitch Protocol
//!
//! Shared vocabulary between the event producer, the stitcher and the public
//! chunk output.
//!
//! - [`Event`] / [`EventKind`]: structural boundary signals anchored by a
//!   literal fingerprint on a page
//! - [`ProducerResponse`]: the JSON body an event producer returns for a batch
//! - [`ChunkRecord`]: one flattened, assembled chunk handed to callers

mod error;
mod event;
mod record;
mod response;

pub use error::{ErrorKind, ResponseError, Result};
pub use event::{Event, EventKind};
pub use record::{ChunkMetadata, ChunkRecord, OpenChunkSummary};
pub use response::{event_response_schema, parse_response, ProducerResponse};

/// Version of the producer response format described by [`event_response_schema`].
pub const RESPONSE_SCHEMA_VERSION: u32 = 1;
