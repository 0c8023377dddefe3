//! # Pagestitch Stitcher
//!
//! Rebuilds nested, page-spanning chunks from a stream of structural events.
//!
//! ## Architecture
//!
//! ```text
//! page text + ordered events (per page)
//!     │
//!     ├──> Stitcher (stack of open chunks, per-page cursor)
//!     │      ├─ STARTS: flush to current top, push, take fingerprint
//!     │      ├─ CONTINUATION: extend top through fingerprint
//!     │      └─ ENDS: extend top through fingerprint, pop into parent
//!     │
//!     └──> FinalAssembler
//!            └─ pre-order ids, parent links, metadata → ChunkRecord[]
//! ```
//!
//! ## Example
//!
//! ```rust
//! use pagestitch_protocol::Event;
//! use pagestitch_stitcher::{FinalAssembler, Stitcher, StitcherConfig};
//!
//! let mut stitcher = Stitcher::new(StitcherConfig::default());
//! let events = vec![
//!     Event::start("section", Some("Intro"), 1, "Intro"),
//!     Event::end("section", 1, "the end."),
//! ];
//! let outcome = stitcher
//!     .process_page(1, &events, "Intro: this is the end.")
//!     .unwrap();
//! stitcher.finish().unwrap();
//!
//! let records = FinalAssembler::default().assemble("notes.txt", &outcome.completed);
//! assert_eq!(records[0].text, "Intro: this is the end.");
//! ```

mod assembler;
mod config;
mod error;
mod stitcher;
mod types;

pub use assembler::{build_tree, ChunkNode, FinalAssembler};
pub use config::{AssembleOptions, StitcherConfig};
pub use error::{Result, StitchError, StitchWarning};
pub use stitcher::{group_events_by_page, BatchOutcome, Stitcher};
pub use types::{CompletedChunk, OpenChunk, TextSpan};
