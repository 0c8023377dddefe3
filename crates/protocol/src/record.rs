use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// An assembled chunk in the public, flattened output
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ChunkRecord {
    /// Stable identifier, unique within the document
    pub id: String,

    /// Identifier of the enclosing chunk, `None` at the root
    pub parent_id: Option<String>,

    /// Structural label copied from the START event
    pub level: String,

    /// Title copied from the START event
    pub title: Option<String>,

    /// Exact text assigned to this chunk (nested children excluded)
    pub text: String,

    /// Page the chunk starts on (1-indexed)
    pub start_page: u32,

    /// Page the chunk ends on (1-indexed, inclusive)
    pub end_page: u32,

    pub metadata: ChunkMetadata,
}

impl ChunkRecord {
    /// Whether the chunk spans more than one page
    #[must_use]
    pub const fn is_multi_page(&self) -> bool {
        self.end_page > self.start_page
    }

    #[must_use]
    pub const fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }
}

/// Derived information about a chunk
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ChunkMetadata {
    /// Name of the source document
    pub source_document: String,

    /// Every page the chunk touches, ascending
    pub pages: Vec<u32>,

    /// Titles of enclosing chunks, outermost first
    #[serde(default)]
    pub parent_hierarchy: Vec<String>,

    /// Nesting depth, 0 for root chunks
    pub depth: usize,

    /// Rough token estimate (~4 bytes per token)
    pub estimated_tokens: usize,
}

impl ChunkMetadata {
    /// Estimate tokens from content (rough heuristic: 4 bytes per token)
    #[must_use]
    pub fn estimate_tokens_from_content(content: &str) -> usize {
        (content.len() / 4).max(1)
    }
}

/// Snapshot of a chunk still open after a batch, as shown to the producer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct OpenChunkSummary {
    pub level: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub start_page: u32,
}
