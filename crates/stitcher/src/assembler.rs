use crate::config::AssembleOptions;
use crate::types::CompletedChunk;
use pagestitch_protocol::{ChunkMetadata, ChunkRecord};
use std::collections::HashMap;

/// Turns the stitcher's completed chunk tree into public chunk records.
///
/// Records come out in pre-order (a parent before its children, siblings in
/// discovery order) with ids `{prefix}-{n}`, so assembling the same tree twice
/// yields identical output. Text is copied verbatim.
#[derive(Debug, Clone, Default)]
pub struct FinalAssembler {
    options: AssembleOptions,
}

/// A record with its nested children, for callers that want the tree form
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkNode {
    pub record: ChunkRecord,
    pub children: Vec<ChunkNode>,
}

struct Frame<'a> {
    chunk: &'a CompletedChunk,
    parent_id: Option<String>,
    hierarchy: Vec<String>,
    depth: usize,
}

impl FinalAssembler {
    #[must_use]
    pub fn new(options: AssembleOptions) -> Self {
        Self { options }
    }

    /// Flatten `chunks` (top-level, each carrying its children) into records
    #[must_use]
    pub fn assemble(&self, source_document: &str, chunks: &[CompletedChunk]) -> Vec<ChunkRecord> {
        let mut records = Vec::with_capacity(chunks.iter().map(CompletedChunk::subtree_len).sum());
        let mut pending: Vec<Frame<'_>> = chunks
            .iter()
            .rev()
            .map(|chunk| Frame {
                chunk,
                parent_id: None,
                hierarchy: Vec::new(),
                depth: 0,
            })
            .collect();

        while let Some(frame) = pending.pop() {
            let chunk = frame.chunk;
            let id = format!("{}-{}", self.options.id_prefix, records.len() + 1);

            let mut child_hierarchy = frame.hierarchy.clone();
            if let Some(title) = &chunk.title {
                child_hierarchy.push(title.clone());
            }
            for child in chunk.children.iter().rev() {
                pending.push(Frame {
                    chunk: child,
                    parent_id: Some(id.clone()),
                    hierarchy: child_hierarchy.clone(),
                    depth: frame.depth + 1,
                });
            }

            records.push(ChunkRecord {
                id,
                parent_id: frame.parent_id,
                level: chunk.level.clone(),
                title: chunk.title.clone(),
                text: chunk.text.clone(),
                start_page: chunk.start_page,
                end_page: chunk.end_page,
                metadata: ChunkMetadata {
                    source_document: source_document.to_string(),
                    pages: (chunk.start_page..=chunk.end_page).collect(),
                    parent_hierarchy: frame.hierarchy,
                    depth: frame.depth,
                    estimated_tokens: ChunkMetadata::estimate_tokens_from_content(&chunk.text),
                },
            });
        }

        log::debug!(
            "Assembled {} chunk record(s) for {source_document}",
            records.len()
        );
        records
    }
}

/// Re-nest flat records by `parent_id`, keeping record order among siblings.
///
/// Records whose parent id is unknown are treated as roots.
#[must_use]
pub fn build_tree(records: &[ChunkRecord]) -> Vec<ChunkNode> {
    let known: HashMap<&str, usize> = records
        .iter()
        .enumerate()
        .map(|(idx, record)| (record.id.as_str(), idx))
        .collect();

    let mut children: HashMap<usize, Vec<usize>> = HashMap::new();
    let mut roots = Vec::new();
    for (idx, record) in records.iter().enumerate() {
        match record.parent_id.as_deref().and_then(|id| known.get(id)) {
            Some(&parent) if parent != idx => children.entry(parent).or_default().push(idx),
            _ => roots.push(idx),
        }
    }

    fn node(idx: usize, records: &[ChunkRecord], children: &HashMap<usize, Vec<usize>>) -> ChunkNode {
        ChunkNode {
            record: records[idx].clone(),
            children: children
                .get(&idx)
                .map(|kids| kids.iter().map(|&kid| node(kid, records, children)).collect())
                .unwrap_or_default(),
        }
    }

    roots
        .into_iter()
        .map(|idx| node(idx, records, &children))
        .collect()
}
