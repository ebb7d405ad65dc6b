//! Mutation journal.
//!
//! The in-memory [`Document`](super::Document) records every host operation
//! it performs as a [`Mutation`]. Draining the journal after a patch shows
//! exactly which live-tree edits the renderer made, and a batch can be
//! shipped to a remote display tree as MessagePack.

use serde::{Deserialize, Serialize};

use super::host::NodeId;

/// One host operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mutation {
    CreateElement { node: NodeId, tag: String },
    SetAttribute { node: NodeId, key: String, value: String },
    RemoveAttribute { node: NodeId, key: String },
    AddListener { node: NodeId, event: String },
    RemoveListener { node: NodeId, event: String },
    SetText { node: NodeId, text: String },
    AppendChild { parent: NodeId, child: NodeId },
    InsertBefore { parent: NodeId, child: NodeId, reference: NodeId },
    RemoveChild { parent: NodeId, child: NodeId },
}

impl Mutation {
    /// Whether this operation moves or inserts a node in a parent.
    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            Mutation::AppendChild { .. } | Mutation::InsertBefore { .. } | Mutation::RemoveChild { .. }
        )
    }
}

/// Encode a batch as MessagePack.
pub fn encode(batch: &[Mutation]) -> Result<Vec<u8>, rmp_serde::encode::Error> {
    rmp_serde::to_vec_named(batch)
}

/// Decode a batch produced by [`encode`].
pub fn decode(bytes: &[u8]) -> Result<Vec<Mutation>, rmp_serde::decode::Error> {
    rmp_serde::from_slice(bytes)
}
