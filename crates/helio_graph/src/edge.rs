// SPDX-License-Identifier: MIT OR Apache-2.0
//! Edge definitions: directed connections between sockets.

use crate::node::NodeId;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for an edge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EdgeId(pub Uuid);

impl EdgeId {
    /// Create a new random edge ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for EdgeId {
    fn default() -> Self {
        Self::new()
    }
}

/// A directed connection from a source output socket to a target input
/// socket. The target depends on the source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    /// Unique edge ID
    pub id: EdgeId,
    /// Source node ID
    pub source_node: NodeId,
    /// Source output socket ID
    pub source_socket: String,
    /// Target node ID
    pub target_node: NodeId,
    /// Target input socket ID
    pub target_socket: String,
}

impl Edge {
    /// Create a new edge
    pub fn new(
        source_node: NodeId,
        source_socket: impl Into<String>,
        target_node: NodeId,
        target_socket: impl Into<String>,
    ) -> Self {
        Self {
            id: EdgeId::new(),
            source_node,
            source_socket: source_socket.into(),
            target_node,
            target_socket: target_socket.into(),
        }
    }

    /// Check if this edge involves a specific node
    pub fn involves_node(&self, node_id: NodeId) -> bool {
        self.source_node == node_id || self.target_node == node_id
    }
}
