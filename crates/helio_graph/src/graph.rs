// SPDX-License-Identifier: MIT OR Apache-2.0
//! Graph data structure containing nodes and edges.

use crate::edge::{Edge, EdgeId};
use crate::node::{Node, NodeId, NodeRegistry};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// A material node graph.
///
/// Nodes and edges are owned here; edges must form a DAG with respect to
/// data dependency. Structural validity (sockets exist, types compatible,
/// one driver per input) is enforced at [`Graph::connect`] time; acyclicity
/// is enforced by [`Graph::topological_order`] and the compiler.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(from = "GraphData", into = "GraphData")]
pub struct Graph {
    /// Graph name
    pub name: String,
    nodes: IndexMap<NodeId, Node>,
    edges: IndexMap<EdgeId, Edge>,
}

/// Interchange form: `{ nodes: [...], edges: [...] }` per the persistence
/// contract. Positions ride along but are not semantic.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct GraphData {
    #[serde(default)]
    name: String,
    nodes: Vec<Node>,
    edges: Vec<Edge>,
}

impl From<GraphData> for Graph {
    fn from(data: GraphData) -> Self {
        Self {
            name: data.name,
            nodes: data.nodes.into_iter().map(|n| (n.id, n)).collect(),
            edges: data.edges.into_iter().map(|e| (e.id, e)).collect(),
        }
    }
}

impl From<Graph> for GraphData {
    fn from(graph: Graph) -> Self {
        Self {
            name: graph.name,
            nodes: graph.nodes.into_values().collect(),
            edges: graph.edges.into_values().collect(),
        }
    }
}

impl Graph {
    /// Create a new empty graph
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            nodes: IndexMap::new(),
            edges: IndexMap::new(),
        }
    }

    /// Add a node to the graph
    pub fn add_node(&mut self, node: Node) -> NodeId {
        let id = node.id;
        self.nodes.insert(id, node);
        id
    }

    /// Remove a node and its incident edges
    pub fn remove_node(&mut self, node_id: NodeId) -> Option<Node> {
        self.edges.retain(|_, e| !e.involves_node(node_id));
        self.nodes.swap_remove(&node_id)
    }

    /// Get a node by ID
    pub fn node(&self, node_id: NodeId) -> Option<&Node> {
        self.nodes.get(&node_id)
    }

    /// Get a mutable node by ID
    pub fn node_mut(&mut self, node_id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(&node_id)
    }

    /// Get all nodes
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    /// Get all node IDs
    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes.keys().copied()
    }

    /// Get the number of nodes
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Connect a source output socket to a target input socket.
    ///
    /// Validates that both endpoints and sockets exist against the
    /// registry, that the declared types are compatible under the
    /// coercion lattice, and that the target socket is not already
    /// driven - an input accepts at most one incoming edge.
    pub fn connect(
        &mut self,
        registry: &NodeRegistry,
        source_node: NodeId,
        source_socket: &str,
        target_node: NodeId,
        target_socket: &str,
    ) -> Result<EdgeId, EdgeError> {
        if source_node == target_node {
            return Err(EdgeError::SelfLoop);
        }

        let source = self
            .nodes
            .get(&source_node)
            .ok_or(EdgeError::NodeNotFound(source_node))?;
        let target = self
            .nodes
            .get(&target_node)
            .ok_or(EdgeError::NodeNotFound(target_node))?;

        let source_type = registry
            .lookup(&source.type_name)
            .ok_or_else(|| EdgeError::UnknownNodeType(source.type_name.clone()))?;
        let target_type = registry
            .lookup(&target.type_name)
            .ok_or_else(|| EdgeError::UnknownNodeType(target.type_name.clone()))?;

        let out = source_type
            .output(source_socket)
            .ok_or_else(|| EdgeError::SocketNotFound {
                node: source_node,
                socket: source_socket.to_string(),
            })?;
        let input = target_type
            .input(target_socket)
            .ok_or_else(|| EdgeError::SocketNotFound {
                node: target_node,
                socket: target_socket.to_string(),
            })?;

        if !out.socket_type.can_connect_to(input.socket_type) {
            return Err(EdgeError::IncompatibleSockets {
                source: out.socket_type,
                target: input.socket_type,
            });
        }

        if self.edge_to(target_node, target_socket).is_some() {
            return Err(EdgeError::SocketAlreadyDriven {
                node: target_node,
                socket: target_socket.to_string(),
            });
        }

        let edge = Edge::new(source_node, source_socket, target_node, target_socket);
        let id = edge.id;
        self.edges.insert(id, edge);
        Ok(id)
    }

    /// Remove an edge
    pub fn disconnect(&mut self, edge_id: EdgeId) -> Option<Edge> {
        self.edges.swap_remove(&edge_id)
    }

    /// Re-insert a previously removed edge, preserving its identity.
    /// Used to reverse disconnect/remove operations; the edge is assumed
    /// to have been valid when it was removed.
    pub fn restore_edge(&mut self, edge: Edge) {
        self.edges.insert(edge.id, edge);
    }

    /// Get an edge by ID
    pub fn edge(&self, edge_id: EdgeId) -> Option<&Edge> {
        self.edges.get(&edge_id)
    }

    /// Get all edges
    pub fn edges(&self) -> impl Iterator<Item = &Edge> {
        self.edges.values()
    }

    /// The edge driving a specific input socket, if any
    pub fn edge_to(&self, node_id: NodeId, socket: &str) -> Option<&Edge> {
        self.edges
            .values()
            .find(|e| e.target_node == node_id && e.target_socket == socket)
    }

    /// All edges incident to a node
    pub fn edges_for_node(&self, node_id: NodeId) -> impl Iterator<Item = &Edge> {
        self.edges.values().filter(move |e| e.involves_node(node_id))
    }

    /// Get the number of edges
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Nodes in dependency order: every node appears after all nodes it
    /// depends on. Fails with the cycle participants if the graph is not
    /// a DAG.
    pub fn topological_order(&self) -> Result<Vec<NodeId>, CycleError> {
        let mut visited = std::collections::HashSet::new();
        let mut stack = Vec::new();
        let mut order = Vec::new();

        for node_id in self.nodes.keys() {
            if !visited.contains(node_id) {
                self.visit(*node_id, &mut visited, &mut stack, &mut order)?;
            }
        }

        Ok(order)
    }

    fn visit(
        &self,
        node_id: NodeId,
        visited: &mut std::collections::HashSet<NodeId>,
        stack: &mut Vec<NodeId>,
        order: &mut Vec<NodeId>,
    ) -> Result<(), CycleError> {
        if let Some(pos) = stack.iter().position(|n| *n == node_id) {
            return Err(CycleError {
                participants: stack[pos..].to_vec(),
            });
        }
        if visited.contains(&node_id) {
            return Ok(());
        }

        stack.push(node_id);

        // Dependencies first: edges into this node
        for edge in self.edges.values() {
            if edge.target_node == node_id {
                self.visit(edge.source_node, visited, stack, order)?;
            }
        }

        stack.pop();
        visited.insert(node_id);
        order.push(node_id);

        Ok(())
    }

    /// Structural equality, ignoring UI-only fields (positions, name).
    /// This is the equality the serialization round-trip guarantees.
    pub fn structurally_equal(&self, other: &Self) -> bool {
        if self.nodes.len() != other.nodes.len() || self.edges.len() != other.edges.len() {
            return false;
        }
        for (id, node) in &self.nodes {
            let Some(o) = other.nodes.get(id) else {
                return false;
            };
            if node.type_name != o.type_name || node.properties != o.properties {
                return false;
            }
        }
        self.edges.iter().all(|(id, edge)| other.edges.get(id) == Some(edge))
    }
}

impl Default for Graph {
    fn default() -> Self {
        Self::new("Untitled")
    }
}

/// Error when creating an edge
#[derive(Debug, Clone, thiserror::Error)]
pub enum EdgeError {
    /// Node not found
    #[error("node not found: {0:?}")]
    NodeNotFound(NodeId),

    /// Node type not registered
    #[error("unknown node type: {0}")]
    UnknownNodeType(String),

    /// Socket not found on the node
    #[error("socket {socket:?} not found on node {node:?}")]
    SocketNotFound {
        /// Node that was searched
        node: NodeId,
        /// Missing socket ID
        socket: String,
    },

    /// Declared socket types cannot be coerced
    #[error("incompatible sockets: {source:?} cannot feed {target:?}")]
    IncompatibleSockets {
        /// Source socket type
        source: crate::socket::SocketType,
        /// Target socket type
        target: crate::socket::SocketType,
    },

    /// Input socket already has a driver
    #[error("socket {socket:?} on node {node:?} is already connected")]
    SocketAlreadyDriven {
        /// Target node
        node: NodeId,
        /// Target socket ID
        socket: String,
    },

    /// Self-loop not allowed
    #[error("self-loop not allowed")]
    SelfLoop,
}

/// Error when the graph contains a dependency cycle
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("graph contains a cycle through {participants:?}")]
pub struct CycleError {
    /// Nodes on the detected cycle
    pub participants: Vec<NodeId>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::material::create_material_registry;
    use crate::socket::Value;

    fn registry() -> NodeRegistry {
        create_material_registry()
    }

    #[test]
    fn test_connect_validates_types() {
        let registry = registry();
        let mut graph = Graph::new("test");
        let float = graph.add_node(registry.create_node("float").unwrap());
        let vec3 = graph.add_node(registry.create_node("vec3").unwrap());
        let out = graph.add_node(registry.create_node("output_standard").unwrap());

        // float -> vec3 component input: fine
        graph
            .connect(&registry, float, "value", vec3, "x")
            .expect("float feeds float");

        // vec3 -> roughness (float): rejected, vectors never collapse
        let err = graph
            .connect(&registry, vec3, "xyz", out, "roughness")
            .unwrap_err();
        assert!(matches!(err, EdgeError::IncompatibleSockets { .. }));

        // float -> color (vec3): broadcast is fine
        graph
            .connect(&registry, float, "value", out, "color")
            .expect("scalar broadcasts");
    }

    #[test]
    fn test_input_socket_accepts_one_driver() {
        let registry = registry();
        let mut graph = Graph::new("test");
        let a = graph.add_node(registry.create_node("float").unwrap());
        let b = graph.add_node(registry.create_node("float").unwrap());
        let add = graph.add_node(registry.create_node("add").unwrap());

        graph.connect(&registry, a, "value", add, "a").unwrap();
        let err = graph.connect(&registry, b, "value", add, "a").unwrap_err();
        assert!(matches!(err, EdgeError::SocketAlreadyDriven { .. }));
        assert_eq!(graph.edge_count(), 1);
    }

    #[test]
    fn test_self_loop_rejected() {
        let registry = registry();
        let mut graph = Graph::new("test");
        let add = graph.add_node(registry.create_node("add").unwrap());
        let err = graph.connect(&registry, add, "out", add, "a").unwrap_err();
        assert!(matches!(err, EdgeError::SelfLoop));
    }

    #[test]
    fn test_topological_order_respects_dependencies() {
        let registry = registry();
        let mut graph = Graph::new("test");
        let a = graph.add_node(registry.create_node("float").unwrap());
        let b = graph.add_node(registry.create_node("add").unwrap());
        let c = graph.add_node(registry.create_node("add").unwrap());
        graph.connect(&registry, a, "value", b, "a").unwrap();
        graph.connect(&registry, b, "out", c, "a").unwrap();

        let order = graph.topological_order().unwrap();
        let pos = |id| order.iter().position(|n| *n == id).unwrap();
        assert!(pos(a) < pos(b));
        assert!(pos(b) < pos(c));
    }

    #[test]
    fn test_cycle_reported_with_participants() {
        let registry = registry();
        let mut graph = Graph::new("test");
        let a = graph.add_node(registry.create_node("add").unwrap());
        let b = graph.add_node(registry.create_node("add").unwrap());
        graph.connect(&registry, a, "out", b, "a").unwrap();
        graph.connect(&registry, b, "out", a, "a").unwrap();

        let err = graph.topological_order().unwrap_err();
        assert_eq!(err.participants.len(), 2);
        assert!(err.participants.contains(&a));
        assert!(err.participants.contains(&b));
    }

    #[test]
    fn test_remove_node_drops_incident_edges() {
        let registry = registry();
        let mut graph = Graph::new("test");
        let a = graph.add_node(registry.create_node("float").unwrap());
        let b = graph.add_node(registry.create_node("add").unwrap());
        graph.connect(&registry, a, "value", b, "a").unwrap();

        graph.remove_node(a);
        assert_eq!(graph.edge_count(), 0);
        assert_eq!(graph.node_count(), 1);
    }

    #[test]
    fn test_serialization_round_trip() {
        let registry = registry();
        let mut graph = Graph::new("roundtrip");
        let a = graph.add_node(
            registry
                .create_node("float")
                .unwrap()
                .with_property("value", Value::Float(2.5))
                .with_position(10.0, 20.0),
        );
        let add = graph.add_node(registry.create_node("add").unwrap());
        graph.connect(&registry, a, "value", add, "a").unwrap();

        let json = serde_json::to_string(&graph).unwrap();
        let restored: Graph = serde_json::from_str(&json).unwrap();
        assert!(graph.structurally_equal(&restored));

        // Positions are carried but excluded from structural equality
        let mut moved = restored.clone();
        moved.node_mut(a).unwrap().position = [99.0, 99.0];
        assert!(graph.structurally_equal(&moved));
    }
}
