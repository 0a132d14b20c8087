// SPDX-License-Identifier: MIT OR Apache-2.0
//! Node definitions and the node type registry.

use crate::expr::{GeometryInput, OpKind};
use crate::material::MaterialArchetype;
use crate::socket::{InputSocket, OutputSocket, Value, ValueType};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NodeId(pub Uuid);

impl NodeId {
    /// Create a new random node ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for NodeId {
    fn default() -> Self {
        Self::new()
    }
}

/// What a node type lowers to during compilation.
///
/// A closed tag instead of per-type callbacks: the compiler matches on
/// this to build expressions, so adding a node kind is a compile-time
/// exhaustiveness check rather than a runtime dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NodeRole {
    /// Constant leaf; the value comes from the node's primary property.
    Constant(ValueType),
    /// Built-in geometry/frame input stream.
    Input(GeometryInput),
    /// Operator lowered to an expression node.
    Op(OpKind),
    /// Material output; binds channels on the given archetype.
    Output(MaterialArchetype),
}

/// Node type definition: the static shape of every instance of a type.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeType {
    /// Unique type identifier
    pub type_name: String,
    /// Display name
    pub display_name: String,
    /// Compilation role
    pub role: NodeRole,
    /// Input sockets
    pub inputs: Vec<InputSocket>,
    /// Output sockets
    pub outputs: Vec<OutputSocket>,
    /// Default property values, keyed like the sockets they back
    pub default_properties: IndexMap<String, Value>,
}

impl NodeType {
    /// Get an input socket by ID
    pub fn input(&self, id: &str) -> Option<&InputSocket> {
        self.inputs.iter().find(|s| s.id == id)
    }

    /// Get an output socket by ID
    pub fn output(&self, id: &str) -> Option<&OutputSocket> {
        self.outputs.iter().find(|s| s.id == id)
    }

    /// The primary output socket: the first non-component output.
    pub fn primary_output(&self) -> Option<&OutputSocket> {
        self.outputs.iter().find(|s| s.component.is_none())
    }

    /// Deterministic height hint for node widgets, derived from socket
    /// counts. UI-only; has no effect on compilation.
    pub fn layout_height(&self) -> f32 {
        const BASE: f32 = 28.0;
        const ROW: f32 = 18.0;
        const PADDING: f32 = 8.0;
        BASE + (self.inputs.len() + self.outputs.len()) as f32 * ROW + PADDING
    }
}

/// A node instance in a graph
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    /// Unique instance ID
    pub id: NodeId,
    /// Node type name
    pub type_name: String,
    /// Property overrides; unconnected input sockets fall back to these
    pub properties: IndexMap<String, Value>,
    /// Position in the graph UI (not semantic)
    pub position: [f32; 2],
}

impl Node {
    /// Create a new node from a type definition
    pub fn new(node_type: &NodeType) -> Self {
        Self {
            id: NodeId::new(),
            type_name: node_type.type_name.clone(),
            properties: node_type.default_properties.clone(),
            position: [0.0, 0.0],
        }
    }

    /// Set the position
    pub fn with_position(mut self, x: f32, y: f32) -> Self {
        self.position = [x, y];
        self
    }

    /// Set a property value
    pub fn with_property(mut self, key: impl Into<String>, value: Value) -> Self {
        self.properties.insert(key.into(), value);
        self
    }

    /// Get a property value
    pub fn property(&self, key: &str) -> Option<&Value> {
        self.properties.get(key)
    }
}

/// An entry in a palette category
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaletteEntry {
    /// Display name shown in the palette
    pub display_name: String,
    /// Node type this entry creates
    pub type_name: String,
    /// Palette swatch color
    pub color: [u8; 3],
}

/// A named, ordered group of node types for the palette UI.
/// Carries no compiler semantics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeCategory {
    /// Category display name
    pub name: String,
    /// Entries in palette order
    pub entries: Vec<PaletteEntry>,
}

/// Registry of available node types and palette categories.
///
/// Explicitly constructed and passed into the compiler and editor;
/// there is no global registry.
#[derive(Debug, Clone, Default)]
pub struct NodeRegistry {
    types: IndexMap<String, NodeType>,
    categories: Vec<NodeCategory>,
}

impl NodeRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a node type. The last registration for a name wins.
    pub fn register(&mut self, node_type: NodeType) {
        self.types.insert(node_type.type_name.clone(), node_type);
    }

    /// Look up a node type by name
    pub fn lookup(&self, type_name: &str) -> Option<&NodeType> {
        self.types.get(type_name)
    }

    /// Get all registered types
    pub fn types(&self) -> impl Iterator<Item = &NodeType> {
        self.types.values()
    }

    /// Number of registered types
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Whether the registry is empty
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Create a node instance from a type name
    pub fn create_node(&self, type_name: &str) -> Option<Node> {
        self.lookup(type_name).map(Node::new)
    }

    /// Append a palette category
    pub fn add_category(&mut self, category: NodeCategory) {
        self.categories.push(category);
    }

    /// Palette categories in registration order
    pub fn categories(&self) -> &[NodeCategory] {
        &self.categories
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn float_type() -> NodeType {
        NodeType {
            type_name: "float".to_string(),
            display_name: "Float".to_string(),
            role: NodeRole::Constant(ValueType::Float),
            inputs: vec![],
            outputs: vec![OutputSocket::new("value", "Value", ValueType::Float)],
            default_properties: IndexMap::from([("value".to_string(), Value::Float(0.0))]),
        }
    }

    #[test]
    fn test_create_node_applies_defaults() {
        let mut registry = NodeRegistry::new();
        registry.register(float_type());

        let node = registry.create_node("float").expect("type registered");
        assert_eq!(node.type_name, "float");
        assert_eq!(node.property("value"), Some(&Value::Float(0.0)));
        assert!(registry.create_node("nope").is_none());
    }

    #[test]
    fn test_last_registration_wins() {
        let mut registry = NodeRegistry::new();
        registry.register(float_type());

        let mut replacement = float_type();
        replacement.display_name = "Scalar".to_string();
        registry.register(replacement);

        assert_eq!(registry.len(), 1);
        assert_eq!(registry.lookup("float").map(|t| t.display_name.as_str()), Some("Scalar"));
    }

    #[test]
    fn test_layout_height_is_deterministic() {
        let ty = float_type();
        assert_eq!(ty.layout_height(), ty.layout_height());
        assert!(ty.layout_height() > 0.0);
    }
}
