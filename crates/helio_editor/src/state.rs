// SPDX-License-Identifier: MIT OR Apache-2.0
//! Editor state: the scene, its material graphs, and compiled bindings.

use crate::config::EditorConfig;
use crate::scene::{Scene, Subtree};
use helio_graph::{
    compile, create_material_registry, CompileFailure, ExprArena, Graph, MaterialProgram, NodeId,
    NodeRegistry,
};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

/// Unique identifier for a material graph
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GraphId(pub Uuid);

impl GraphId {
    /// Create a new random graph ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for GraphId {
    fn default() -> Self {
        Self::new()
    }
}

/// A compiled program together with the arena its expressions live in.
/// The arena is shared between every program from the same pass.
#[derive(Debug, Clone)]
pub struct CompiledMaterial {
    /// The channel bindings
    pub program: MaterialProgram,
    /// Expression storage for this pass
    pub arena: Arc<ExprArena>,
}

/// Compiled materials for one graph.
#[derive(Debug, Clone, Default)]
pub struct GraphMaterials {
    bindings: IndexMap<NodeId, CompiledMaterial>,
    /// Failures from the latest compile pass, for diagnostics UI
    pub diagnostics: Vec<CompileFailure>,
}

impl GraphMaterials {
    /// The live program for an output node, if one has ever compiled
    pub fn program(&self, output_node: NodeId) -> Option<&CompiledMaterial> {
        self.bindings.get(&output_node)
    }

    /// Output nodes with live programs
    pub fn outputs(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.bindings.keys().copied()
    }

    /// Number of live programs
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    /// Whether no programs are bound
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

/// Renderer-facing material bindings, per graph.
///
/// Recompilation replaces bindings wholesale per output node, and only
/// for outputs that compiled: a failed output keeps its previously valid
/// program, so a broken graph never blanks the rendered material.
#[derive(Debug, Clone, Default)]
pub struct MaterialBindings {
    graphs: IndexMap<GraphId, GraphMaterials>,
}

impl MaterialBindings {
    /// Bindings for one graph
    pub fn for_graph(&self, graph: GraphId) -> Option<&GraphMaterials> {
        self.graphs.get(&graph)
    }

    fn apply_pass(&mut self, graph_id: GraphId, graph: &Graph, report: helio_graph::CompileReport) {
        let entry = self.graphs.entry(graph_id).or_default();
        let arena = Arc::new(report.arena);
        for program in report.programs {
            entry.bindings.insert(
                program.output_node,
                CompiledMaterial {
                    program,
                    arena: Arc::clone(&arena),
                },
            );
        }
        entry.diagnostics = report.failures;
        // Outputs deleted from the graph lose their bindings; failed
        // outputs that still exist keep the previous program.
        entry.bindings.retain(|id, _| graph.node(*id).is_some());
    }
}

/// The complete editor state the command stack mutates.
#[derive(Debug)]
pub struct EditorState {
    /// The authoritative scene
    pub scene: Scene,
    /// Material graphs by id
    pub graphs: IndexMap<GraphId, Graph>,
    /// Node type registry shared by the compiler and the palette
    pub registry: NodeRegistry,
    /// Clipboard subtree from the last copy/cut
    pub clipboard: Option<Subtree>,
    /// Compiled material programs
    pub materials: MaterialBindings,
    /// Editor settings
    pub config: EditorConfig,
}

impl EditorState {
    /// Create an empty editor state with the standard node catalog.
    pub fn new() -> Self {
        Self {
            scene: Scene::new(),
            graphs: IndexMap::new(),
            registry: create_material_registry(),
            clipboard: None,
            materials: MaterialBindings::default(),
            config: EditorConfig::default(),
        }
    }

    /// Create a new material graph seeded with a standard output node.
    pub fn add_material_graph(&mut self, name: impl Into<String>) -> GraphId {
        let mut graph = Graph::new(name);
        if let Some(output) = self.registry.create_node("output_standard") {
            graph.add_node(output.with_position(400.0, 100.0));
        }
        let id = GraphId::new();
        self.graphs.insert(id, graph);
        id
    }

    /// Get a material graph
    pub fn graph(&self, id: GraphId) -> Option<&Graph> {
        self.graphs.get(&id)
    }

    /// Recompile a graph and swap in the new programs.
    ///
    /// Bindings are replaced wholesale per output node, never patched in
    /// place, and only for outputs that compiled; failures land in the
    /// graph's diagnostics while the previous program keeps rendering.
    pub fn recompile_material(&mut self, id: GraphId) -> bool {
        let Some(graph) = self.graphs.get(&id) else {
            return false;
        };
        let report = compile(graph, &self.registry);
        self.materials.apply_pass(id, graph, report);
        true
    }
}

impl Default for EditorState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::Command;
    use helio_graph::{EvalInputs, Value};

    #[test]
    fn test_new_graph_has_output_node() {
        let mut state = EditorState::new();
        let id = state.add_material_graph("Material");
        let graph = state.graph(id).unwrap();
        assert_eq!(graph.node_count(), 1);
        assert_eq!(
            graph.nodes().next().unwrap().type_name,
            "output_standard"
        );
    }

    #[test]
    fn test_recompile_binds_programs() {
        let mut state = EditorState::new();
        let id = state.add_material_graph("Material");
        assert!(state.recompile_material(id));

        let materials = state.materials.for_graph(id).unwrap();
        assert_eq!(materials.len(), 1);
        assert!(materials.diagnostics.is_empty());
    }

    #[test]
    fn test_failed_recompile_keeps_previous_program() {
        let mut state = EditorState::new();
        let id = state.add_material_graph("Material");
        let output = state.graphs[&id].nodes().next().unwrap().id;

        // First pass: roughness driven by a float constant.
        let float = state.registry.create_node("float").unwrap();
        let float_id = float.id;
        Command::AddGraphNode {
            graph: id,
            node: float,
        }
        .execute(&mut state)
        .unwrap();
        Command::SetGraphNodeProperty {
            graph: id,
            node: float_id,
            property: "value".to_string(),
            new_value: Value::Float(0.3),
            old_value: None,
        }
        .execute(&mut state)
        .unwrap();
        Command::ConnectGraphSockets {
            graph: id,
            source_node: float_id,
            source_socket: "value".to_string(),
            target_node: output,
            target_socket: "roughness".to_string(),
            edge: None,
        }
        .execute(&mut state)
        .unwrap();
        state.recompile_material(id);

        let bound = state
            .materials
            .for_graph(id)
            .and_then(|m| m.program(output))
            .unwrap();
        let roughness = bound.program.channels["roughness"];
        assert_eq!(
            bound.arena.eval(roughness, &EvalInputs::default()),
            Value::Float(0.3)
        );

        // Second pass: wire a cycle upstream of the output, breaking it.
        let a = state.registry.create_node("add").unwrap();
        let b = state.registry.create_node("add").unwrap();
        let (a_id, b_id) = (a.id, b.id);
        for node in [a, b] {
            Command::AddGraphNode { graph: id, node }.execute(&mut state).unwrap();
        }
        let graph = state.graphs.get_mut(&id).unwrap();
        graph.connect(&state.registry, a_id, "out", b_id, "a").unwrap();
        graph.connect(&state.registry, b_id, "out", a_id, "a").unwrap();
        let stale = graph.edge_to(output, "roughness").unwrap().id;
        graph.disconnect(stale);
        graph
            .connect(&state.registry, a_id, "out", output, "roughness")
            .unwrap();
        state.recompile_material(id);

        // The broken pass reports a failure but the previously valid
        // program is still bound.
        let materials = state.materials.for_graph(id).unwrap();
        assert_eq!(materials.diagnostics.len(), 1);
        let bound = materials.program(output).unwrap();
        assert_eq!(
            bound.arena.eval(bound.program.channels["roughness"], &EvalInputs::default()),
            Value::Float(0.3)
        );
    }
}
