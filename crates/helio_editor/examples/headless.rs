// SPDX-License-Identifier: MIT OR Apache-2.0
//! Headless editing session: build a scene, edit it through the history,
//! then compile a material graph and evaluate its channels on the CPU.
//!
//! ```sh
//! RUST_LOG=info cargo run --example headless
//! ```

use helio_editor::{Command, EditorState, History, ObjectKind, SceneObject};
use helio_graph::{EvalInputs, Value};

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let mut state = EditorState::new();
    let mut history = History::from_config(&state.config);

    // Scene edits go through the history so they can be undone.
    let object = SceneObject::new("Cube", ObjectKind::Mesh);
    let id = object.uuid;
    history
        .execute(
            &mut state,
            Command::AddObject {
                object,
                parent: None,
                index: None,
            },
        )
        .expect("add object");

    // Three frames of one drag coalesce into a single entry.
    for x in [0.5, 1.0, 1.5] {
        let cmd = Command::set_position(&state.scene, id, [x, 0.0, 0.0]).expect("target exists");
        history.execute(&mut state, cmd).expect("move object");
    }
    tracing::info!(
        entries = history.len(),
        undo = ?history.undo_name(),
        "scene edited"
    );

    // Author a material: float constant driving the roughness channel.
    let graph_id = state.add_material_graph("Demo Material");
    let output = state.graphs[&graph_id]
        .nodes()
        .next()
        .expect("seeded output node")
        .id;
    let float = state.registry.create_node("float").expect("catalog type");
    let float_id = float.id;
    history
        .execute(
            &mut state,
            Command::AddGraphNode {
                graph: graph_id,
                node: float,
            },
        )
        .expect("add node");
    history
        .execute(
            &mut state,
            Command::SetGraphNodeProperty {
                graph: graph_id,
                node: float_id,
                property: "value".to_string(),
                new_value: Value::Float(0.35),
                old_value: None,
            },
        )
        .expect("set property");
    history
        .execute(
            &mut state,
            Command::ConnectGraphSockets {
                graph: graph_id,
                source_node: float_id,
                source_socket: "value".to_string(),
                target_node: output,
                target_socket: "roughness".to_string(),
                edge: None,
            },
        )
        .expect("connect sockets");

    state.recompile_material(graph_id);
    let materials = state
        .materials
        .for_graph(graph_id)
        .expect("graph compiled at least once");
    let compiled = materials.program(output).expect("output bound");
    let roughness = compiled
        .arena
        .eval(compiled.program.channels["roughness"], &EvalInputs::default());
    tracing::info!(?roughness, failures = materials.diagnostics.len(), "material compiled");

    for event in state.scene.drain_events() {
        tracing::debug!(?event, "scene event");
    }
}
