// SPDX-License-Identifier: MIT OR Apache-2.0
//! Helio editor core.
//!
//! Transactional, reversible editing of a live scene:
//! - A thin scene registry with uuid-keyed objects, parent/child links
//!   and a drainable change-event queue
//! - A closed tagged union of reversible commands (scene edits, script
//!   bindings, material graph edits)
//! - A cursor-addressed undo/redo history with update coalescing,
//!   tail truncation and JSON round-trip
//! - Editor state wiring the scene to material graphs and their compiled
//!   programs, with failure-safe recompilation
//!
//! Rendering, UI, persistence and transport are collaborators behind
//! narrow seams: the renderer consumes compiled
//! [`helio_graph::MaterialProgram`]s, and inbound sync messages translate
//! 1:1 into [`commands::Command`] executions.

pub mod commands;
pub mod config;
pub mod history;
pub mod scene;
pub mod state;

pub use commands::{Command, CommandError, MergeKey};
pub use config::EditorConfig;
pub use history::{History, HistoryEntry, HistoryError};
pub use scene::{
    CameraProjection, ObjectId, ObjectKind, RemovedObject, Scene, SceneEvent, SceneObject,
    ScriptBinding, ScriptValue, ShadowCameraProperty, ShadowSettings, Subtree, Transform,
};
pub use state::{CompiledMaterial, EditorState, GraphId, GraphMaterials, MaterialBindings};
