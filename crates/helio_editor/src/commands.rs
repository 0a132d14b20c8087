// SPDX-License-Identifier: MIT OR Apache-2.0
//! Reversible editor commands.
//!
//! A closed tagged union: every command variant carries identity
//! references (uuids, indices) plus exactly the before/after state it
//! needs to reverse itself, never live object references. Dispatch is a
//! `match`, so adding a variant is checked exhaustively at compile time.

use crate::scene::{
    CameraProjection, ObjectId, RemovedObject, Scene, SceneObject, ScriptBinding, ScriptValue,
    ShadowCameraProperty, Subtree,
};
use crate::state::{EditorState, GraphId};
use helio_graph::{Edge, EdgeError, EdgeId, Node, NodeId, Value};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Error raised by command execution or undo.
#[derive(Debug, Clone, thiserror::Error)]
pub enum CommandError {
    /// Target object does not exist
    #[error("object not found: {0:?}")]
    ObjectNotFound(ObjectId),

    /// An object with this uuid already exists
    #[error("object already exists: {0:?}")]
    ObjectExists(ObjectId),

    /// The object has no camera to reconfigure
    #[error("object {0:?} is not a camera")]
    NotACamera(ObjectId),

    /// The object has no shadow settings
    #[error("object {0:?} does not cast shadows")]
    NoShadow(ObjectId),

    /// Script index out of range
    #[error("script index {index} out of range on {object:?}")]
    ScriptIndexOutOfRange {
        /// Target object
        object: ObjectId,
        /// Requested index
        index: usize,
    },

    /// Paste with nothing on the clipboard
    #[error("clipboard is empty")]
    EmptyClipboard,

    /// Target graph does not exist
    #[error("graph not found: {0:?}")]
    GraphNotFound(GraphId),

    /// Target graph node does not exist
    #[error("graph node not found: {0:?}")]
    GraphNodeNotFound(NodeId),

    /// Target graph edge does not exist
    #[error("graph edge not found: {0:?}")]
    GraphEdgeNotFound(EdgeId),

    /// Connection rejected by the graph
    #[error(transparent)]
    GraphEdit(#[from] EdgeError),
}

/// Identity of the logical edit a command performs. Two commands with the
/// same merge key (and the updatable flag) coalesce into one history
/// entry during a continuous interaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeKey {
    /// Command kind tag
    pub kind: &'static str,
    /// Target identity
    pub target: Uuid,
    /// Sub-target discriminator (property name, script slot, ...)
    pub detail: String,
}

/// A reversible unit of scene or graph mutation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Command {
    /// Add an object to the scene
    AddObject {
        /// The object to add (uuid included)
        object: SceneObject,
        /// Parent to attach under, `None` for root
        parent: Option<ObjectId>,
        /// Index within the parent's children
        index: Option<usize>,
    },
    /// Remove an object and its descendants
    RemoveObject {
        /// Target object
        object: ObjectId,
        /// Captured at first execute; replayed by undo
        #[serde(default, skip_serializing_if = "Option::is_none")]
        removed: Option<RemovedObject>,
    },
    /// Set an object's position
    SetPosition {
        /// Target object
        object: ObjectId,
        /// New position
        new_position: [f32; 3],
        /// Position before the edit
        old_position: [f32; 3],
    },
    /// Set an object's rotation
    SetRotation {
        /// Target object
        object: ObjectId,
        /// New rotation (euler radians)
        new_rotation: [f32; 3],
        /// Rotation before the edit
        old_rotation: [f32; 3],
    },
    /// Set an object's scale
    SetScale {
        /// Target object
        object: ObjectId,
        /// New scale
        new_scale: [f32; 3],
        /// Scale before the edit
        old_scale: [f32; 3],
    },
    /// Switch a camera between projection types
    SetCameraType {
        /// Target camera object
        object: ObjectId,
        /// New projection
        new_projection: CameraProjection,
        /// Projection before the edit
        old_projection: CameraProjection,
    },
    /// Drive one property of a light's shadow camera
    SetShadowCameraProperty {
        /// Target light
        object: ObjectId,
        /// Which property
        property: ShadowCameraProperty,
        /// New value
        new_value: f32,
        /// Value before the edit
        old_value: f32,
    },
    /// Set a light's shadow map resolution
    SetShadowMapSize {
        /// Target light
        object: ObjectId,
        /// New resolution
        new_size: u32,
        /// Resolution before the edit
        old_size: u32,
    },
    /// Attach a script asset to an object
    AddScriptAsset {
        /// Target object
        object: ObjectId,
        /// Project path of the script asset
        asset_path: String,
    },
    /// Detach a script asset from an object
    RemoveScriptAsset {
        /// Target object
        object: ObjectId,
        /// Index into the object's script list
        script_index: usize,
        /// Captured at first execute; replayed by undo
        #[serde(default, skip_serializing_if = "Option::is_none")]
        removed: Option<ScriptBinding>,
    },
    /// Set an attribute on an attached script
    SetScriptAttribute {
        /// Target object
        object: ObjectId,
        /// Index into the object's script list
        script_index: usize,
        /// Attribute name
        attribute: String,
        /// New value
        new_value: ScriptValue,
        /// Value before the edit; `None` if the attribute was unset
        #[serde(default, skip_serializing_if = "Option::is_none")]
        old_value: Option<ScriptValue>,
    },
    /// Copy an object subtree to the clipboard
    CopyObject {
        /// Source object
        object: ObjectId,
    },
    /// Cut an object: copy to the clipboard, then remove. Composed of the
    /// two sub-commands; undoes them in reverse order, as one history
    /// entry.
    CutObject {
        /// Target object
        object: ObjectId,
        /// Copy sub-command, created at first execute
        #[serde(default, skip_serializing_if = "Option::is_none")]
        copy: Option<Box<Command>>,
        /// Remove sub-command, created at first execute
        #[serde(default, skip_serializing_if = "Option::is_none")]
        remove: Option<Box<Command>>,
    },
    /// Paste the clipboard subtree into the scene
    PasteObject {
        /// Parent to paste under, `None` for root
        parent: Option<ObjectId>,
        /// Pasted subtree with regenerated uuids, captured at first
        /// execute so redo restores the same identities
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pasted: Option<Subtree>,
    },
    /// Add a node to a material graph
    AddGraphNode {
        /// Target graph
        graph: GraphId,
        /// The node to add (id included)
        node: Node,
    },
    /// Remove a node from a material graph
    RemoveGraphNode {
        /// Target graph
        graph: GraphId,
        /// Target node
        node: NodeId,
        /// Node and incident edges captured at first execute
        #[serde(default, skip_serializing_if = "Option::is_none")]
        removed: Option<(Node, Vec<Edge>)>,
    },
    /// Connect two sockets in a material graph
    ConnectGraphSockets {
        /// Target graph
        graph: GraphId,
        /// Source node
        source_node: NodeId,
        /// Source output socket
        source_socket: String,
        /// Target node
        target_node: NodeId,
        /// Target input socket
        target_socket: String,
        /// The created edge, captured at first execute so redo restores
        /// the same edge identity
        #[serde(default, skip_serializing_if = "Option::is_none")]
        edge: Option<Edge>,
    },
    /// Disconnect an edge in a material graph
    DisconnectGraphSockets {
        /// Target graph
        graph: GraphId,
        /// Target edge
        edge: EdgeId,
        /// Captured at first execute; replayed by undo
        #[serde(default, skip_serializing_if = "Option::is_none")]
        removed: Option<Edge>,
    },
    /// Set a property on a material graph node
    SetGraphNodeProperty {
        /// Target graph
        graph: GraphId,
        /// Target node
        node: NodeId,
        /// Property key
        property: String,
        /// New value
        new_value: Value,
        /// Value before the edit; `None` if the property was unset
        #[serde(default, skip_serializing_if = "Option::is_none")]
        old_value: Option<Value>,
    },
}

impl Command {
    /// Capture-at-construction constructor for position edits.
    pub fn set_position(
        scene: &Scene,
        object: ObjectId,
        new_position: [f32; 3],
    ) -> Result<Self, CommandError> {
        let current = scene
            .object_by_uuid(object)
            .ok_or(CommandError::ObjectNotFound(object))?;
        Ok(Self::SetPosition {
            object,
            new_position,
            old_position: current.transform.position,
        })
    }

    /// Capture-at-construction constructor for rotation edits.
    pub fn set_rotation(
        scene: &Scene,
        object: ObjectId,
        new_rotation: [f32; 3],
    ) -> Result<Self, CommandError> {
        let current = scene
            .object_by_uuid(object)
            .ok_or(CommandError::ObjectNotFound(object))?;
        Ok(Self::SetRotation {
            object,
            new_rotation,
            old_rotation: current.transform.rotation,
        })
    }

    /// Capture-at-construction constructor for scale edits.
    pub fn set_scale(
        scene: &Scene,
        object: ObjectId,
        new_scale: [f32; 3],
    ) -> Result<Self, CommandError> {
        let current = scene
            .object_by_uuid(object)
            .ok_or(CommandError::ObjectNotFound(object))?;
        Ok(Self::SetScale {
            object,
            new_scale,
            old_scale: current.transform.scale,
        })
    }

    /// Capture-at-construction constructor for camera type switches.
    pub fn set_camera_type(
        scene: &Scene,
        object: ObjectId,
        new_projection: CameraProjection,
    ) -> Result<Self, CommandError> {
        let current = scene
            .object_by_uuid(object)
            .ok_or(CommandError::ObjectNotFound(object))?;
        let old_projection = current.camera.ok_or(CommandError::NotACamera(object))?;
        Ok(Self::SetCameraType {
            object,
            new_projection,
            old_projection,
        })
    }

    /// Capture-at-construction constructor for shadow camera edits.
    pub fn set_shadow_camera_property(
        scene: &Scene,
        object: ObjectId,
        property: ShadowCameraProperty,
        new_value: f32,
    ) -> Result<Self, CommandError> {
        let current = scene
            .object_by_uuid(object)
            .ok_or(CommandError::ObjectNotFound(object))?;
        let shadow = current.shadow.ok_or(CommandError::NoShadow(object))?;
        Ok(Self::SetShadowCameraProperty {
            object,
            property,
            new_value,
            old_value: shadow.camera_property(property),
        })
    }

    /// Capture-at-construction constructor for shadow map size edits.
    pub fn set_shadow_map_size(
        scene: &Scene,
        object: ObjectId,
        new_size: u32,
    ) -> Result<Self, CommandError> {
        let current = scene
            .object_by_uuid(object)
            .ok_or(CommandError::ObjectNotFound(object))?;
        let shadow = current.shadow.ok_or(CommandError::NoShadow(object))?;
        Ok(Self::SetShadowMapSize {
            object,
            new_size,
            old_size: shadow.map_size,
        })
    }

    /// Root uuid of the subtree a paste created, if it executed.
    pub fn pasted_root(&self) -> Option<ObjectId> {
        match self {
            Self::PasteObject { pasted, .. } => {
                pasted.as_ref().and_then(|s| s.root()).map(|o| o.uuid)
            }
            _ => None,
        }
    }

    /// Human-readable command name for history UI.
    pub fn name(&self) -> String {
        match self {
            Self::AddObject { object, .. } => format!("Add Object: {}", object.name),
            Self::RemoveObject { .. } => "Remove Object".to_string(),
            Self::SetPosition { .. } => "Set Position".to_string(),
            Self::SetRotation { .. } => "Set Rotation".to_string(),
            Self::SetScale { .. } => "Set Scale".to_string(),
            Self::SetCameraType { .. } => "Set Camera Type".to_string(),
            Self::SetShadowCameraProperty { .. } => "Set Shadow Camera".to_string(),
            Self::SetShadowMapSize { .. } => "Set Shadow Map Size".to_string(),
            Self::AddScriptAsset { asset_path, .. } => format!("Add Script: {asset_path}"),
            Self::RemoveScriptAsset { .. } => "Remove Script".to_string(),
            Self::SetScriptAttribute { attribute, .. } => {
                format!("Set Script Attribute: {attribute}")
            }
            Self::CopyObject { .. } => "Copy Object".to_string(),
            Self::CutObject { .. } => "Cut Object".to_string(),
            Self::PasteObject { .. } => "Paste Object".to_string(),
            Self::AddGraphNode { node, .. } => format!("Add Node: {}", node.type_name),
            Self::RemoveGraphNode { .. } => "Remove Node".to_string(),
            Self::ConnectGraphSockets { .. } => "Connect Sockets".to_string(),
            Self::DisconnectGraphSockets { .. } => "Disconnect Sockets".to_string(),
            Self::SetGraphNodeProperty { property, .. } => {
                format!("Set Node Property: {property}")
            }
        }
    }

    /// Whether consecutive same-target instances coalesce in history.
    pub fn updatable(&self) -> bool {
        matches!(
            self,
            Self::SetPosition { .. }
                | Self::SetRotation { .. }
                | Self::SetScale { .. }
                | Self::SetShadowCameraProperty { .. }
                | Self::SetShadowMapSize { .. }
                | Self::SetScriptAttribute { .. }
                | Self::SetGraphNodeProperty { .. }
        )
    }

    /// Identity of the logical edit, for coalescing.
    pub fn merge_key(&self) -> Option<MergeKey> {
        let key = |kind: &'static str, target: Uuid, detail: String| {
            Some(MergeKey {
                kind,
                target,
                detail,
            })
        };
        match self {
            Self::SetPosition { object, .. } => key("position", object.0, String::new()),
            Self::SetRotation { object, .. } => key("rotation", object.0, String::new()),
            Self::SetScale { object, .. } => key("scale", object.0, String::new()),
            Self::SetShadowCameraProperty {
                object, property, ..
            } => key("shadow_camera", object.0, format!("{property:?}")),
            Self::SetShadowMapSize { object, .. } => key("shadow_map", object.0, String::new()),
            Self::SetScriptAttribute {
                object,
                script_index,
                attribute,
                ..
            } => key("script_attr", object.0, format!("{script_index}:{attribute}")),
            Self::SetGraphNodeProperty { node, property, .. } => {
                key("graph_prop", node.0, property.clone())
            }
            _ => None,
        }
    }

    /// Merge a newer instance of the same logical edit into this one.
    /// The old state stays; only the target value advances.
    pub fn update(&mut self, newer: &Self) {
        match (self, newer) {
            (
                Self::SetPosition { new_position, .. },
                Self::SetPosition {
                    new_position: next, ..
                },
            ) => *new_position = *next,
            (
                Self::SetRotation { new_rotation, .. },
                Self::SetRotation {
                    new_rotation: next, ..
                },
            ) => *new_rotation = *next,
            (
                Self::SetScale { new_scale, .. },
                Self::SetScale {
                    new_scale: next, ..
                },
            ) => *new_scale = *next,
            (
                Self::SetShadowCameraProperty { new_value, .. },
                Self::SetShadowCameraProperty {
                    new_value: next, ..
                },
            ) => *new_value = *next,
            (
                Self::SetShadowMapSize { new_size, .. },
                Self::SetShadowMapSize { new_size: next, .. },
            ) => *new_size = *next,
            (
                Self::SetScriptAttribute { new_value, .. },
                Self::SetScriptAttribute {
                    new_value: next, ..
                },
            ) => *new_value = next.clone(),
            (
                Self::SetGraphNodeProperty { new_value, .. },
                Self::SetGraphNodeProperty {
                    new_value: next, ..
                },
            ) => *new_value = *next,
            _ => {}
        }
    }

    /// Whether every identity reference this command holds still resolves
    /// against the live state. Used when loading a serialized history:
    /// unresolvable commands become inert instead of failing the load.
    pub fn resolve(&self, state: &EditorState) -> bool {
        let scene = &state.scene;
        match self {
            Self::AddObject { parent, .. } => parent.map_or(true, |p| scene.contains(p)),
            Self::RemoveObject { object, .. }
            | Self::SetPosition { object, .. }
            | Self::SetRotation { object, .. }
            | Self::SetScale { object, .. }
            | Self::SetCameraType { object, .. }
            | Self::SetShadowCameraProperty { object, .. }
            | Self::SetShadowMapSize { object, .. }
            | Self::AddScriptAsset { object, .. }
            | Self::RemoveScriptAsset { object, .. }
            | Self::SetScriptAttribute { object, .. }
            | Self::CopyObject { object }
            | Self::CutObject { object, .. } => scene.contains(*object),
            Self::PasteObject { parent, .. } => parent.map_or(true, |p| scene.contains(p)),
            Self::AddGraphNode { graph, .. } => state.graphs.contains_key(graph),
            Self::RemoveGraphNode { graph, node, .. }
            | Self::SetGraphNodeProperty { graph, node, .. } => state
                .graphs
                .get(graph)
                .is_some_and(|g| g.node(*node).is_some()),
            Self::ConnectGraphSockets {
                graph,
                source_node,
                target_node,
                ..
            } => state
                .graphs
                .get(graph)
                .is_some_and(|g| g.node(*source_node).is_some() && g.node(*target_node).is_some()),
            Self::DisconnectGraphSockets { graph, edge, .. } => state
                .graphs
                .get(graph)
                .is_some_and(|g| g.edge(*edge).is_some()),
        }
    }

    /// Apply the command to the editor state.
    pub fn execute(&mut self, state: &mut EditorState) -> Result<(), CommandError> {
        match self {
            Self::AddObject {
                object,
                parent,
                index,
            } => {
                if state.scene.contains(object.uuid) {
                    return Err(CommandError::ObjectExists(object.uuid));
                }
                state.scene.add_object(object.clone(), *parent, *index);
                state.scene.select_object(Some(object.uuid));
                Ok(())
            }
            Self::RemoveObject { object, removed } => {
                let taken = state
                    .scene
                    .remove_object(*object)
                    .ok_or(CommandError::ObjectNotFound(*object))?;
                *removed = Some(taken);
                state.scene.select_object(None);
                Ok(())
            }
            Self::SetPosition {
                object,
                new_position,
                ..
            } => set_transform(&mut state.scene, *object, |t| t.position = *new_position),
            Self::SetRotation {
                object,
                new_rotation,
                ..
            } => set_transform(&mut state.scene, *object, |t| t.rotation = *new_rotation),
            Self::SetScale {
                object, new_scale, ..
            } => set_transform(&mut state.scene, *object, |t| t.scale = *new_scale),
            Self::SetCameraType {
                object,
                new_projection,
                ..
            } => set_camera(&mut state.scene, *object, *new_projection),
            Self::SetShadowCameraProperty {
                object,
                property,
                new_value,
                ..
            } => set_shadow(&mut state.scene, *object, |s| {
                s.set_camera_property(*property, *new_value);
            }),
            Self::SetShadowMapSize {
                object, new_size, ..
            } => set_shadow(&mut state.scene, *object, |s| s.map_size = *new_size),
            Self::AddScriptAsset { object, asset_path } => {
                let target = state
                    .scene
                    .object_mut(*object)
                    .ok_or(CommandError::ObjectNotFound(*object))?;
                target.scripts.push(ScriptBinding::new(asset_path.clone()));
                state.scene.notify_script_changed(*object);
                Ok(())
            }
            Self::RemoveScriptAsset {
                object,
                script_index,
                removed,
            } => {
                let index = *script_index;
                let target = state
                    .scene
                    .object_mut(*object)
                    .ok_or(CommandError::ObjectNotFound(*object))?;
                if index >= target.scripts.len() {
                    return Err(CommandError::ScriptIndexOutOfRange {
                        object: *object,
                        index,
                    });
                }
                *removed = Some(target.scripts.remove(index));
                state.scene.notify_script_changed(*object);
                Ok(())
            }
            Self::SetScriptAttribute {
                object,
                script_index,
                attribute,
                new_value,
                old_value,
            } => {
                let index = *script_index;
                let target = state
                    .scene
                    .object_mut(*object)
                    .ok_or(CommandError::ObjectNotFound(*object))?;
                let script = target.scripts.get_mut(index).ok_or(
                    CommandError::ScriptIndexOutOfRange {
                        object: *object,
                        index,
                    },
                )?;
                *old_value = script
                    .attributes
                    .insert(attribute.clone(), new_value.clone());
                state.scene.notify_script_changed(*object);
                Ok(())
            }
            Self::CopyObject { object } => {
                state.clipboard = Some(
                    state
                        .scene
                        .capture_subtree(*object)
                        .ok_or(CommandError::ObjectNotFound(*object))?,
                );
                Ok(())
            }
            Self::CutObject {
                object,
                copy,
                remove,
            } => {
                let copy = copy.get_or_insert_with(|| {
                    Box::new(Self::CopyObject { object: *object })
                });
                copy.execute(state)?;
                let remove = remove.get_or_insert_with(|| {
                    Box::new(Self::RemoveObject {
                        object: *object,
                        removed: None,
                    })
                });
                remove.execute(state)
            }
            Self::PasteObject { parent, pasted } => {
                let subtree = match pasted {
                    Some(subtree) => subtree.clone(),
                    None => {
                        let clipboard =
                            state.clipboard.as_ref().ok_or(CommandError::EmptyClipboard)?;
                        let fresh = clipboard.with_fresh_ids();
                        *pasted = Some(fresh.clone());
                        fresh
                    }
                };
                let root = state.scene.add_subtree(subtree, *parent, None);
                state.scene.select_object(root);
                Ok(())
            }
            Self::AddGraphNode { graph, node } => {
                let target = state
                    .graphs
                    .get_mut(graph)
                    .ok_or(CommandError::GraphNotFound(*graph))?;
                target.add_node(node.clone());
                state.scene.notify_graph_changed(graph.0);
                Ok(())
            }
            Self::RemoveGraphNode {
                graph,
                node,
                removed,
            } => {
                let target = state
                    .graphs
                    .get_mut(graph)
                    .ok_or(CommandError::GraphNotFound(*graph))?;
                let edges: Vec<Edge> = target.edges_for_node(*node).cloned().collect();
                let taken = target
                    .remove_node(*node)
                    .ok_or(CommandError::GraphNodeNotFound(*node))?;
                *removed = Some((taken, edges));
                state.scene.notify_graph_changed(graph.0);
                Ok(())
            }
            Self::ConnectGraphSockets {
                graph,
                source_node,
                source_socket,
                target_node,
                target_socket,
                edge,
            } => {
                let target = state
                    .graphs
                    .get_mut(graph)
                    .ok_or(CommandError::GraphNotFound(*graph))?;
                match edge {
                    // Redo: restore the original edge identity.
                    Some(edge) => target.restore_edge(edge.clone()),
                    None => {
                        let id = target.connect(
                            &state.registry,
                            *source_node,
                            source_socket,
                            *target_node,
                            target_socket,
                        )?;
                        *edge = target.edge(id).cloned();
                    }
                }
                state.scene.notify_graph_changed(graph.0);
                Ok(())
            }
            Self::DisconnectGraphSockets {
                graph,
                edge,
                removed,
            } => {
                let target = state
                    .graphs
                    .get_mut(graph)
                    .ok_or(CommandError::GraphNotFound(*graph))?;
                *removed = Some(
                    target
                        .disconnect(*edge)
                        .ok_or(CommandError::GraphEdgeNotFound(*edge))?,
                );
                state.scene.notify_graph_changed(graph.0);
                Ok(())
            }
            Self::SetGraphNodeProperty {
                graph,
                node,
                property,
                new_value,
                old_value,
            } => {
                let target = state
                    .graphs
                    .get_mut(graph)
                    .ok_or(CommandError::GraphNotFound(*graph))?;
                let target_node = target
                    .node_mut(*node)
                    .ok_or(CommandError::GraphNodeNotFound(*node))?;
                *old_value = target_node.properties.insert(property.clone(), *new_value);
                state.scene.notify_graph_changed(graph.0);
                Ok(())
            }
        }
    }

    /// Reverse the command, restoring the exact pre-execute state.
    pub fn undo(&mut self, state: &mut EditorState) -> Result<(), CommandError> {
        match self {
            Self::AddObject { object, .. } => {
                let _ = state.scene.remove_object(object.uuid);
                state.scene.select_object(None);
                Ok(())
            }
            Self::RemoveObject { object, removed } => {
                let taken = removed
                    .clone()
                    .ok_or(CommandError::ObjectNotFound(*object))?;
                let _ = state.scene.restore(taken);
                state.scene.select_object(Some(*object));
                Ok(())
            }
            Self::SetPosition {
                object,
                old_position,
                ..
            } => set_transform(&mut state.scene, *object, |t| t.position = *old_position),
            Self::SetRotation {
                object,
                old_rotation,
                ..
            } => set_transform(&mut state.scene, *object, |t| t.rotation = *old_rotation),
            Self::SetScale {
                object, old_scale, ..
            } => set_transform(&mut state.scene, *object, |t| t.scale = *old_scale),
            Self::SetCameraType {
                object,
                old_projection,
                ..
            } => set_camera(&mut state.scene, *object, *old_projection),
            Self::SetShadowCameraProperty {
                object,
                property,
                old_value,
                ..
            } => set_shadow(&mut state.scene, *object, |s| {
                s.set_camera_property(*property, *old_value);
            }),
            Self::SetShadowMapSize {
                object, old_size, ..
            } => set_shadow(&mut state.scene, *object, |s| s.map_size = *old_size),
            Self::AddScriptAsset { object, asset_path } => {
                let target = state
                    .scene
                    .object_mut(*object)
                    .ok_or(CommandError::ObjectNotFound(*object))?;
                if let Some(index) = target
                    .scripts
                    .iter()
                    .position(|s| s.asset_path == *asset_path)
                {
                    target.scripts.remove(index);
                }
                state.scene.notify_script_changed(*object);
                Ok(())
            }
            Self::RemoveScriptAsset {
                object,
                script_index,
                removed,
            } => {
                let binding = removed
                    .clone()
                    .ok_or(CommandError::ObjectNotFound(*object))?;
                let index = *script_index;
                let target = state
                    .scene
                    .object_mut(*object)
                    .ok_or(CommandError::ObjectNotFound(*object))?;
                let at = index.min(target.scripts.len());
                target.scripts.insert(at, binding);
                state.scene.notify_script_changed(*object);
                Ok(())
            }
            Self::SetScriptAttribute {
                object,
                script_index,
                attribute,
                old_value,
                ..
            } => {
                let index = *script_index;
                let target = state
                    .scene
                    .object_mut(*object)
                    .ok_or(CommandError::ObjectNotFound(*object))?;
                let script = target.scripts.get_mut(index).ok_or(
                    CommandError::ScriptIndexOutOfRange {
                        object: *object,
                        index,
                    },
                )?;
                match old_value.take() {
                    Some(value) => {
                        script.attributes.insert(attribute.clone(), value);
                    }
                    None => {
                        script.attributes.shift_remove(attribute);
                    }
                }
                state.scene.notify_script_changed(*object);
                Ok(())
            }
            // Copy does not touch the scene; nothing to reverse.
            Self::CopyObject { .. } => Ok(()),
            Self::CutObject { copy, remove, .. } => {
                // Sub-commands undo in reverse execution order.
                if let Some(remove) = remove {
                    remove.undo(state)?;
                }
                if let Some(copy) = copy {
                    copy.undo(state)?;
                }
                Ok(())
            }
            Self::PasteObject { pasted, .. } => {
                if let Some(root) = pasted.as_ref().and_then(|s| s.root()) {
                    let _ = state.scene.remove_object(root.uuid);
                    state.scene.select_object(None);
                }
                Ok(())
            }
            Self::AddGraphNode { graph, node } => {
                let target = state
                    .graphs
                    .get_mut(graph)
                    .ok_or(CommandError::GraphNotFound(*graph))?;
                target.remove_node(node.id);
                state.scene.notify_graph_changed(graph.0);
                Ok(())
            }
            Self::RemoveGraphNode { graph, removed, .. } => {
                let (node, edges) = removed
                    .clone()
                    .ok_or(CommandError::GraphNotFound(*graph))?;
                let target = state
                    .graphs
                    .get_mut(graph)
                    .ok_or(CommandError::GraphNotFound(*graph))?;
                target.add_node(node);
                for edge in edges {
                    target.restore_edge(edge);
                }
                state.scene.notify_graph_changed(graph.0);
                Ok(())
            }
            Self::ConnectGraphSockets { graph, edge, .. } => {
                let target = state
                    .graphs
                    .get_mut(graph)
                    .ok_or(CommandError::GraphNotFound(*graph))?;
                if let Some(edge) = edge {
                    target.disconnect(edge.id);
                }
                state.scene.notify_graph_changed(graph.0);
                Ok(())
            }
            Self::DisconnectGraphSockets { graph, removed, .. } => {
                let edge = removed
                    .clone()
                    .ok_or(CommandError::GraphNotFound(*graph))?;
                let target = state
                    .graphs
                    .get_mut(graph)
                    .ok_or(CommandError::GraphNotFound(*graph))?;
                target.restore_edge(edge);
                state.scene.notify_graph_changed(graph.0);
                Ok(())
            }
            Self::SetGraphNodeProperty {
                graph,
                node,
                property,
                old_value,
                ..
            } => {
                let target = state
                    .graphs
                    .get_mut(graph)
                    .ok_or(CommandError::GraphNotFound(*graph))?;
                let target_node = target
                    .node_mut(*node)
                    .ok_or(CommandError::GraphNodeNotFound(*node))?;
                match old_value.take() {
                    Some(value) => {
                        target_node.properties.insert(property.clone(), value);
                    }
                    None => {
                        target_node.properties.shift_remove(property);
                    }
                }
                state.scene.notify_graph_changed(graph.0);
                Ok(())
            }
        }
    }
}

fn set_transform(
    scene: &mut Scene,
    object: ObjectId,
    apply: impl FnOnce(&mut crate::scene::Transform),
) -> Result<(), CommandError> {
    let target = scene
        .object_mut(object)
        .ok_or(CommandError::ObjectNotFound(object))?;
    apply(&mut target.transform);
    scene.notify_changed(object);
    Ok(())
}

fn set_camera(
    scene: &mut Scene,
    object: ObjectId,
    projection: CameraProjection,
) -> Result<(), CommandError> {
    let target = scene
        .object_mut(object)
        .ok_or(CommandError::ObjectNotFound(object))?;
    if target.camera.is_none() {
        return Err(CommandError::NotACamera(object));
    }
    target.camera = Some(projection);
    scene.notify_changed(object);
    Ok(())
}

fn set_shadow(
    scene: &mut Scene,
    object: ObjectId,
    apply: impl FnOnce(&mut crate::scene::ShadowSettings),
) -> Result<(), CommandError> {
    let target = scene
        .object_mut(object)
        .ok_or(CommandError::ObjectNotFound(object))?;
    let Some(shadow) = target.shadow.as_mut() else {
        return Err(CommandError::NoShadow(object));
    };
    apply(shadow);
    scene.notify_changed(object);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::ObjectKind;

    fn state_with_mesh() -> (EditorState, ObjectId) {
        let mut state = EditorState::new();
        let object = SceneObject::new("Box", ObjectKind::Mesh);
        let id = object.uuid;
        state.scene.add_object(object, None, None);
        (state, id)
    }

    #[test]
    fn test_add_object_round_trip() {
        let mut state = EditorState::new();
        let object = SceneObject::new("Box", ObjectKind::Mesh);
        let id = object.uuid;
        let mut cmd = Command::AddObject {
            object,
            parent: None,
            index: None,
        };

        cmd.execute(&mut state).unwrap();
        assert!(state.scene.contains(id));
        assert_eq!(state.scene.selected(), Some(id));

        cmd.undo(&mut state).unwrap();
        assert!(!state.scene.contains(id));
        assert!(state.scene.is_empty());
    }

    #[test]
    fn test_set_position_restores_exact_state() {
        let (mut state, id) = state_with_mesh();
        let mut cmd = Command::set_position(&state.scene, id, [1.0, 2.0, 3.0]).unwrap();

        cmd.execute(&mut state).unwrap();
        assert_eq!(
            state.scene.object_by_uuid(id).unwrap().transform.position,
            [1.0, 2.0, 3.0]
        );

        cmd.undo(&mut state).unwrap();
        assert_eq!(
            state.scene.object_by_uuid(id).unwrap().transform.position,
            [0.0, 0.0, 0.0]
        );
    }

    #[test]
    fn test_remove_object_restores_subtree() {
        let (mut state, parent) = state_with_mesh();
        let child = SceneObject::new("Child", ObjectKind::Mesh);
        let child_id = child.uuid;
        state.scene.add_object(child, Some(parent), None);

        let mut cmd = Command::RemoveObject {
            object: parent,
            removed: None,
        };
        cmd.execute(&mut state).unwrap();
        assert!(state.scene.is_empty());

        cmd.undo(&mut state).unwrap();
        assert!(state.scene.contains(parent));
        assert!(state.scene.contains(child_id));
        assert_eq!(
            state.scene.object_by_uuid(child_id).unwrap().parent,
            Some(parent)
        );
    }

    #[test]
    fn test_camera_type_switch() {
        let mut state = EditorState::new();
        let camera = SceneObject::new("Camera", ObjectKind::Camera);
        let id = camera.uuid;
        state.scene.add_object(camera, None, None);

        let ortho = CameraProjection::Orthographic {
            size: 5.0,
            near: 0.1,
            far: 100.0,
        };
        let mut cmd = Command::set_camera_type(&state.scene, id, ortho).unwrap();
        cmd.execute(&mut state).unwrap();
        assert_eq!(state.scene.object_by_uuid(id).unwrap().camera, Some(ortho));

        cmd.undo(&mut state).unwrap();
        assert_eq!(
            state.scene.object_by_uuid(id).unwrap().camera,
            Some(CameraProjection::default())
        );

        // Not a camera: constructor refuses
        let mesh = SceneObject::new("Box", ObjectKind::Mesh);
        let mesh_id = mesh.uuid;
        state.scene.add_object(mesh, None, None);
        assert!(matches!(
            Command::set_camera_type(&state.scene, mesh_id, ortho),
            Err(CommandError::NotACamera(_))
        ));
    }

    #[test]
    fn test_shadow_property_and_map_size() {
        let mut state = EditorState::new();
        let light = SceneObject::new("Sun", ObjectKind::Light);
        let id = light.uuid;
        state.scene.add_object(light, None, None);

        let mut area =
            Command::set_shadow_camera_property(&state.scene, id, ShadowCameraProperty::Area, 12.0)
                .unwrap();
        area.execute(&mut state).unwrap();
        assert_eq!(
            state.scene.object_by_uuid(id).unwrap().shadow.unwrap().area,
            12.0
        );
        area.undo(&mut state).unwrap();
        assert_eq!(
            state.scene.object_by_uuid(id).unwrap().shadow.unwrap().area,
            5.0
        );

        let mut size = Command::set_shadow_map_size(&state.scene, id, 2048).unwrap();
        size.execute(&mut state).unwrap();
        assert_eq!(
            state
                .scene
                .object_by_uuid(id)
                .unwrap()
                .shadow
                .unwrap()
                .map_size,
            2048
        );
        size.undo(&mut state).unwrap();
        assert_eq!(
            state
                .scene
                .object_by_uuid(id)
                .unwrap()
                .shadow
                .unwrap()
                .map_size,
            512
        );
    }

    #[test]
    fn test_script_lifecycle() {
        let (mut state, id) = state_with_mesh();

        let mut add = Command::AddScriptAsset {
            object: id,
            asset_path: "scripts/spin.js".to_string(),
        };
        add.execute(&mut state).unwrap();
        assert_eq!(state.scene.object_by_uuid(id).unwrap().scripts.len(), 1);

        let mut set = Command::SetScriptAttribute {
            object: id,
            script_index: 0,
            attribute: "speed".to_string(),
            new_value: ScriptValue::Number(2.0),
            old_value: None,
        };
        set.execute(&mut state).unwrap();
        assert_eq!(
            state.scene.object_by_uuid(id).unwrap().scripts[0]
                .attributes
                .get("speed"),
            Some(&ScriptValue::Number(2.0))
        );

        set.undo(&mut state).unwrap();
        assert!(state.scene.object_by_uuid(id).unwrap().scripts[0]
            .attributes
            .is_empty());

        let mut remove = Command::RemoveScriptAsset {
            object: id,
            script_index: 0,
            removed: None,
        };
        remove.execute(&mut state).unwrap();
        assert!(state.scene.object_by_uuid(id).unwrap().scripts.is_empty());
        remove.undo(&mut state).unwrap();
        assert_eq!(state.scene.object_by_uuid(id).unwrap().scripts.len(), 1);
    }

    #[test]
    fn test_cut_is_copy_plus_remove_and_undoes_in_reverse() {
        let (mut state, id) = state_with_mesh();

        let mut cut = Command::CutObject {
            object: id,
            copy: None,
            remove: None,
        };
        cut.execute(&mut state).unwrap();
        assert!(!state.scene.contains(id));
        assert!(state.clipboard.is_some());

        cut.undo(&mut state).unwrap();
        assert!(state.scene.contains(id));
    }

    #[test]
    fn test_paste_regenerates_ids_and_redo_keeps_them() {
        let (mut state, id) = state_with_mesh();
        Command::CopyObject { object: id }
            .execute(&mut state)
            .unwrap();

        let mut paste = Command::PasteObject {
            parent: None,
            pasted: None,
        };
        paste.execute(&mut state).unwrap();
        assert_eq!(state.scene.len(), 2);
        let pasted_id = paste.pasted_root().expect("paste captured its subtree");
        assert_ne!(pasted_id, id);

        paste.undo(&mut state).unwrap();
        assert_eq!(state.scene.len(), 1);

        // Redo restores the same identity.
        paste.execute(&mut state).unwrap();
        assert!(state.scene.contains(pasted_id));
    }

    #[test]
    fn test_graph_commands_round_trip() {
        let mut state = EditorState::new();
        let graph_id = state.add_material_graph("Material");

        let float = state.registry.create_node("float").unwrap();
        let float_id = float.id;
        let mut add = Command::AddGraphNode {
            graph: graph_id,
            node: float,
        };
        add.execute(&mut state).unwrap();
        assert!(state.graphs[&graph_id].node(float_id).is_some());

        let output = state.graphs[&graph_id]
            .nodes()
            .find(|n| n.type_name == "output_standard")
            .map(|n| n.id)
            .unwrap();
        let mut connect = Command::ConnectGraphSockets {
            graph: graph_id,
            source_node: float_id,
            source_socket: "value".to_string(),
            target_node: output,
            target_socket: "roughness".to_string(),
            edge: None,
        };
        connect.execute(&mut state).unwrap();
        assert_eq!(state.graphs[&graph_id].edge_count(), 1);

        let mut set = Command::SetGraphNodeProperty {
            graph: graph_id,
            node: float_id,
            property: "value".to_string(),
            new_value: Value::Float(0.8),
            old_value: None,
        };
        set.execute(&mut state).unwrap();
        assert_eq!(
            state.graphs[&graph_id].node(float_id).unwrap().property("value"),
            Some(&Value::Float(0.8))
        );
        set.undo(&mut state).unwrap();
        assert_eq!(
            state.graphs[&graph_id].node(float_id).unwrap().property("value"),
            Some(&Value::Float(0.0))
        );

        connect.undo(&mut state).unwrap();
        assert_eq!(state.graphs[&graph_id].edge_count(), 0);
        // Redo restores the same edge identity.
        connect.execute(&mut state).unwrap();
        assert_eq!(state.graphs[&graph_id].edge_count(), 1);

        let mut remove = Command::RemoveGraphNode {
            graph: graph_id,
            node: float_id,
            removed: None,
        };
        remove.execute(&mut state).unwrap();
        assert!(state.graphs[&graph_id].node(float_id).is_none());
        assert_eq!(state.graphs[&graph_id].edge_count(), 0);

        remove.undo(&mut state).unwrap();
        assert!(state.graphs[&graph_id].node(float_id).is_some());
        assert_eq!(state.graphs[&graph_id].edge_count(), 1);
    }
}
