// SPDX-License-Identifier: MIT OR Apache-2.0
//! The authoritative scene object registry.
//!
//! A thin data-owning registry: objects keyed by uuid with parent/child
//! links, a selection, and a drainable event queue that commands push to
//! after every mutation. All nontrivial behavior (reversibility,
//! compilation) lives in the command and graph layers.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a scene object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ObjectId(pub Uuid);

impl ObjectId {
    /// Create a new random object ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ObjectId {
    fn default() -> Self {
        Self::new()
    }
}

/// What kind of scene object this is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ObjectKind {
    /// Plain grouping node
    Group,
    /// Renderable mesh
    Mesh,
    /// Light source
    Light,
    /// Camera
    Camera,
}

/// Local transform of a scene object
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    /// Position (x, y, z)
    pub position: [f32; 3],
    /// Euler rotation in radians (x, y, z)
    pub rotation: [f32; 3],
    /// Scale (x, y, z)
    pub scale: [f32; 3],
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: [0.0; 3],
            rotation: [0.0; 3],
            scale: [1.0; 3],
        }
    }
}

/// Camera projection parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum CameraProjection {
    /// Perspective projection
    Perspective {
        /// Vertical field of view in degrees
        fov: f32,
        /// Near plane
        near: f32,
        /// Far plane
        far: f32,
    },
    /// Orthographic projection
    Orthographic {
        /// Half-height of the view volume
        size: f32,
        /// Near plane
        near: f32,
        /// Far plane
        far: f32,
    },
}

impl Default for CameraProjection {
    fn default() -> Self {
        Self::Perspective {
            fov: 50.0,
            near: 0.1,
            far: 1000.0,
        }
    }
}

/// Shadow parameters of a light
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ShadowSettings {
    /// Shadow camera near plane
    pub near: f32,
    /// Shadow camera far plane
    pub far: f32,
    /// Half-extent of the shadow camera frustum
    pub area: f32,
    /// Depth bias
    pub bias: f32,
    /// Shadow map resolution (square)
    pub map_size: u32,
}

impl Default for ShadowSettings {
    fn default() -> Self {
        Self {
            near: 0.5,
            far: 500.0,
            area: 5.0,
            bias: 0.0,
            map_size: 512,
        }
    }
}

/// A property of the shadow camera that the editor can drive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ShadowCameraProperty {
    /// Near plane
    Near,
    /// Far plane
    Far,
    /// Frustum half-extent
    Area,
    /// Depth bias
    Bias,
}

impl ShadowSettings {
    /// Read a shadow camera property
    pub fn camera_property(&self, property: ShadowCameraProperty) -> f32 {
        match property {
            ShadowCameraProperty::Near => self.near,
            ShadowCameraProperty::Far => self.far,
            ShadowCameraProperty::Area => self.area,
            ShadowCameraProperty::Bias => self.bias,
        }
    }

    /// Write a shadow camera property
    pub fn set_camera_property(&mut self, property: ShadowCameraProperty, value: f32) {
        match property {
            ShadowCameraProperty::Near => self.near = value,
            ShadowCameraProperty::Far => self.far = value,
            ShadowCameraProperty::Area => self.area = value,
            ShadowCameraProperty::Bias => self.bias = value,
        }
    }
}

/// A value assigned to a script attribute
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ScriptValue {
    /// Boolean
    Bool(bool),
    /// Numeric
    Number(f64),
    /// Text
    Text(String),
}

/// A script asset attached to an object, with per-instance attributes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScriptBinding {
    /// Project path of the script asset
    pub asset_path: String,
    /// Attribute overrides for this instance
    pub attributes: IndexMap<String, ScriptValue>,
}

impl ScriptBinding {
    /// Create a binding with no attribute overrides
    pub fn new(asset_path: impl Into<String>) -> Self {
        Self {
            asset_path: asset_path.into(),
            attributes: IndexMap::new(),
        }
    }
}

/// A scene object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneObject {
    /// Stable unique identifier
    pub uuid: ObjectId,
    /// Display name
    pub name: String,
    /// Object kind
    pub kind: ObjectKind,
    /// Local transform
    pub transform: Transform,
    /// Visibility flag
    pub visible: bool,
    /// Parent object, `None` for roots
    pub parent: Option<ObjectId>,
    /// Child objects, in order
    pub children: Vec<ObjectId>,
    /// Camera parameters, present on cameras
    pub camera: Option<CameraProjection>,
    /// Shadow parameters, present on shadow-casting lights
    pub shadow: Option<ShadowSettings>,
    /// Attached scripts, in order
    pub scripts: Vec<ScriptBinding>,
}

impl SceneObject {
    /// Create a new object. Cameras get default projection parameters and
    /// lights get default shadow settings.
    pub fn new(name: impl Into<String>, kind: ObjectKind) -> Self {
        Self {
            uuid: ObjectId::new(),
            name: name.into(),
            kind,
            transform: Transform::default(),
            visible: true,
            parent: None,
            children: Vec::new(),
            camera: (kind == ObjectKind::Camera).then(CameraProjection::default),
            shadow: (kind == ObjectKind::Light).then(ShadowSettings::default),
            scripts: Vec::new(),
        }
    }

    /// Set the position
    pub fn with_position(mut self, position: [f32; 3]) -> Self {
        self.transform.position = position;
        self
    }
}

/// Notification emitted after a scene mutation. The UI (or the live sync
/// bridge) drains these each frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SceneEvent {
    /// An object (and its subtree) was added
    ObjectAdded(ObjectId),
    /// An object (and its subtree) was removed
    ObjectRemoved(ObjectId),
    /// An object's data changed in place
    ObjectChanged(ObjectId),
    /// An object's script list or attributes changed
    ScriptChanged(ObjectId),
    /// The selection changed
    SelectionChanged(Option<ObjectId>),
    /// A material graph changed
    GraphChanged(Uuid),
}

/// A detached subtree of objects, parent-first. `objects[0]` is the root.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subtree {
    /// Objects in parent-first order
    pub objects: Vec<SceneObject>,
}

impl Subtree {
    /// The subtree root
    pub fn root(&self) -> Option<&SceneObject> {
        self.objects.first()
    }

    /// Clone the subtree with fresh uuids, remapping internal parent and
    /// child links. Used by paste so every paste yields new identities.
    pub fn with_fresh_ids(&self) -> Self {
        let remap: IndexMap<ObjectId, ObjectId> = self
            .objects
            .iter()
            .map(|o| (o.uuid, ObjectId::new()))
            .collect();
        let objects = self
            .objects
            .iter()
            .map(|o| {
                let mut clone = o.clone();
                clone.uuid = remap[&o.uuid];
                clone.parent = o.parent.and_then(|p| remap.get(&p).copied());
                clone.children = o
                    .children
                    .iter()
                    .filter_map(|c| remap.get(c).copied())
                    .collect();
                clone
            })
            .collect();
        Self { objects }
    }
}

/// A subtree removed from the scene, with enough placement information to
/// reverse the removal exactly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemovedObject {
    /// The removed objects
    pub subtree: Subtree,
    /// Parent the root was detached from, `None` for a root object
    pub parent: Option<ObjectId>,
    /// Index within the parent's children (or the root list)
    pub index: usize,
}

/// The scene: the authoritative set of objects.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Scene {
    objects: IndexMap<ObjectId, SceneObject>,
    roots: Vec<ObjectId>,
    selected: Option<ObjectId>,
    #[serde(skip)]
    events: Vec<SceneEvent>,
}

impl Scene {
    /// Create an empty scene
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up an object by uuid
    pub fn object_by_uuid(&self, id: ObjectId) -> Option<&SceneObject> {
        self.objects.get(&id)
    }

    /// Mutable lookup. Callers are expected to follow mutation with
    /// [`Scene::notify_changed`].
    pub fn object_mut(&mut self, id: ObjectId) -> Option<&mut SceneObject> {
        self.objects.get_mut(&id)
    }

    /// Number of objects in the scene
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// Whether the scene is empty
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Whether an object exists
    pub fn contains(&self, id: ObjectId) -> bool {
        self.objects.contains_key(&id)
    }

    /// All objects, in insertion order
    pub fn objects(&self) -> impl Iterator<Item = &SceneObject> {
        self.objects.values()
    }

    /// Root object ids, in order
    pub fn roots(&self) -> &[ObjectId] {
        &self.roots
    }

    /// Currently selected object
    pub fn selected(&self) -> Option<ObjectId> {
        self.selected
    }

    /// Add an object under `parent` (or as a root) at `index` (or at the
    /// end).
    pub fn add_object(
        &mut self,
        mut object: SceneObject,
        parent: Option<ObjectId>,
        index: Option<usize>,
    ) {
        let id = object.uuid;
        object.parent = parent;
        self.objects.insert(id, object);
        self.attach(id, parent, index);
        self.events.push(SceneEvent::ObjectAdded(id));
    }

    /// Re-insert a removed or pasted subtree. Links between subtree
    /// members are taken verbatim; only the root is re-attached.
    pub fn add_subtree(
        &mut self,
        subtree: Subtree,
        parent: Option<ObjectId>,
        index: Option<usize>,
    ) -> Option<ObjectId> {
        let root_id = subtree.root()?.uuid;
        for (i, mut object) in subtree.objects.into_iter().enumerate() {
            if i == 0 {
                object.parent = parent;
            }
            self.objects.insert(object.uuid, object);
        }
        self.attach(root_id, parent, index);
        self.events.push(SceneEvent::ObjectAdded(root_id));
        Some(root_id)
    }

    fn attach(&mut self, id: ObjectId, parent: Option<ObjectId>, index: Option<usize>) {
        match parent.and_then(|p| self.objects.get_mut(&p)) {
            Some(parent_object) => {
                let at = index
                    .unwrap_or(parent_object.children.len())
                    .min(parent_object.children.len());
                if !parent_object.children.contains(&id) {
                    parent_object.children.insert(at, id);
                }
            }
            None => {
                let at = index.unwrap_or(self.roots.len()).min(self.roots.len());
                if !self.roots.contains(&id) {
                    self.roots.insert(at, id);
                }
            }
        }
    }

    /// Remove an object and its descendants, returning everything needed
    /// to reverse the removal.
    pub fn remove_object(&mut self, id: ObjectId) -> Option<RemovedObject> {
        let parent = self.objects.get(&id)?.parent;

        // Detach the root from its sibling list first, remembering where
        // it sat.
        let index = match parent.and_then(|p| self.objects.get_mut(&p)) {
            Some(parent_object) => {
                let index = parent_object.children.iter().position(|c| *c == id)?;
                parent_object.children.remove(index);
                index
            }
            None => {
                let index = self.roots.iter().position(|r| *r == id)?;
                self.roots.remove(index);
                index
            }
        };

        let mut removed = Vec::new();
        let mut queue = vec![id];
        while let Some(next) = queue.pop() {
            if let Some(object) = self.objects.swap_remove(&next) {
                queue.extend(object.children.iter().rev().copied());
                removed.push(object);
            }
        }

        if self
            .selected
            .is_some_and(|s| removed.iter().any(|o| o.uuid == s))
        {
            self.selected = None;
            self.events.push(SceneEvent::SelectionChanged(None));
        }
        self.events.push(SceneEvent::ObjectRemoved(id));

        Some(RemovedObject {
            subtree: Subtree { objects: removed },
            parent,
            index,
        })
    }

    /// Reverse a removal exactly: same parent, same index, same uuids.
    pub fn restore(&mut self, removed: RemovedObject) -> Option<ObjectId> {
        self.add_subtree(removed.subtree, removed.parent, Some(removed.index))
    }

    /// Clone an object and its descendants into a detached subtree
    /// (parent-first order). Used by copy.
    pub fn capture_subtree(&self, id: ObjectId) -> Option<Subtree> {
        let mut objects = Vec::new();
        let mut queue = vec![id];
        while let Some(next) = queue.pop() {
            let object = self.objects.get(&next)?;
            queue.extend(object.children.iter().rev().copied());
            objects.push(object.clone());
        }
        Some(Subtree { objects })
    }

    /// Change the selection
    pub fn select_object(&mut self, id: Option<ObjectId>) {
        if self.selected != id {
            self.selected = id;
            self.events.push(SceneEvent::SelectionChanged(id));
        }
    }

    /// Notify that an object's data changed in place
    pub fn notify_changed(&mut self, id: ObjectId) {
        self.events.push(SceneEvent::ObjectChanged(id));
    }

    /// Notify that an object's scripts changed
    pub fn notify_script_changed(&mut self, id: ObjectId) {
        self.events.push(SceneEvent::ScriptChanged(id));
    }

    /// Notify that a material graph changed
    pub fn notify_graph_changed(&mut self, graph: Uuid) {
        self.events.push(SceneEvent::GraphChanged(graph));
    }

    /// Drain pending events, oldest first
    pub fn drain_events(&mut self) -> Vec<SceneEvent> {
        std::mem::take(&mut self.events)
    }
}
