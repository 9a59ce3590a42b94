//! Scene graph
//!
//! Objects live in a slot arena owned by [`SceneGraph`]. Every object is
//! either a data primitive (tagged with what it represents, pickable for
//! tooltips) or a decoration (frames, labels, outlines, curves). Freed
//! slots are reused; the key version makes a stale [`ObjectId`] stop
//! resolving.

pub mod builder;
pub mod city;
pub mod resources;

use glam::{EulerRot, Mat4, Quat, Vec3};
use shared::GridPos;
use slotmap::SlotMap;

use crate::helpers::Rgb;
use crate::hierarchy::NodeId;
use resources::{GeometryId, MaterialId, Resources};

slotmap::new_key_type! {
    pub struct ObjectId;
}

/// What a data primitive stands for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tag {
    Hierarchy(NodeId),
    Building(GridPos),
}

/// Non-data geometry; never a pick target
#[derive(Debug, Clone, PartialEq)]
pub enum Decoration {
    /// Edge frame drawn around every box
    Frame,
    /// Highlight outline attached to the focused object
    Outline,
    Label(String),
    Platform,
    /// Transient link between two buildings
    Connection,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ObjectKind {
    Data(Tag),
    Decoration(Decoration),
}

/// Local transform: translation, Euler XYZ rotation (radians), scale
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Vec3,
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Vec3::ZERO,
            scale: Vec3::ONE,
        }
    }
}

impl Transform {
    pub fn at(position: Vec3) -> Self {
        Self {
            position,
            ..Self::default()
        }
    }

    pub fn with_scale(mut self, scale: Vec3) -> Self {
        self.scale = scale;
        self
    }

    pub fn with_rotation(mut self, rotation: Vec3) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn matrix(&self) -> Mat4 {
        let rotation = Quat::from_euler(
            EulerRot::XYZ,
            self.rotation.x,
            self.rotation.y,
            self.rotation.z,
        );
        Mat4::from_scale_rotation_translation(self.scale, rotation, self.position)
    }
}

#[derive(Debug, Clone)]
pub struct SceneObject {
    pub kind: ObjectKind,
    pub transform: Transform,
    pub geometry: GeometryId,
    pub material: MaterialId,
    /// Higher values draw later
    pub render_order: i32,
    pub parent: Option<ObjectId>,
    pub children: Vec<ObjectId>,
}

impl SceneObject {
    pub fn new(kind: ObjectKind, transform: Transform, geometry: GeometryId, material: MaterialId) -> Self {
        Self {
            kind,
            transform,
            geometry,
            material,
            render_order: 0,
            parent: None,
            children: Vec::new(),
        }
    }

    pub fn tag(&self) -> Option<Tag> {
        match self.kind {
            ObjectKind::Data(tag) => Some(tag),
            ObjectKind::Decoration(_) => None,
        }
    }
}

/// Tree of scene objects plus the scene-wide offset
#[derive(Debug, Default)]
pub struct SceneGraph {
    objects: SlotMap<ObjectId, SceneObject>,
    roots: Vec<ObjectId>,
    /// Translation applied to the whole scene
    pub position: Vec3,
    pub background: Option<Rgb>,
}

impl SceneGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a top-level object
    pub fn add(&mut self, object: SceneObject) -> ObjectId {
        let id = self.insert(object, None);
        self.roots.push(id);
        id
    }

    /// Add an object under `parent`; returns `None` if the parent is gone
    pub fn add_child(&mut self, parent: ObjectId, object: SceneObject) -> Option<ObjectId> {
        self.get(parent)?;
        let id = self.insert(object, Some(parent));
        if let Some(p) = self.get_mut(parent) {
            p.children.push(id);
        }
        Some(id)
    }

    fn insert(&mut self, mut object: SceneObject, parent: Option<ObjectId>) -> ObjectId {
        object.parent = parent;
        self.objects.insert(object)
    }

    pub fn get(&self, id: ObjectId) -> Option<&SceneObject> {
        self.objects.get(id)
    }

    pub fn get_mut(&mut self, id: ObjectId) -> Option<&mut SceneObject> {
        self.objects.get_mut(id)
    }

    pub fn contains(&self, id: ObjectId) -> bool {
        self.get(id).is_some()
    }

    pub fn tag(&self, id: ObjectId) -> Option<Tag> {
        self.get(id).and_then(SceneObject::tag)
    }

    pub fn roots(&self) -> &[ObjectId] {
        &self.roots
    }

    /// Number of live objects
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// Slots allocated so far, live or free
    pub fn capacity(&self) -> usize {
        self.objects.capacity()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// All live objects, parents before children
    pub fn iter(&self) -> impl Iterator<Item = (ObjectId, &SceneObject)> + '_ {
        let mut stack: Vec<ObjectId> = self.roots.iter().rev().copied().collect();
        std::iter::from_fn(move || {
            while let Some(id) = stack.pop() {
                if let Some(object) = self.get(id) {
                    stack.extend(object.children.iter().rev().copied());
                    return Some((id, object));
                }
            }
            None
        })
    }

    /// Find the data object carrying `tag`
    pub fn find_tagged(&self, tag: Tag) -> Option<ObjectId> {
        self.iter()
            .find(|(_, o)| o.tag() == Some(tag))
            .map(|(id, _)| id)
    }

    /// World matrix: scene offset, then every ancestor's local transform
    pub fn world_matrix(&self, id: ObjectId) -> Option<Mat4> {
        let mut matrix = self.get(id)?.transform.matrix();
        let mut current = self.get(id)?.parent;
        while let Some(p) = current {
            let parent = self.get(p)?;
            matrix = parent.transform.matrix() * matrix;
            current = parent.parent;
        }
        Some(Mat4::from_translation(self.position) * matrix)
    }

    /// Detach an object and its subtree from the graph and return them.
    /// Resources are left untouched.
    pub fn remove(&mut self, id: ObjectId) -> Vec<SceneObject> {
        let Some(object) = self.get(id) else {
            return Vec::new();
        };
        match object.parent {
            Some(p) => {
                if let Some(parent) = self.get_mut(p) {
                    parent.children.retain(|&c| c != id);
                }
            }
            None => self.roots.retain(|&r| r != id),
        }

        let mut removed = Vec::new();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            if let Some(object) = self.objects.remove(current) {
                stack.extend(object.children.iter().copied());
                removed.push(object);
            }
        }
        removed
    }

    /// Remove an object and release the geometry and material of it and
    /// every descendant.
    pub fn dispose(&mut self, id: ObjectId, resources: &mut Resources) {
        for object in self.remove(id) {
            resources.dispose_geometry(object.geometry);
            resources.dispose_material(object.material);
        }
    }

    /// Dispose every object in the scene
    pub fn clear(&mut self, resources: &mut Resources) {
        for root in self.roots.clone().into_iter().rev() {
            self.dispose(root, resources);
        }
        self.objects.clear();
    }
}
