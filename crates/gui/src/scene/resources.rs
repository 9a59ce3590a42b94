//! Graphics resource registry
//!
//! Tracks every geometry, material and texture handed out to the scene so
//! teardown can verify nothing leaked. Handles are never reused.

use std::collections::HashMap;

use glam::Vec3;

use crate::helpers::Rgb;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GeometryId(u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MaterialId(u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TextureId(u32);

/// Geometry description; all boxes are unit-sized and scaled by the object transform
#[derive(Debug, Clone, PartialEq)]
pub enum Geometry {
    /// Unit cube centered at the origin
    Box,
    /// The 12 edges of the unit cube
    BoxEdges,
    /// Extruded text anchored at its baseline-left corner
    Text { text: String, size: f32, depth: f32 },
    /// Open polyline
    Curve { points: Vec<Vec3> },
    /// Unit quad used by billboard sprites
    Sprite,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MaterialKind {
    Mesh,
    Line,
    Sprite { texture: TextureId },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Material {
    pub kind: MaterialKind,
    pub color: Rgb,
    pub opacity: f32,
    pub transparent: bool,
}

impl Material {
    pub fn mesh(color: Rgb) -> Self {
        Self {
            kind: MaterialKind::Mesh,
            color,
            opacity: 1.0,
            transparent: false,
        }
    }

    pub fn translucent(color: Rgb, opacity: f32) -> Self {
        Self {
            kind: MaterialKind::Mesh,
            color,
            opacity,
            transparent: true,
        }
    }

    pub fn line(color: Rgb) -> Self {
        Self {
            kind: MaterialKind::Line,
            color,
            opacity: 1.0,
            transparent: false,
        }
    }
}

/// Offscreen canvas backing a sprite: a few lines of text on a panel
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Texture {
    pub width: f32,
    pub height: f32,
    pub lines: Vec<String>,
    /// Bumped on every redraw
    pub revision: u64,
}

/// Live allocation counts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MemoryInfo {
    pub geometries: usize,
    pub materials: usize,
    pub textures: usize,
}

/// Owner of all graphics resources referenced by scene objects
#[derive(Debug, Default)]
pub struct Resources {
    geometries: HashMap<GeometryId, Geometry>,
    materials: HashMap<MaterialId, Material>,
    textures: HashMap<TextureId, Texture>,
    next_id: u32,
}

impl Resources {
    pub fn new() -> Self {
        Self::default()
    }

    fn next(&mut self) -> u32 {
        self.next_id += 1;
        self.next_id
    }

    pub fn add_geometry(&mut self, geometry: Geometry) -> GeometryId {
        let id = GeometryId(self.next());
        self.geometries.insert(id, geometry);
        id
    }

    pub fn add_material(&mut self, material: Material) -> MaterialId {
        let id = MaterialId(self.next());
        self.materials.insert(id, material);
        id
    }

    pub fn add_texture(&mut self, texture: Texture) -> TextureId {
        let id = TextureId(self.next());
        self.textures.insert(id, texture);
        id
    }

    pub fn geometry(&self, id: GeometryId) -> Option<&Geometry> {
        self.geometries.get(&id)
    }

    pub fn material(&self, id: MaterialId) -> Option<&Material> {
        self.materials.get(&id)
    }

    pub fn texture(&self, id: TextureId) -> Option<&Texture> {
        self.textures.get(&id)
    }

    pub fn texture_mut(&mut self, id: TextureId) -> Option<&mut Texture> {
        self.textures.get_mut(&id)
    }

    /// Release a geometry. Disposing twice is a no-op; returns whether it was live.
    pub fn dispose_geometry(&mut self, id: GeometryId) -> bool {
        self.geometries.remove(&id).is_some()
    }

    pub fn dispose_material(&mut self, id: MaterialId) -> bool {
        self.materials.remove(&id).is_some()
    }

    pub fn dispose_texture(&mut self, id: TextureId) -> bool {
        self.textures.remove(&id).is_some()
    }

    pub fn memory(&self) -> MemoryInfo {
        MemoryInfo {
            geometries: self.geometries.len(),
            materials: self.materials.len(),
            textures: self.textures.len(),
        }
    }
}
