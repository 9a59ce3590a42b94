//! Pointer state and the focus highlight
//!
//! The focused object gets an outline child with its own edge geometry and
//! line material. Buildings additionally get connection curves to the
//! buildings they link to. Everything attached here is disposed again as
//! soon as focus is lost, so overlay allocations never accumulate.

use glam::{Vec2, Vec3};

use crate::helpers::Rgb;
use crate::scene::resources::{Geometry, Material, Resources};
use crate::scene::{Decoration, ObjectId, ObjectKind, SceneGraph, SceneObject, Transform};

pub const OUTLINE_COLOR: Rgb = Rgb::from_hex(0x666666);
pub const CONNECTION_COLOR: Rgb = Rgb::from_hex(0xd62728);

/// What the pointer currently highlights. The object id is a lookup
/// handle into the scene graph, not ownership.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Focus {
    #[default]
    None,
    Object {
        object: ObjectId,
        outline: Option<ObjectId>,
        connections: Vec<ObjectId>,
    },
}

impl Focus {
    pub fn object(&self) -> Option<ObjectId> {
        match self {
            Focus::None => None,
            Focus::Object { object, .. } => Some(*object),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PickState {
    /// Pointer position in absolute screen pixels
    pub screen: Vec2,
    /// Pointer position in normalized device coordinates
    pub ndc: Vec2,
    pub focus: Focus,
}

impl PickState {
    pub fn focused(&self) -> Option<ObjectId> {
        self.focus.object()
    }

    /// Highlight `object`, replacing any previous focus. `curves` are
    /// polylines in scene coordinates drawn as connection decorations.
    pub fn focus_on(
        &mut self,
        object: ObjectId,
        curves: Vec<Vec<Vec3>>,
        scene: &mut SceneGraph,
        resources: &mut Resources,
    ) {
        self.clear_focus(scene, resources);

        let outline = SceneObject {
            render_order: 1,
            ..SceneObject::new(
                ObjectKind::Decoration(Decoration::Outline),
                Transform::default(),
                resources.add_geometry(Geometry::BoxEdges),
                resources.add_material(Material::line(OUTLINE_COLOR)),
            )
        };
        let outline = attach_or_release(scene, resources, object, outline);

        let connections = curves
            .into_iter()
            .map(|points| {
                scene.add(SceneObject::new(
                    ObjectKind::Decoration(Decoration::Connection),
                    Transform::default(),
                    resources.add_geometry(Geometry::Curve { points }),
                    resources.add_material(Material::line(CONNECTION_COLOR)),
                ))
            })
            .collect();

        self.focus = Focus::Object {
            object,
            outline,
            connections,
        };
    }

    /// Drop the focus and dispose its overlays. Returns whether anything
    /// was focused.
    pub fn clear_focus(&mut self, scene: &mut SceneGraph, resources: &mut Resources) -> bool {
        match std::mem::take(&mut self.focus) {
            Focus::None => false,
            Focus::Object {
                outline,
                connections,
                ..
            } => {
                if let Some(outline) = outline {
                    scene.dispose(outline, resources);
                }
                for connection in connections {
                    scene.dispose(connection, resources);
                }
                true
            }
        }
    }
}

fn attach_or_release(
    scene: &mut SceneGraph,
    resources: &mut Resources,
    parent: ObjectId,
    child: SceneObject,
) -> Option<ObjectId> {
    let (geometry, material) = (child.geometry, child.material);
    let id = scene.add_child(parent, child);
    if id.is_none() {
        tracing::debug!(?parent, "focus target vanished before outline attach");
        resources.dispose_geometry(geometry);
        resources.dispose_material(material);
    }
    id
}
