//! Painter-based rendering for the viewport
//!
//! Projects every scene object through the viewer's camera and paints it
//! with egui shapes. Faces, edges, labels and curves are collected into one
//! list and painted back to front; `render_order` wins over depth so the
//! focus outline always lands on top.

use egui::{Align2, Color32, FontId, Painter, Pos2, Rect, Shape, Stroke};
use glam::{Mat4, Vec3};

use treemap3d_lib::helpers::Rgb;
use treemap3d_lib::scene::resources::{Geometry, Material};
use treemap3d_lib::scene::{Decoration, ObjectKind};
use treemap3d_lib::tooltip::{TooltipContent, TooltipKind, LINE_HEIGHT, PADDING};
use treemap3d_lib::viewer::Viewer;

const CORNERS: [Vec3; 8] = [
    Vec3::new(-0.5, -0.5, -0.5),
    Vec3::new(0.5, -0.5, -0.5),
    Vec3::new(0.5, 0.5, -0.5),
    Vec3::new(-0.5, 0.5, -0.5),
    Vec3::new(-0.5, -0.5, 0.5),
    Vec3::new(0.5, -0.5, 0.5),
    Vec3::new(0.5, 0.5, 0.5),
    Vec3::new(-0.5, 0.5, 0.5),
];

/// Corner indices per face, counter-clockwise seen from outside
const FACES: [[usize; 4]; 6] = [
    [0, 3, 2, 1], // -Z
    [4, 5, 6, 7], // +Z
    [0, 4, 7, 3], // -X
    [1, 2, 6, 5], // +X
    [3, 7, 6, 2], // +Y
    [0, 1, 5, 4], // -Y
];

const EDGES: [[usize; 2]; 12] = [
    [0, 1], [1, 2], [2, 3], [3, 0],
    [4, 5], [5, 6], [6, 7], [7, 4],
    [0, 4], [1, 5], [2, 6], [3, 7],
];

/// Labels smaller than this on screen are skipped
const MIN_LABEL_PX: f32 = 4.0;

enum Primitive {
    Face { points: Vec<Pos2>, fill: Color32 },
    Line { points: [Pos2; 2], stroke: Stroke },
    Label { anchor: Pos2, text: String, size: f32, color: Color32 },
}

struct DrawItem {
    render_order: i32,
    depth: f32,
    primitive: Primitive,
}

fn to_color(material: &Material) -> Color32 {
    let Rgb(r, g, b) = material.color;
    if material.transparent {
        Color32::from_rgba_unmultiplied(r, g, b, (material.opacity.clamp(0.0, 1.0) * 255.0) as u8)
    } else {
        Color32::from_rgb(r, g, b)
    }
}

fn pos(v: glam::Vec2) -> Pos2 {
    Pos2::new(v.x, v.y)
}

/// Paint the viewer's scene and tooltip into `rect`
pub fn paint_viewport(painter: &Painter, rect: Rect, viewer: &Viewer) {
    let Rgb(r, g, b) = viewer.scene.background.unwrap_or(Rgb::WHITE);
    painter.rect_filled(rect, 0.0, Color32::from_rgb(r, g, b));

    let mut items = collect_items(viewer);
    items.sort_by(|a, b| {
        a.render_order
            .cmp(&b.render_order)
            .then(b.depth.total_cmp(&a.depth))
    });

    for item in items {
        match item.primitive {
            Primitive::Face { points, fill } => {
                painter.add(Shape::convex_polygon(points, fill, Stroke::NONE));
            }
            Primitive::Line { points, stroke } => {
                painter.line_segment(points, stroke);
            }
            Primitive::Label { anchor, text, size, color } => {
                painter.text(anchor, Align2::LEFT_BOTTOM, text, FontId::proportional(size), color);
            }
        }
    }

    let tooltip = viewer.tooltip();
    if let (Some(content), Some(anchor)) = (tooltip.content(), tooltip.anchor(&viewer.viewport)) {
        paint_tooltip(painter, tooltip.kind(), content, pos(anchor));
    }
}

fn collect_items(viewer: &Viewer) -> Vec<DrawItem> {
    let camera = &viewer.camera;
    let viewport = &viewer.viewport;
    // Pixels per world unit at distance 1
    let focal = viewport.height / (2.0 * (camera.fov / 2.0).tan());

    let mut items = Vec::new();
    for (id, object) in viewer.scene.iter() {
        let (Some(world), Some(geometry), Some(material)) = (
            viewer.scene.world_matrix(id),
            viewer.resources.geometry(object.geometry),
            viewer.resources.material(object.material),
        ) else {
            continue;
        };
        let color = to_color(material);
        let order = object.render_order;

        match geometry {
            Geometry::Box => push_faces(&mut items, viewer, world, color, order),
            Geometry::BoxEdges => {
                let outline = matches!(object.kind, ObjectKind::Decoration(Decoration::Outline));
                let width = if outline { 2.0 } else { 1.0 };
                let corners = CORNERS.map(|c| world.transform_point3(c));
                for [a, b] in EDGES {
                    push_line(&mut items, viewer, corners[a], corners[b], Stroke::new(width, color), order);
                }
            }
            Geometry::Curve { points } => {
                let world_points: Vec<Vec3> =
                    points.iter().map(|p| world.transform_point3(*p)).collect();
                for pair in world_points.windows(2) {
                    push_line(&mut items, viewer, pair[0], pair[1], Stroke::new(2.0, color), order);
                }
            }
            Geometry::Text { text, size, .. } => {
                let anchor = world.transform_point3(Vec3::ZERO);
                let Some((screen, depth)) = camera.project(anchor, viewport) else {
                    continue;
                };
                let px = size * focal / depth.max(f32::EPSILON);
                if px < MIN_LABEL_PX {
                    continue;
                }
                items.push(DrawItem {
                    render_order: order,
                    // Labels sit on top of their box; nudge them in front of it
                    depth: depth - 0.5,
                    primitive: Primitive::Label {
                        anchor: pos(screen),
                        text: text.clone(),
                        size: px,
                        color,
                    },
                });
            }
            Geometry::Sprite => {}
        }
    }
    items
}

fn push_faces(items: &mut Vec<DrawItem>, viewer: &Viewer, world: Mat4, fill: Color32, order: i32) {
    let corners = CORNERS.map(|c| world.transform_point3(c));
    let eye = viewer.camera.position;

    for face in FACES {
        let [a, b, c, d] = face.map(|i| corners[i]);
        let normal = (b - a).cross(d - a);
        let center = (a + b + c + d) / 4.0;
        // Degenerate (zero-area) faces have no normal; skip them too
        if normal.dot(eye - center) <= 0.0 {
            continue;
        }

        let mut points = Vec::with_capacity(4);
        let mut depth = 0.0;
        for corner in [a, b, c, d] {
            let Some((screen, dist)) = viewer.camera.project(corner, &viewer.viewport) else {
                break;
            };
            points.push(pos(screen));
            depth += dist;
        }
        if points.len() < 4 {
            continue;
        }
        items.push(DrawItem {
            render_order: order,
            depth: depth / 4.0,
            primitive: Primitive::Face { points, fill },
        });
    }
}

fn push_line(items: &mut Vec<DrawItem>, viewer: &Viewer, a: Vec3, b: Vec3, stroke: Stroke, order: i32) {
    let camera = &viewer.camera;
    let (Some((sa, da)), Some((sb, db))) = (
        camera.project(a, &viewer.viewport),
        camera.project(b, &viewer.viewport),
    ) else {
        return;
    };
    items.push(DrawItem {
        render_order: order,
        // Edges coincide with face borders; keep them in front
        depth: (da + db) / 2.0 - 0.1,
        primitive: Primitive::Line {
            points: [pos(sa), pos(sb)],
            stroke,
        },
    });
}

fn paint_tooltip(painter: &Painter, kind: TooltipKind, content: &TooltipContent, anchor: Pos2) {
    let size = content.panel_size();
    let panel = Rect::from_min_size(anchor, egui::vec2(size.x, size.y));
    let (fill, border) = match kind {
        TooltipKind::Overlay => (Color32::WHITE, Color32::from_gray(0x99)),
        TooltipKind::Sprite => (Color32::from_rgba_unmultiplied(255, 255, 255, 230), Color32::from_gray(0x66)),
    };
    painter.rect_filled(panel, 3.0, fill);
    painter.rect_stroke(panel, 3.0, Stroke::new(1.0, border), egui::StrokeKind::Inside);

    for (i, line) in content.lines().iter().enumerate() {
        painter.text(
            Pos2::new(panel.left() + PADDING, panel.top() + PADDING + i as f32 * LINE_HEIGHT),
            Align2::LEFT_TOP,
            *line,
            if i == 0 { FontId::proportional(12.0) } else { FontId::monospace(11.0) },
            Color32::from_gray(0x33),
        );
    }
}
