//! Treemap scene construction
//!
//! Every hierarchy node becomes a translucent cuboid stacked by layer, with
//! a darker edge frame and, where it fits, a flat text label. Geometry and
//! materials are shared through a [`TreemapPool`]; only label text gets its
//! own geometry.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::resources::{Geometry, GeometryId, Material, MaterialId, Resources};
use super::{Decoration, ObjectKind, SceneGraph, SceneObject, Tag, Transform};
use crate::helpers::{format_value, split_camel_case, Rgb, SequentialScale};
use crate::hierarchy::{Hierarchy, NodeId};

pub const FILL_OPACITY: f32 = 0.9;
pub const TEXT_COLOR: Rgb = Rgb::from_hex(0x333333);
/// Label meshes lie flat, facing up
pub const LABEL_ROTATION_X: f32 = std::f32::consts::PI * 1.5;

/// Geometry and label parameters of the treemap scene
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TreemapStyle {
    /// Overall scene height; only used to center the scene vertically
    pub scene_height: f32,
    /// Height of one cuboid layer
    pub layer_height: f32,
    pub font_size: f64,
    /// Average glyph advance as a fraction of the font size
    pub tolerance: f64,
    /// Extrusion depth of label text
    pub label_depth: f32,
    /// Offset of labels from the box's left edge
    pub label_inset: f32,
    pub line_spacing: f32,
}

impl Default for TreemapStyle {
    fn default() -> Self {
        Self {
            scene_height: 50.0,
            layer_height: 6.0,
            font_size: 10.0,
            tolerance: 0.6,
            label_depth: 0.3,
            label_inset: 2.0,
            line_spacing: 12.0,
        }
    }
}

impl TreemapStyle {
    /// Estimated rendered width of `text`. A character-count heuristic, not
    /// glyph measurement.
    pub fn estimate(&self, text: &str) -> f64 {
        text.chars().count() as f64 * self.font_size * self.tolerance
    }

    /// Label for a node with children: `"name value"`, else just the name,
    /// else nothing.
    pub fn branch_label(&self, name: &str, value: f64, width: f64) -> Option<String> {
        let full = format!("{name} {}", format_value(value));
        if self.estimate(&full) <= width {
            return Some(full);
        }
        (self.estimate(name) <= width).then(|| name.to_string())
    }

    /// Label lines for a leaf: the camel-case parts of the name plus the
    /// value. The value line is dropped first when the block is too tall.
    pub fn leaf_label(&self, name: &str, value: f64, width: f64, depth: f64) -> Option<Vec<String>> {
        let mut lines = split_camel_case(name);
        lines.push(format_value(value));

        let widest = lines
            .iter()
            .map(|l| self.estimate(l))
            .fold(0.0, f64::max);
        if widest > width {
            return None;
        }

        let block = |n: usize| n as f64 * self.font_size;
        if block(lines.len()) > depth {
            lines.pop();
        }
        (!lines.is_empty() && block(lines.len()) <= depth).then_some(lines)
    }
}

/// Translation that centers a `width × depth` footprint on the origin
pub fn base_offset(width: f32, depth: f32, style: &TreemapStyle) -> Vec3 {
    Vec3::new(-width / 2.0, style.scene_height / 2.0, -depth / 2.0)
}

/// Resources shared by all cuboids, one fill and one line material per layer
#[derive(Debug, Clone, PartialEq)]
pub struct TreemapPool {
    pub box_geometry: GeometryId,
    pub edge_geometry: GeometryId,
    pub fills: Vec<MaterialId>,
    pub lines: Vec<MaterialId>,
    pub text: MaterialId,
}

impl TreemapPool {
    /// `layer_heights` lists the node height of each layer, in layer order
    pub fn new(resources: &mut Resources, layer_heights: &[usize], scale: &SequentialScale) -> Self {
        let colors: Vec<Rgb> = layer_heights
            .iter()
            .map(|&h| scale.color(h as f32))
            .collect();
        Self {
            box_geometry: resources.add_geometry(Geometry::Box),
            edge_geometry: resources.add_geometry(Geometry::BoxEdges),
            fills: colors
                .iter()
                .map(|&c| resources.add_material(Material::translucent(c, FILL_OPACITY)))
                .collect(),
            lines: colors
                .iter()
                .map(|&c| resources.add_material(Material::line(c.darker(0.5))))
                .collect(),
            text: resources.add_material(Material::mesh(TEXT_COLOR)),
        }
    }

    /// Release every pooled resource. Entries already released with the
    /// scene are skipped.
    pub fn dispose(&self, resources: &mut Resources) {
        resources.dispose_geometry(self.box_geometry);
        resources.dispose_geometry(self.edge_geometry);
        for &m in self.fills.iter().chain(&self.lines) {
            resources.dispose_material(m);
        }
        resources.dispose_material(self.text);
    }
}

/// Populate `scene` with the laid-out hierarchy. Layers are drawn from the
/// root's upward so containment stacks visibly.
pub fn build_treemap(
    hierarchy: &Hierarchy,
    scene: &mut SceneGraph,
    resources: &mut Resources,
    style: &TreemapStyle,
    scale: &SequentialScale,
) -> TreemapPool {
    let layers = hierarchy.layers();
    let heights: Vec<usize> = layers.iter().map(|l| l.height).collect();
    let pool = TreemapPool::new(resources, &heights, scale);

    let mut labels = 0;
    for layer in &layers {
        for &id in &layer.nodes {
            labels += draw_node(hierarchy, id, scene, resources, &pool, style);
        }
    }

    tracing::info!(
        nodes = hierarchy.len(),
        layers = layers.len(),
        labels,
        "treemap scene built"
    );
    pool
}

/// Add the cuboid, its frame, and any labels for one node. Returns the
/// number of label meshes added.
fn draw_node(
    hierarchy: &Hierarchy,
    id: NodeId,
    scene: &mut SceneGraph,
    resources: &mut Resources,
    pool: &TreemapPool,
    style: &TreemapStyle,
) -> usize {
    let node = hierarchy.node(id);
    let layer = hierarchy.layer_index(id);
    let h = style.layer_height;
    let (w, d) = (node.width(), node.depth_extent());
    let y = layer as f32 * h;

    let cuboid = SceneObject::new(
        ObjectKind::Data(Tag::Hierarchy(id)),
        Transform::at(Vec3::new(
            (node.x0 + w / 2.0) as f32,
            y,
            (node.y0 + d / 2.0) as f32,
        ))
        .with_scale(Vec3::new(w as f32, h, d as f32)),
        pool.box_geometry,
        pool.fills[layer],
    );
    let cuboid = scene.add(cuboid);
    scene.add_child(
        cuboid,
        SceneObject::new(
            ObjectKind::Decoration(Decoration::Frame),
            Transform::default(),
            pool.edge_geometry,
            pool.lines[layer],
        ),
    );

    let lines = if node.is_leaf() {
        style.leaf_label(&node.name, node.value, w, d).unwrap_or_default()
    } else {
        style.branch_label(&node.name, node.value, w).into_iter().collect()
    };

    let x = node.x0 as f32 + style.label_inset;
    let top = node.y0 as f32 + style.line_spacing;
    for (i, text) in lines.iter().enumerate() {
        let geometry = resources.add_geometry(Geometry::Text {
            text: text.clone(),
            size: style.font_size as f32,
            depth: style.label_depth,
        });
        scene.add(SceneObject::new(
            ObjectKind::Decoration(Decoration::Label(text.clone())),
            Transform::at(Vec3::new(x, y + h / 2.0, top + i as f32 * style.line_spacing))
                .with_rotation(Vec3::new(LABEL_ROTATION_X, 0.0, 0.0)),
            geometry,
            pool.text,
        ));
    }
    lines.len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;
    use crate::layout::{treemap, LayoutOptions};

    fn style() -> TreemapStyle {
        TreemapStyle::default()
    }

    #[test]
    fn test_estimate() {
        assert_eq!(style().estimate("abcde"), 30.0);
        assert_eq!(style().estimate(""), 0.0);
    }

    #[test]
    fn test_branch_label_boundary_is_inclusive() {
        // "util 48,716" is 11 chars → 66
        let s = style();
        assert_eq!(s.branch_label("util", 48716.0, 66.0).as_deref(), Some("util 48,716"));
        assert_eq!(s.branch_label("util", 48716.0, 65.9).as_deref(), Some("util"));
        // "util" alone needs 24
        assert_eq!(s.branch_label("util", 48716.0, 24.0).as_deref(), Some("util"));
        assert_eq!(s.branch_label("util", 48716.0, 23.9), None);
    }

    #[test]
    fn test_leaf_label_width_boundary() {
        let s = style();
        // Lines: "Merge", "Edge", "743" → widest 5 chars → 30
        let lines = s.leaf_label("MergeEdge", 743.0, 30.0, 100.0).unwrap();
        assert_eq!(lines, vec!["Merge", "Edge", "743"]);
        assert_eq!(s.leaf_label("MergeEdge", 743.0, 29.9, 100.0), None);
    }

    #[test]
    fn test_leaf_label_drops_value_line_when_too_tall() {
        let s = style();
        // Three lines need 30, two need 20
        assert_eq!(s.leaf_label("MergeEdge", 743.0, 100.0, 30.0).unwrap().len(), 3);
        assert_eq!(
            s.leaf_label("MergeEdge", 743.0, 100.0, 25.0).unwrap(),
            vec!["Merge", "Edge"]
        );
        assert_eq!(s.leaf_label("MergeEdge", 743.0, 100.0, 20.0).unwrap().len(), 2);
        assert_eq!(s.leaf_label("MergeEdge", 743.0, 100.0, 19.9), None);
    }

    #[test]
    fn test_base_offset() {
        assert_eq!(base_offset(954.0, 1060.0, &style()), Vec3::new(-477.0, 25.0, -530.0));
    }

    #[test]
    fn test_build_places_boxes_by_layer() {
        let mut hierarchy = Hierarchy::from_dataset(&fixtures::small_dataset());
        treemap(&mut hierarchy, &LayoutOptions::plain(100.0, 100.0));
        let mut scene = SceneGraph::new();
        let mut resources = Resources::new();
        build_treemap(&hierarchy, &mut scene, &mut resources, &style(), &SequentialScale::default());

        let root = scene.find_tagged(Tag::Hierarchy(0)).unwrap();
        let root_box = scene.get(root).unwrap();
        assert_eq!(root_box.transform.position, Vec3::new(50.0, 0.0, 50.0));
        assert_eq!(root_box.transform.scale, Vec3::new(100.0, 6.0, 100.0));
        assert_eq!(root_box.children.len(), 1);

        // A: (0,0)-(100,67), one layer up
        let a = scene.find_tagged(Tag::Hierarchy(1)).unwrap();
        let a_box = scene.get(a).unwrap();
        assert_eq!(a_box.transform.position, Vec3::new(50.0, 6.0, 33.5));
        assert_eq!(a_box.transform.scale, Vec3::new(100.0, 6.0, 67.0));
        assert_ne!(a_box.material, root_box.material);
    }

    #[test]
    fn test_pool_shared_and_labels_counted() {
        let mut hierarchy = Hierarchy::from_dataset(&fixtures::flare_sample());
        treemap(&mut hierarchy, &LayoutOptions::default());
        let mut scene = SceneGraph::new();
        let mut resources = Resources::new();
        let pool = build_treemap(&hierarchy, &mut scene, &mut resources, &style(), &SequentialScale::default());

        assert_eq!(pool.fills.len(), hierarchy.layer_count());
        let labels = scene
            .iter()
            .filter(|(_, o)| matches!(o.kind, ObjectKind::Decoration(Decoration::Label(_))))
            .count();
        // Shared: box + edges; one text geometry per label
        assert_eq!(resources.memory().geometries, 2 + labels);
        assert!(labels > 0);

        let root_label = scene.iter().find_map(|(_, o)| match &o.kind {
            ObjectKind::Decoration(Decoration::Label(t)) if t.starts_with("flare ") => Some(o.transform),
            _ => None,
        });
        let transform = root_label.unwrap();
        assert_eq!(transform.position, Vec3::new(2.0, 3.0, 12.0));
        assert_eq!(transform.rotation.x, LABEL_ROTATION_X);
    }

    #[test]
    fn test_clear_and_pool_dispose_release_everything() {
        let mut hierarchy = Hierarchy::from_dataset(&fixtures::flare_sample());
        treemap(&mut hierarchy, &LayoutOptions::default());
        let mut scene = SceneGraph::new();
        let mut resources = Resources::new();
        let pool = build_treemap(&hierarchy, &mut scene, &mut resources, &style(), &SequentialScale::default());

        scene.clear(&mut resources);
        pool.dispose(&mut resources);
        assert!(scene.is_empty());
        assert_eq!(resources.memory(), Default::default());
    }
}
