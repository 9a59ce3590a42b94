//! Squarified treemap layout
//!
//! Partitions a `width × depth` rectangle into nested rectangles whose areas
//! are proportional to node values. Rows are grown while the worst aspect
//! ratio keeps improving toward the golden ratio, then laid out by slicing
//! (horizontal strips) or dicing (vertical strips) the remaining space.

use serde::{Deserialize, Serialize};

use crate::hierarchy::{Hierarchy, NodeId};

/// Target aspect ratio for squarified rows
const PHI: f64 = 1.618_033_988_749_895;

/// Layout parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutOptions {
    /// Extent along X
    pub width: f64,
    /// Extent along Z (the treemap's second axis)
    pub depth: f64,
    /// Padding between a parent's edge and its children (left/right/bottom)
    pub padding_outer: f64,
    /// Gap between siblings
    pub padding_inner: f64,
    /// Top padding, leaves room for the parent's label
    pub padding_top: f64,
    /// Round final coordinates to integers
    pub round: bool,
}

impl Default for LayoutOptions {
    fn default() -> Self {
        Self {
            width: 954.0,
            depth: 1060.0,
            padding_outer: 5.0,
            padding_inner: 5.0,
            padding_top: 20.0,
            round: true,
        }
    }
}

impl LayoutOptions {
    /// Unpadded layout of the given size
    pub fn plain(width: f64, depth: f64) -> Self {
        Self {
            width,
            depth,
            padding_outer: 0.0,
            padding_inner: 0.0,
            padding_top: 0.0,
            round: true,
        }
    }
}

/// Compute rectangle bounds for every node in place.
pub fn treemap(hierarchy: &mut Hierarchy, options: &LayoutOptions) {
    if hierarchy.is_empty() {
        return;
    }

    let root = hierarchy.root();
    {
        let node = hierarchy.node_mut(root);
        node.x0 = 0.0;
        node.y0 = 0.0;
        node.x1 = options.width;
        node.y1 = options.depth;
    }

    // Padding applied to each node's own bounds, indexed by depth
    let mut padding_stack: Vec<f64> = vec![0.0];
    for id in hierarchy.pre_order() {
        position_node(hierarchy, id, options, &mut padding_stack);
    }

    if options.round {
        for id in 0..hierarchy.len() {
            let node = hierarchy.node_mut(id);
            node.x0 = round_half_up(node.x0);
            node.y0 = round_half_up(node.y0);
            node.x1 = round_half_up(node.x1);
            node.y1 = round_half_up(node.y1);
        }
    }

    tracing::debug!(nodes = hierarchy.len(), "treemap layout computed");
}

fn position_node(
    hierarchy: &mut Hierarchy,
    id: NodeId,
    options: &LayoutOptions,
    padding_stack: &mut Vec<f64>,
) {
    let depth = hierarchy.node(id).depth;
    let p = padding_stack.get(depth).copied().unwrap_or(0.0);

    let node = hierarchy.node(id);
    let (mut x0, mut y0, mut x1, mut y1) = (node.x0 + p, node.y0 + p, node.x1 - p, node.y1 - p);
    collapse(&mut x0, &mut x1);
    collapse(&mut y0, &mut y1);
    {
        let node = hierarchy.node_mut(id);
        node.x0 = x0;
        node.y0 = y0;
        node.x1 = x1;
        node.y1 = y1;
    }

    if hierarchy.node(id).is_leaf() {
        return;
    }

    let inner = options.padding_inner / 2.0;
    if padding_stack.len() <= depth + 1 {
        padding_stack.resize(depth + 2, 0.0);
    }
    padding_stack[depth + 1] = inner;

    x0 += options.padding_outer - inner;
    y0 += options.padding_top - inner;
    x1 -= options.padding_outer - inner;
    y1 -= options.padding_outer - inner;
    collapse(&mut x0, &mut x1);
    collapse(&mut y0, &mut y1);

    squarify(hierarchy, id, x0, y0, x1, y1);
}

/// Collapse an inverted interval to its midpoint
fn collapse(lo: &mut f64, hi: &mut f64) {
    if *hi < *lo {
        let mid = (*lo + *hi) / 2.0;
        *lo = mid;
        *hi = mid;
    }
}

fn round_half_up(v: f64) -> f64 {
    (v + 0.5).floor()
}

fn squarify(hierarchy: &mut Hierarchy, parent: NodeId, mut x0: f64, mut y0: f64, x1: f64, y1: f64) {
    let nodes = hierarchy.node(parent).children.clone();
    let n = nodes.len();
    let mut value = hierarchy.node(parent).value;

    let mut i0 = 0;
    let mut i1 = 0;
    while i0 < n {
        let dx = x1 - x0;
        let dy = y1 - y0;

        // Skip leading empty nodes
        let mut sum_value;
        loop {
            sum_value = hierarchy.node(nodes[i1]).value;
            i1 += 1;
            if sum_value != 0.0 || i1 >= n {
                break;
            }
        }
        let mut min_value = sum_value;
        let mut max_value = sum_value;
        let alpha = (dy / dx).max(dx / dy) / (value * PHI);
        let mut beta = sum_value * sum_value * alpha;
        let mut min_ratio = (max_value / beta).max(beta / min_value);

        // Keep adding nodes while the aspect ratio maintains or improves
        while i1 < n {
            let node_value = hierarchy.node(nodes[i1]).value;
            sum_value += node_value;
            min_value = min_value.min(node_value);
            max_value = max_value.max(node_value);
            beta = sum_value * sum_value * alpha;
            let new_ratio = (max_value / beta).max(beta / min_value);
            if new_ratio > min_ratio {
                sum_value -= node_value;
                break;
            }
            min_ratio = new_ratio;
            i1 += 1;
        }

        let row = &nodes[i0..i1];
        if dx < dy {
            let row_y0 = y0;
            let row_y1 = if value != 0.0 {
                y0 += dy * sum_value / value;
                y0
            } else {
                y1
            };
            dice(hierarchy, row, sum_value, x0, row_y0, x1, row_y1);
        } else {
            let row_x0 = x0;
            let row_x1 = if value != 0.0 {
                x0 += dx * sum_value / value;
                x0
            } else {
                x1
            };
            slice(hierarchy, row, sum_value, row_x0, y0, row_x1, y1);
        }
        value -= sum_value;
        i0 = i1;
    }
}

/// Lay out a row left to right, each node spanning `y0..y1`
fn dice(hierarchy: &mut Hierarchy, row: &[NodeId], row_value: f64, mut x0: f64, y0: f64, x1: f64, y1: f64) {
    let k = if row_value != 0.0 { (x1 - x0) / row_value } else { 0.0 };
    for &id in row {
        let node = hierarchy.node_mut(id);
        node.y0 = y0;
        node.y1 = y1;
        node.x0 = x0;
        x0 += node.value * k;
        node.x1 = x0;
    }
}

/// Lay out a row top to bottom, each node spanning `x0..x1`
fn slice(hierarchy: &mut Hierarchy, row: &[NodeId], row_value: f64, x0: f64, mut y0: f64, x1: f64, y1: f64) {
    let k = if row_value != 0.0 { (y1 - y0) / row_value } else { 0.0 };
    for &id in row {
        let node = hierarchy.node_mut(id);
        node.x0 = x0;
        node.x1 = x1;
        node.y0 = y0;
        y0 += node.value * k;
        node.y1 = y0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;
    use shared::DatasetNode;

    fn laid_out(data: &DatasetNode, options: &LayoutOptions) -> Hierarchy {
        let mut h = Hierarchy::from_dataset(data);
        treemap(&mut h, options);
        h
    }

    fn area(h: &Hierarchy, id: NodeId) -> f64 {
        h.node(id).width() * h.node(id).depth_extent()
    }

    fn overlaps(h: &Hierarchy, a: NodeId, b: NodeId) -> bool {
        let (a, b) = (h.node(a), h.node(b));
        a.x0 < b.x1 && b.x0 < a.x1 && a.y0 < b.y1 && b.y0 < a.y1
    }

    #[test]
    fn test_two_leaves_area_ratio() {
        let h = laid_out(&fixtures::small_dataset(), &LayoutOptions::plain(100.0, 100.0));
        let children = &h.node(h.root()).children;
        let a = area(&h, children[0]);
        let b = area(&h, children[1]);
        assert!((a / b - 2.0).abs() < 0.1, "ratio {}", a / b);
        // Union covers the whole root area
        assert_eq!(a + b, 100.0 * 100.0);
        assert!(!overlaps(&h, children[0], children[1]));
    }

    #[test]
    fn test_two_leaves_exact_bounds() {
        let h = laid_out(&fixtures::small_dataset(), &LayoutOptions::plain(100.0, 100.0));
        let children = &h.node(h.root()).children;
        let a = h.node(children[0]);
        let b = h.node(children[1]);
        // Square area: both leaves form one row, sliced top to bottom
        assert_eq!((a.x0, a.y0, a.x1, a.y1), (0.0, 0.0, 100.0, 67.0));
        assert_eq!((b.x0, b.y0, b.x1, b.y1), (0.0, 67.0, 100.0, 100.0));
    }

    #[test]
    fn test_padded_children_inside_padded_root() {
        let h = laid_out(&fixtures::small_dataset(), &LayoutOptions {
            width: 100.0,
            depth: 100.0,
            ..LayoutOptions::default()
        });
        for &c in &h.node(h.root()).children {
            let n = h.node(c);
            assert!(n.x0 >= 5.0 && n.x1 <= 95.0);
            assert!(n.y0 >= 20.0 && n.y1 <= 95.0);
        }
    }

    #[test]
    fn test_containment_and_disjoint_siblings() {
        let h = laid_out(&fixtures::flare_sample(), &LayoutOptions::default());
        for (_, node) in h.iter() {
            for &c in &node.children {
                let child = h.node(c);
                assert!(child.x0 >= node.x0 && child.x1 <= node.x1, "{} in {}", child.name, node.name);
                assert!(child.y0 >= node.y0 && child.y1 <= node.y1, "{} in {}", child.name, node.name);
            }
            for (i, &a) in node.children.iter().enumerate() {
                for &b in &node.children[i + 1..] {
                    assert!(!overlaps(&h, a, b), "{} overlaps {}", h.node(a).name, h.node(b).name);
                }
            }
        }
    }

    #[test]
    fn test_unpadded_leaves_tile_root() {
        let h = laid_out(&fixtures::flat_dataset(7), &LayoutOptions {
            round: false,
            ..LayoutOptions::plain(300.0, 200.0)
        });
        let total: f64 = h.node(h.root()).children.iter().map(|&c| area(&h, c)).sum();
        assert!((total - 300.0 * 200.0).abs() < 1e-6);
        // Areas proportional to values
        let per_unit = 300.0 * 200.0 / 28.0;
        for &c in &h.node(h.root()).children {
            assert!((area(&h, c) - h.node(c).value * per_unit).abs() < 1e-6);
        }
    }

    #[test]
    fn test_rounding_yields_integers() {
        let h = laid_out(&fixtures::flare_sample(), &LayoutOptions::default());
        for (_, node) in h.iter() {
            for v in [node.x0, node.y0, node.x1, node.y1] {
                assert_eq!(v.fract(), 0.0);
            }
        }
    }

    #[test]
    fn test_zero_value_children_collapse() {
        let data = DatasetNode::branch(
            "root",
            vec![DatasetNode::leaf("a", 0.0), DatasetNode::leaf("b", 0.0)],
        );
        let h = laid_out(&data, &LayoutOptions::plain(50.0, 50.0));
        for &c in &h.node(h.root()).children {
            assert_eq!(area(&h, c), 0.0);
        }
    }

    #[test]
    fn test_tiny_parent_collapses_padding() {
        let data = DatasetNode::branch("root", vec![DatasetNode::leaf("a", 1.0)]);
        let h = laid_out(&data, &LayoutOptions {
            width: 10.0,
            depth: 10.0,
            ..LayoutOptions::default()
        });
        let child = h.node(h.node(h.root()).children[0]);
        assert!(child.x1 >= child.x0);
        assert!(child.y1 >= child.y0);
    }
}
