//! Hierarchical dataset model with layout fields
//!
//! Nodes live in a flat arena indexed by [`NodeId`]. The tree is built once
//! from a [`DatasetNode`], summed, sorted, and laid out; afterwards it is only
//! read.

use std::collections::VecDeque;

use shared::DatasetNode;

/// Index of a node in a [`Hierarchy`]
pub type NodeId = usize;

/// A single node of the hierarchy
#[derive(Debug, Clone, PartialEq)]
pub struct HierarchyNode {
    pub name: String,
    /// Value carried by the input node itself (0 when absent)
    pub data_value: f64,
    /// Own value plus the values of all descendants
    pub value: f64,
    /// Distance from the root
    pub depth: usize,
    /// Distance to the deepest descendant leaf
    pub height: usize,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
    pub x0: f64,
    pub y0: f64,
    pub x1: f64,
    pub y1: f64,
}

impl HierarchyNode {
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    pub fn width(&self) -> f64 {
        self.x1 - self.x0
    }

    pub fn depth_extent(&self) -> f64 {
        self.y1 - self.y0
    }
}

/// Nodes sharing the same height
#[derive(Debug, Clone, PartialEq)]
pub struct Layer {
    pub height: usize,
    pub nodes: Vec<NodeId>,
}

/// Arena-backed tree of [`HierarchyNode`]s. Node 0 is the root.
#[derive(Debug, Clone, PartialEq)]
pub struct Hierarchy {
    nodes: Vec<HierarchyNode>,
}

impl Hierarchy {
    /// Build from a dataset: sum values bottom-up, sort children by value
    /// (descending, stable), and compute depth and height.
    pub fn from_dataset(data: &DatasetNode) -> Self {
        let mut nodes = Vec::with_capacity(data.count());
        push_node(&mut nodes, data, None, 0);

        // Children always have larger ids than their parent, so a reverse
        // sweep visits every node after all of its descendants.
        for id in (0..nodes.len()).rev() {
            let children = nodes[id].children.clone();
            let child_sum: f64 = children.iter().map(|&c| nodes[c].value).sum();
            let height = children
                .iter()
                .map(|&c| nodes[c].height + 1)
                .max()
                .unwrap_or(0);
            let node = &mut nodes[id];
            node.value = node.data_value + child_sum;
            node.height = height;
        }

        for id in 0..nodes.len() {
            let mut children = std::mem::take(&mut nodes[id].children);
            children.sort_by(|&a, &b| {
                nodes[b]
                    .value
                    .partial_cmp(&nodes[a].value)
                    .unwrap_or(std::cmp::Ordering::Equal)
            });
            nodes[id].children = children;
        }

        Self { nodes }
    }

    pub fn root(&self) -> NodeId {
        0
    }

    pub fn node(&self, id: NodeId) -> &HierarchyNode {
        &self.nodes[id]
    }

    pub fn get(&self, id: NodeId) -> Option<&HierarchyNode> {
        self.nodes.get(id)
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> &mut HierarchyNode {
        &mut self.nodes[id]
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// The node itself followed by its ancestors up to the root
    pub fn ancestors(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = vec![id];
        let mut current = self.nodes[id].parent;
        while let Some(p) = current {
            out.push(p);
            current = self.nodes[p].parent;
        }
        out
    }

    /// Root-to-node names joined by `separator`, e.g. `flare/analytics/cluster`
    pub fn full_name(&self, id: NodeId, separator: &str) -> String {
        let mut names: Vec<&str> = self
            .ancestors(id)
            .into_iter()
            .map(|a| self.nodes[a].name.as_str())
            .collect();
        names.reverse();
        names.join(separator)
    }

    /// Breadth-first traversal starting at `id` (inclusive)
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut queue = VecDeque::from([id]);
        while let Some(current) = queue.pop_front() {
            out.push(current);
            queue.extend(self.nodes[current].children.iter().copied());
        }
        out
    }

    /// Pre-order traversal starting at the root (parents before children)
    pub(crate) fn pre_order(&self) -> Vec<NodeId> {
        let mut out = Vec::with_capacity(self.nodes.len());
        let mut stack = vec![self.root()];
        while let Some(current) = stack.pop() {
            out.push(current);
            stack.extend(self.nodes[current].children.iter().rev().copied());
        }
        out
    }

    /// Nodes grouped by height, highest layer (the root's) first.
    ///
    /// Within a layer nodes keep breadth-first order.
    pub fn layers(&self) -> Vec<Layer> {
        let Some(root) = self.nodes.first() else {
            return Vec::new();
        };
        let mut layers: Vec<Layer> = (0..=root.height)
            .rev()
            .map(|height| Layer {
                height,
                nodes: Vec::new(),
            })
            .collect();
        for id in self.descendants(self.root()) {
            let index = root.height - self.nodes[id].height;
            layers[index].nodes.push(id);
        }
        layers
    }

    /// Number of height layers (root height + 1)
    pub fn layer_count(&self) -> usize {
        self.nodes.first().map(|r| r.height + 1).unwrap_or(0)
    }

    /// Stacking index of a node: `layers - height - 1`, so the root sits at
    /// 0 and leaves of the deepest branch at the top.
    pub fn layer_index(&self, id: NodeId) -> usize {
        self.layer_count() - self.nodes[id].height - 1
    }

    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &HierarchyNode)> {
        self.nodes.iter().enumerate()
    }
}

fn push_node(
    nodes: &mut Vec<HierarchyNode>,
    data: &DatasetNode,
    parent: Option<NodeId>,
    depth: usize,
) -> NodeId {
    let id = nodes.len();
    nodes.push(HierarchyNode {
        name: data.name.clone(),
        data_value: data.value.filter(|v| !v.is_nan()).unwrap_or(0.0),
        value: 0.0,
        depth,
        height: 0,
        parent,
        children: Vec::new(),
        x0: 0.0,
        y0: 0.0,
        x1: 0.0,
        y1: 0.0,
    });
    for child in data.children() {
        let child_id = push_node(nodes, child, Some(id), depth + 1);
        nodes[id].children.push(child_id);
    }
    id
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;

    #[test]
    fn test_sum_and_sort() {
        let h = Hierarchy::from_dataset(&fixtures::small_dataset());
        let root = h.node(h.root());
        assert_eq!(root.value, 15.0);
        let names: Vec<&str> = root.children.iter().map(|&c| h.node(c).name.as_str()).collect();
        assert_eq!(names, vec!["A", "B"]);
    }

    #[test]
    fn test_sort_descending_by_value() {
        let data = DatasetNode::branch(
            "root",
            vec![
                DatasetNode::leaf("small", 1.0),
                DatasetNode::leaf("big", 9.0),
                DatasetNode::leaf("mid", 4.0),
            ],
        );
        let h = Hierarchy::from_dataset(&data);
        let values: Vec<f64> = h
            .node(0)
            .children
            .iter()
            .map(|&c| h.node(c).value)
            .collect();
        assert_eq!(values, vec![9.0, 4.0, 1.0]);
    }

    #[test]
    fn test_depth_and_height() {
        let h = Hierarchy::from_dataset(&fixtures::flare_sample());
        let root = h.node(h.root());
        assert_eq!(root.depth, 0);
        assert_eq!(root.height, 3);
        for (_, node) in h.iter() {
            if node.is_leaf() {
                assert_eq!(node.height, 0);
            }
            if let Some(p) = node.parent {
                assert_eq!(h.node(p).depth + 1, node.depth);
                assert!(h.node(p).height > node.height);
            }
        }
    }

    #[test]
    fn test_missing_value_sums_as_zero() {
        let data = DatasetNode::branch(
            "root",
            vec![
                DatasetNode::leaf("a", 3.0),
                DatasetNode {
                    name: "broken".into(),
                    value: None,
                    children: None,
                },
            ],
        );
        let h = Hierarchy::from_dataset(&data);
        assert_eq!(h.node(0).value, 3.0);
    }

    #[test]
    fn test_full_name_root_to_leaf() {
        let h = Hierarchy::from_dataset(&fixtures::flare_sample());
        let leaf = h
            .iter()
            .find(|(_, n)| n.name == "AgglomerativeCluster")
            .map(|(id, _)| id)
            .unwrap();
        assert_eq!(
            h.full_name(leaf, "/"),
            "flare/analytics/cluster/AgglomerativeCluster"
        );
        assert_eq!(h.full_name(h.root(), "/"), "flare");
    }

    #[test]
    fn test_layers_grouped_by_height() {
        let h = Hierarchy::from_dataset(&fixtures::flare_sample());
        let layers = h.layers();
        assert_eq!(layers.len(), h.layer_count());
        assert_eq!(layers[0].height, 3);
        assert_eq!(layers[0].nodes, vec![h.root()]);
        for (i, layer) in layers.iter().enumerate() {
            for &id in &layer.nodes {
                assert_eq!(h.node(id).height, layer.height);
                assert_eq!(h.layer_index(id), i);
            }
        }
        let total: usize = layers.iter().map(|l| l.nodes.len()).sum();
        assert_eq!(total, h.len());
    }

    #[test]
    fn test_descendants_breadth_first() {
        let h = Hierarchy::from_dataset(&fixtures::flare_sample());
        let order = h.descendants(h.root());
        assert_eq!(order.len(), h.len());
        let depths: Vec<usize> = order.iter().map(|&id| h.node(id).depth).collect();
        assert!(depths.windows(2).all(|w| w[0] <= w[1]));
    }
}
