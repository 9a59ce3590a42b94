//! Factory functions for test datasets.
//!
//! Provides small hand-built hierarchies used by unit tests, the headless
//! harness, and the integration tests.

use shared::DatasetNode;

use crate::scene::city::CityConfig;

/// `root` with two leaves `A = 10` and `B = 5`.
pub fn small_dataset() -> DatasetNode {
    DatasetNode::branch(
        "root",
        vec![DatasetNode::leaf("A", 10.0), DatasetNode::leaf("B", 5.0)],
    )
}

/// A trimmed slice of the flare class hierarchy (height 3).
pub fn flare_sample() -> DatasetNode {
    DatasetNode::branch(
        "flare",
        vec![
            DatasetNode::branch(
                "analytics",
                vec![
                    DatasetNode::branch(
                        "cluster",
                        vec![
                            DatasetNode::leaf("AgglomerativeCluster", 3938.0),
                            DatasetNode::leaf("CommunityStructure", 3812.0),
                            DatasetNode::leaf("HierarchicalCluster", 6714.0),
                            DatasetNode::leaf("MergeEdge", 743.0),
                        ],
                    ),
                    DatasetNode::branch(
                        "graph",
                        vec![
                            DatasetNode::leaf("BetweennessCentrality", 3534.0),
                            DatasetNode::leaf("LinkDistance", 5731.0),
                            DatasetNode::leaf("MaxFlowMinCut", 7840.0),
                            DatasetNode::leaf("ShortestPaths", 5914.0),
                            DatasetNode::leaf("SpanningTree", 3416.0),
                        ],
                    ),
                ],
            ),
            DatasetNode::branch(
                "util",
                vec![
                    DatasetNode::leaf("Arrays", 8258.0),
                    DatasetNode::leaf("Colors", 10001.0),
                    DatasetNode::branch(
                        "math",
                        vec![
                            DatasetNode::leaf("DenseMatrix", 3165.0),
                            DatasetNode::leaf("IMatrix", 2815.0),
                            DatasetNode::leaf("SparseMatrix", 3366.0),
                        ],
                    ),
                    DatasetNode::leaf("Strings", 22026.0),
                ],
            ),
            DatasetNode::leaf("Easing", 17010.0),
        ],
    )
}

/// Flat hierarchy of `n` leaves with values `1..=n`.
pub fn flat_dataset(n: usize) -> DatasetNode {
    DatasetNode::branch(
        "flat",
        (1..=n)
            .map(|i| DatasetNode::leaf(format!("Leaf{i}"), i as f64))
            .collect(),
    )
}

/// Small deterministic city used by tests.
pub fn small_city_config() -> CityConfig {
    CityConfig {
        cols: 4,
        rows: 3,
        seed: 7,
        occupancy: 1.0,
        ..CityConfig::default()
    }
}
