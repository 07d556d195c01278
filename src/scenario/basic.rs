use crate::graph::builder::GraphBuilder;
use crate::graph::node::NodeKind;
use crate::scenario::scenario::Scenario;
use rand::rngs::StdRng;

/// A hand-written network with predefined paths. Node kinds follow the
/// naming convention `s` for the source and `t` for the sink; edges are
/// named `e1`, `e2`, ... in definition order.
pub struct FixedScenario {
    name: &'static str,
    edges: Vec<(&'static str, &'static str, f64)>,
    paths: Vec<Vec<usize>>,
}

impl FixedScenario {
    fn new(
        name: &'static str,
        edges: Vec<(&'static str, &'static str, f64)>,
        paths: Vec<Vec<usize>>,
    ) -> Self {
        Self { name, edges, paths }
    }

    pub fn diamond() -> Self {
        Self::new(
            "diamond",
            vec![("s", "a", 8.0), ("s", "b", 6.0), ("a", "t", 7.0), ("b", "t", 9.0)],
            vec![vec![1, 3], vec![2, 4]],
        )
    }

    pub fn complex() -> Self {
        Self::new(
            "complex",
            vec![
                ("s", "a", 12.0),
                ("s", "b", 10.0),
                ("a", "c", 8.0),
                ("a", "d", 9.0),
                ("b", "c", 7.0),
                ("b", "d", 11.0),
                ("c", "t", 15.0),
                ("d", "t", 13.0),
            ],
            vec![vec![1, 3, 7], vec![1, 4, 8], vec![2, 5, 7], vec![2, 6, 8]],
        )
    }

    pub fn linear() -> Self {
        Self::new(
            "linear",
            vec![("s", "a", 10.0), ("a", "b", 5.0), ("b", "c", 12.0), ("c", "t", 8.0)],
            vec![vec![1, 2, 3, 4]],
        )
    }

    pub fn parallel() -> Self {
        Self::new(
            "parallel",
            vec![
                ("s", "a1", 6.0),
                ("a1", "b1", 8.0),
                ("b1", "t", 7.0),
                ("s", "a2", 9.0),
                ("a2", "b2", 5.0),
                ("b2", "t", 10.0),
                ("s", "a3", 7.0),
                ("a3", "b3", 9.0),
                ("b3", "t", 6.0),
            ],
            vec![vec![1, 2, 3], vec![4, 5, 6], vec![7, 8, 9]],
        )
    }

    pub fn bottleneck() -> Self {
        Self::new(
            "bottleneck",
            vec![
                ("s", "a", 15.0),
                ("s", "b", 12.0),
                ("a", "c", 3.0),
                ("b", "c", 3.0),
                ("c", "d", 2.0),
                ("c", "e", 2.0),
                ("d", "t", 10.0),
                ("e", "t", 8.0),
            ],
            vec![vec![1, 3, 5, 7], vec![2, 4, 6, 8]],
        )
    }
}

fn kind_of(node: &str) -> NodeKind {
    match node {
        "s" => NodeKind::Source,
        "t" => NodeKind::Sink,
        _ => NodeKind::Intermediate,
    }
}

impl Scenario for FixedScenario {
    fn name(&self) -> &str {
        self.name
    }

    fn builder(&self, _rng: &mut StdRng) -> GraphBuilder {
        let mut builder = GraphBuilder::new();
        let mut seen = Vec::new();
        for (from, to, _) in &self.edges {
            for node in [from, to] {
                if !seen.contains(node) {
                    seen.push(*node);
                    builder.add_node(*node, kind_of(node));
                }
            }
        }
        for (i, (from, to, capacity)) in self.edges.iter().enumerate() {
            builder.add_edge(format!("e{}", i + 1), *from, *to, *capacity);
        }
        for (i, route) in self.paths.iter().enumerate() {
            builder.add_path(format!("P{}", i + 1), route.iter().map(|e| format!("e{e}")));
        }
        builder
    }
}
