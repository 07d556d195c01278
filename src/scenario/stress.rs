use crate::graph::builder::GraphBuilder;
use crate::graph::node::NodeKind;
use crate::scenario::scenario::Scenario;
use rand::Rng;
use rand::rngs::StdRng;

pub(crate) fn capacity(rng: &mut StdRng) -> f64 {
    (rng.gen_range(1.0..=10.0_f64) * 10.0).round() / 10.0
}

pub struct GridScenario {
    rows: usize,
    cols: usize,
}

impl GridScenario {
    pub fn new(rows: usize, cols: usize) -> Self {
        let rows = rows.max(1);
        let cols = if rows == 1 { cols.max(2) } else { cols.max(1) };
        Self { rows, cols }
    }

    fn node(&self, r: usize, c: usize) -> String {
        match (r, c) {
            (0, 0) => "s".to_string(),
            _ if r == self.rows - 1 && c == self.cols - 1 => "t".to_string(),
            _ => format!("v{r}_{c}"),
        }
    }
}

impl Scenario for GridScenario {
    fn name(&self) -> &str {
        "grid"
    }

    fn builder(&self, rng: &mut StdRng) -> GraphBuilder {
        let mut builder = GraphBuilder::new();
        for r in 0..self.rows {
            for c in 0..self.cols {
                let kind = match self.node(r, c).as_str() {
                    "s" => NodeKind::Source,
                    "t" => NodeKind::Sink,
                    _ => NodeKind::Intermediate,
                };
                builder.add_node(self.node(r, c), kind);
            }
        }

        let mut eid = 0;
        for r in 0..self.rows {
            for c in 0..self.cols {
                let mut next = Vec::with_capacity(2);
                if c + 1 < self.cols {
                    next.push((r, c + 1));
                }
                if r + 1 < self.rows {
                    next.push((r + 1, c));
                }
                for (nr, nc) in next {
                    eid += 1;
                    builder.add_edge(
                        format!("e{eid}"),
                        self.node(r, c),
                        self.node(nr, nc),
                        capacity(rng),
                    );
                }
            }
        }
        builder
    }
}

/// `s -> hub -> spoke_i -> t`, one predefined path per spoke. Every path
/// shares the `s -> hub` edge.
pub struct StarScenario {
    spokes: usize,
}

impl StarScenario {
    pub fn new(spokes: usize) -> Self {
        Self {
            spokes: spokes.max(1),
        }
    }
}

impl Scenario for StarScenario {
    fn name(&self) -> &str {
        "star"
    }

    fn builder(&self, rng: &mut StdRng) -> GraphBuilder {
        let mut builder = GraphBuilder::new();
        builder
            .add_node("s", NodeKind::Source)
            .add_node("hub", NodeKind::Intermediate)
            .add_node("t", NodeKind::Sink)
            .add_edge("e1", "s", "hub", capacity(rng));

        (0..self.spokes).for_each(|i| {
            builder.add_node(format!("spoke{i}"), NodeKind::Intermediate);
        });
        (0..self.spokes).for_each(|i| {
            builder.add_edge(format!("e{}", i + 2), "hub", format!("spoke{i}"), capacity(rng));
        });
        (0..self.spokes).for_each(|i| {
            builder.add_edge(
                format!("e{}", self.spokes + i + 2),
                format!("spoke{i}"),
                "t",
                capacity(rng),
            );
        });
        (0..self.spokes).for_each(|i| {
            builder.add_path(
                format!("P{}", i + 1),
                [
                    "e1".to_string(),
                    format!("e{}", i + 2),
                    format!("e{}", self.spokes + i + 2),
                ],
            );
        });
        builder
    }
}

pub struct LayeredScenario {
    layers: Vec<usize>,
}

impl LayeredScenario {
    pub fn new(hidden: Vec<usize>) -> Self {
        let layers = std::iter::once(1)
            .chain(hidden.into_iter().filter(|n| *n > 0))
            .chain(std::iter::once(1))
            .collect();
        Self { layers }
    }
}

impl Scenario for LayeredScenario {
    fn name(&self) -> &str {
        "layered"
    }

    fn builder(&self, rng: &mut StdRng) -> GraphBuilder {
        let last = self.layers.len() - 1;
        let names = self
            .layers
            .iter()
            .enumerate()
            .map(|(l, size)| match l {
                0 => vec!["s".to_string()],
                _ if l == last => vec!["t".to_string()],
                _ => (0..*size).map(|i| format!("v{l}_{i}")).collect(),
            })
            .collect::<Vec<Vec<String>>>();

        let mut builder = GraphBuilder::new();
        for (l, layer) in names.iter().enumerate() {
            let kind = match l {
                0 => NodeKind::Source,
                _ if l == last => NodeKind::Sink,
                _ => NodeKind::Intermediate,
            };
            layer.iter().for_each(|n| {
                builder.add_node(n.as_str(), kind);
            });
        }

        let mut eid = 0;
        for pair in names.windows(2) {
            for from in &pair[0] {
                for to in &pair[1] {
                    eid += 1;
                    builder.add_edge(format!("e{eid}"), from.as_str(), to.as_str(), capacity(rng));
                }
            }
        }
        builder
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::paths::{PathEnumerator, Strategy};
    use crate::config::EnumerationConfig;
    use crate::graph::edge::EdgeId;
    use rand::SeedableRng;

    #[test]
    fn test_grid_shape_and_route_count() {
        let mut rng = StdRng::seed_from_u64(7);
        let graph = GridScenario::new(3, 4).builder(&mut rng).build().unwrap();

        assert_eq!(12, graph.node_count());
        // 3 * (4 - 1) right edges + (3 - 1) * 4 down edges
        assert_eq!(17, graph.edge_count());
        assert!(
            graph
                .edges()
                .iter()
                .all(|e| (1.0..=10.0).contains(&e.base_capacity()))
        );

        let config = EnumerationConfig::default();
        let found = PathEnumerator::new(&graph, &config).enumerate(&mut rng);
        assert_eq!(Strategy::Complete, found.strategy());
        // C(5, 2) monotone lattice routes
        assert_eq!(10, found.routes().len());
    }

    #[test]
    fn test_star_paths_share_hub_edge() {
        let mut rng = StdRng::seed_from_u64(7);
        let graph = StarScenario::new(5).builder(&mut rng).build().unwrap();

        assert_eq!(8, graph.node_count());
        assert_eq!(5, graph.path_count());
        assert_eq!(5, graph.paths_through(EdgeId(0)).len());
    }

    #[test]
    fn test_layered_is_fully_connected_between_layers() {
        let mut rng = StdRng::seed_from_u64(7);
        let graph = LayeredScenario::new(vec![3, 2]).builder(&mut rng).build().unwrap();

        assert_eq!(7, graph.node_count());
        assert_eq!(3 + 6 + 2, graph.edge_count());
    }

    #[test]
    fn test_seed_reproduces_capacities() {
        let capacities = |seed| {
            let mut rng = StdRng::seed_from_u64(seed);
            GridScenario::new(3, 3)
                .builder(&mut rng)
                .build()
                .unwrap()
                .edges()
                .iter()
                .map(|e| e.base_capacity())
                .collect::<Vec<f64>>()
        };
        assert_eq!(capacities(11), capacities(11));
    }
}
