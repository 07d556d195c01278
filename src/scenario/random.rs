use crate::graph::builder::GraphBuilder;
use crate::graph::node::NodeKind;
use crate::scenario::scenario::Scenario;
use crate::scenario::stress::capacity;
use rand::Rng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

/// Random network over `nodes` nodes (source and sink included). A spine
/// through every intermediate node in random order keeps the whole graph
/// connected both ways; the remaining edges are random, never into the
/// source, never out of the sink, never duplicated.
pub struct RandomScenario {
    nodes: usize,
    edges: usize,
}

impl RandomScenario {
    pub fn new(nodes: usize, edges: usize) -> Self {
        Self {
            nodes: nodes.max(2),
            edges,
        }
    }
}

impl Scenario for RandomScenario {
    fn name(&self) -> &str {
        "random"
    }

    fn builder(&self, rng: &mut StdRng) -> GraphBuilder {
        let n = self.nodes;
        let name = |i: usize| match i {
            0 => "s".to_string(),
            _ if i == n - 1 => "t".to_string(),
            _ => format!("v{i}"),
        };

        let mut builder = GraphBuilder::new();
        builder.add_node(name(0), NodeKind::Source);
        (1..n - 1).for_each(|i| {
            builder.add_node(name(i), NodeKind::Intermediate);
        });
        builder.add_node(name(n - 1), NodeKind::Sink);

        let mut has_edge = vec![vec![false; n]; n];
        let mut eid = 0usize;
        let mut add_edge = |builder: &mut GraphBuilder, rng: &mut StdRng, from: usize, to: usize| {
            if from == to || has_edge[from][to] {
                return false;
            }
            has_edge[from][to] = true;
            eid += 1;
            builder.add_edge(format!("e{eid}"), name(from), name(to), capacity(rng));
            true
        };

        let mut spine = (1..n - 1).collect::<Vec<usize>>();
        spine.shuffle(rng);
        let spine = std::iter::once(0)
            .chain(spine)
            .chain(std::iter::once(n - 1))
            .collect::<Vec<usize>>();
        spine.windows(2).for_each(|w| {
            add_edge(&mut builder, rng, w[0], w[1]);
        });

        // no edge into s, none out of t, no self loops
        let possible = (n - 1) * (n - 1) - (n - 2);
        let wanted = self.edges.clamp(n - 1, possible);
        let mut added = n - 1;
        while added < wanted {
            let from = rng.gen_range(0..n - 1);
            let to = rng.gen_range(1..n);
            if add_edge(&mut builder, rng, from, to) {
                added += 1;
            }
        }
        builder
    }
}
