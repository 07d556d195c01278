use crate::graph::edge::EdgeId;
use crate::graph::graph::Graph;
use crate::graph::node::NodeId;
use crate::state::network_state::{FLOW_EPSILON, NetworkState};
use std::collections::VecDeque;

#[derive(Clone, Debug, PartialEq)]
pub struct MaxFlow {
    value: f64,
    edge_flows: Vec<f64>,
    min_cut: Vec<EdgeId>,
}

impl MaxFlow {
    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn edge_flows(&self) -> &[f64] {
        &self.edge_flows
    }

    pub fn min_cut(&self) -> &[EdgeId] {
        &self.min_cut
    }
}

/// Classical single-commodity max flow (Edmonds-Karp) over the full edge
/// set. Used as the efficiency reference only; it never constrains commands.
pub struct MaxFlowCalculator<'a> {
    graph: &'a Graph,
    capacities: Vec<f64>,
}

impl<'a> MaxFlowCalculator<'a> {
    pub fn new(graph: &'a Graph, capacities: Vec<f64>) -> Self {
        Self { graph, capacities }
    }

    pub fn from_state(state: &'a NetworkState) -> Self {
        let capacities = state.edge_states().iter().map(|s| s.capacity()).collect();
        Self::new(state.graph(), capacities)
    }

    pub fn compute(&self) -> MaxFlow {
        let n = self.graph.node_count();
        let m = self.graph.edge_count();
        // arc 2i is edge i, arc 2i + 1 its reverse
        let mut residual = vec![0.0; 2 * m];
        let mut head = vec![NodeId(0); 2 * m];
        let mut arcs_from = vec![Vec::new(); n];
        self.graph.edges().iter().for_each(|e| {
            let i = e.id().index();
            residual[2 * i] = self.capacities[i].max(0.0);
            head[2 * i] = e.to();
            head[2 * i + 1] = e.from();
            arcs_from[e.from().index()].push(2 * i);
            arcs_from[e.to().index()].push(2 * i + 1);
        });

        let source = self.graph.source();
        let sink = self.graph.sink();
        let mut value = 0.0;

        while let Some(parents) = augmenting_path(&residual, &head, &arcs_from, source, sink) {
            let mut arcs = Vec::new();
            let mut at = sink;
            while at != source {
                let arc = parents[at.index()].unwrap_or_default();
                arcs.push(arc);
                at = head[arc ^ 1];
            }
            let push = arcs
                .iter()
                .map(|a| residual[*a])
                .fold(f64::INFINITY, f64::min);
            if push <= FLOW_EPSILON {
                break;
            }
            arcs.iter().for_each(|a| {
                residual[*a] -= push;
                residual[*a ^ 1] += push;
            });
            value += push;
        }

        let source_side = reachable(&residual, &head, &arcs_from, source);
        let min_cut = self
            .graph
            .edges()
            .iter()
            .filter(|e| source_side[e.from().index()] && !source_side[e.to().index()])
            .map(|e| e.id())
            .collect();
        let edge_flows = (0..m).map(|i| residual[2 * i + 1]).collect();

        MaxFlow {
            value,
            edge_flows,
            min_cut,
        }
    }
}

fn augmenting_path(
    residual: &[f64],
    head: &[NodeId],
    arcs_from: &[Vec<usize>],
    source: NodeId,
    sink: NodeId,
) -> Option<Vec<Option<usize>>> {
    let mut parents = vec![None; arcs_from.len()];
    let mut seen = vec![false; arcs_from.len()];
    let mut queue = VecDeque::from([source]);
    seen[source.index()] = true;

    while let Some(at) = queue.pop_front() {
        for arc in &arcs_from[at.index()] {
            let next = head[*arc];
            if !seen[next.index()] && residual[*arc] > FLOW_EPSILON {
                seen[next.index()] = true;
                parents[next.index()] = Some(*arc);
                if next == sink {
                    return Some(parents);
                }
                queue.push_back(next);
            }
        }
    }
    None
}

fn reachable(
    residual: &[f64],
    head: &[NodeId],
    arcs_from: &[Vec<usize>],
    source: NodeId,
) -> Vec<bool> {
    let mut seen = vec![false; arcs_from.len()];
    let mut queue = VecDeque::from([source]);
    seen[source.index()] = true;
    while let Some(at) = queue.pop_front() {
        for arc in &arcs_from[at.index()] {
            let next = head[*arc];
            if !seen[next.index()] && residual[*arc] > FLOW_EPSILON {
                seen[next.index()] = true;
                queue.push_back(next);
            }
        }
    }
    seen
}

/// Sum of the raw bottleneck of every path, ignoring that paths share edges.
/// An upper bound diagnostic only: it can exceed the real max flow whenever
/// two paths overlap.
pub fn path_capacity_sum(state: &NetworkState) -> f64 {
    state
        .graph()
        .paths()
        .iter()
        .map(|p| {
            p.edges()
                .iter()
                .map(|e| state.edge_state(*e).capacity())
                .fold(f64::INFINITY, f64::min)
        })
        .filter(|c| c.is_finite())
        .sum()
}
