use crate::analysis::maxflow::MaxFlowCalculator;
use crate::error::SimulationError;
use crate::graph::edge::EdgeId;
use crate::graph::graph::Graph;
use crate::graph::node::NodeId;
use crate::graph::path::PathId;
use crate::state::edge_state::{EdgeState, EdgeStatus};
use crate::state::event::{FlowClear, NetworkEvent};
use tracing::{error, info, warn};

pub const FLOW_EPSILON: f64 = 1e-6;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bottleneck {
    /// capacity left for the path once every other path's flow is counted
    pub capacity: f64,
    pub edge: EdgeId,
}

/// Single owner of all mutable network state for a run. Every component
/// reads or mutates it through a borrow; nothing keeps its own copy.
pub struct NetworkState {
    graph: Graph,
    edge_states: Vec<EdgeState>,
    path_flows: Vec<f64>,
    tick: usize,
    pending_events: Vec<(usize, NetworkEvent)>,
}

impl NetworkState {
    pub fn new(graph: Graph) -> Self {
        let edge_states = graph
            .edges()
            .iter()
            .map(|e| EdgeState::new(e.base_capacity()))
            .collect();
        let path_flows = vec![0.0; graph.path_count()];
        Self {
            graph,
            edge_states,
            path_flows,
            tick: 0,
            pending_events: Vec::new(),
        }
    }

    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    pub fn tick(&self) -> usize {
        self.tick
    }

    pub(crate) fn advance_tick(&mut self) -> usize {
        self.tick += 1;
        self.tick
    }

    pub fn edge_state(&self, id: EdgeId) -> &EdgeState {
        &self.edge_states[id.index()]
    }

    pub fn edge_states(&self) -> &[EdgeState] {
        &self.edge_states
    }

    pub fn path_flow(&self, id: PathId) -> f64 {
        self.path_flows[id.index()]
    }

    pub fn path_flows(&self) -> &[f64] {
        &self.path_flows
    }

    pub fn total_throughput(&self) -> f64 {
        self.graph
            .incoming(self.graph.sink())
            .iter()
            .map(|e| self.edge_states[e.index()].flow())
            .sum()
    }

    pub fn theoretical_max_flow(&self) -> f64 {
        MaxFlowCalculator::from_state(self).compute().value()
    }

    pub fn bottleneck(&self, id: PathId) -> Bottleneck {
        let own = self.path_flows[id.index()];
        self.graph
            .path_by_id(id)
            .edges()
            .iter()
            .map(|e| {
                let state = &self.edge_states[e.index()];
                let others = (state.flow() - own).max(0.0);
                Bottleneck {
                    capacity: (state.capacity() - others).max(0.0),
                    edge: *e,
                }
            })
            .fold(None, |best: Option<Bottleneck>, b| match best {
                Some(best) if best.capacity <= b.capacity => Some(best),
                _ => Some(b),
            })
            .unwrap_or(Bottleneck {
                capacity: 0.0,
                edge: EdgeId(0),
            })
    }

    pub fn worst_overflow(&self, targets: &[(PathId, f64)]) -> Option<(EdgeId, f64)> {
        let mut edge_flows = self
            .edge_states
            .iter()
            .map(|s| s.flow())
            .collect::<Vec<f64>>();
        let mut touched = Vec::new();
        targets.iter().for_each(|(p, target)| {
            let delta = target - self.path_flows[p.index()];
            self.graph.path_by_id(*p).edges().iter().for_each(|e| {
                edge_flows[e.index()] += delta;
                touched.push(*e);
            });
        });

        touched
            .into_iter()
            .map(|e| (e, edge_flows[e.index()] - self.edge_states[e.index()].capacity()))
            .filter(|(_, overflow)| *overflow > FLOW_EPSILON)
            .fold(None, |worst: Option<(EdgeId, f64)>, (e, overflow)| match worst {
                Some(w) if w.1 >= overflow => Some(w),
                _ => Some((e, overflow)),
            })
    }

    pub(crate) fn commit_path_flows(&mut self, targets: &[(PathId, f64)]) {
        targets
            .iter()
            .for_each(|(p, flow)| self.path_flows[p.index()] = flow.max(0.0));
        self.refresh_edge_flows();
    }

    pub(crate) fn clear_path_flows(&mut self) -> usize {
        let cleared = self.path_flows.iter().filter(|f| **f > 0.0).count();
        self.path_flows.iter_mut().for_each(|f| *f = 0.0);
        self.refresh_edge_flows();
        cleared
    }

    fn refresh_edge_flows(&mut self) {
        for (i, state) in self.edge_states.iter_mut().enumerate() {
            let flow = self
                .graph
                .paths_through(EdgeId(i))
                .iter()
                .map(|p| self.path_flows[p.index()])
                .sum();
            state.set_flow(flow);
        }
    }

    pub(crate) fn set_capacity(&mut self, edge: EdgeId, capacity: f64) {
        self.edge_states[edge.index()].set_capacity(capacity);
    }

    /// Fails `edge` and zeroes every path carrying flow through it in the
    /// same step. Partial flow through a failed edge never survives.
    pub(crate) fn fail_edge(&mut self, edge: EdgeId, status: EdgeStatus) -> FlowClear {
        let capacity_lost = self.edge_states[edge.index()].capacity();
        self.edge_states[edge.index()].fail(status);

        let paths = self
            .graph
            .paths_through(edge)
            .iter()
            .copied()
            .filter(|p| self.path_flows[p.index()] > 0.0)
            .collect::<Vec<PathId>>();
        paths
            .iter()
            .for_each(|p| self.path_flows[p.index()] = 0.0);
        self.refresh_edge_flows();

        let name = self.graph.edge_by_id(edge).name();
        info!(tick = self.tick, edge = %name, ?status, capacity_lost, "edge failed");
        if !paths.is_empty() {
            warn!(
                tick = self.tick,
                edge = %name,
                cleared = paths.len(),
                "cascading flow clear"
            );
        }
        self.pending_events.push((
            self.tick,
            NetworkEvent::Failure {
                edge,
                capacity_lost,
            },
        ));
        FlowClear { edge, paths }
    }

    pub(crate) fn restore_edge(&mut self, edge: EdgeId) -> f64 {
        let capacity = self.graph.edge_by_id(edge).base_capacity();
        self.edge_states[edge.index()].restore(capacity);
        info!(
            tick = self.tick,
            edge = %self.graph.edge_by_id(edge).name(),
            capacity,
            "edge recovered"
        );
        self.pending_events
            .push((self.tick, NetworkEvent::Recovery { edge, capacity }));
        capacity
    }

    pub(crate) fn shed_overloads(&mut self) {
        for i in 0..self.edge_states.len() {
            let state = self.edge_states[i];
            let excess = state.flow() - state.capacity();
            if excess <= FLOW_EPSILON {
                continue;
            }
            let scale = if state.flow() > 0.0 {
                state.capacity() / state.flow()
            } else {
                0.0
            };
            self.graph
                .paths_through(EdgeId(i))
                .iter()
                .for_each(|p| self.path_flows[p.index()] *= scale);
            self.refresh_edge_flows();

            warn!(
                tick = self.tick,
                edge = %self.graph.edge_by_id(EdgeId(i)).name(),
                excess,
                "capacity fell below flow, shedding"
            );
            self.pending_events.push((
                self.tick,
                NetworkEvent::Overload {
                    edge: EdgeId(i),
                    excess,
                },
            ));
        }
    }

    /// Queued events, each with the tick it happened on.
    pub(crate) fn drain_events(&mut self) -> Vec<(usize, NetworkEvent)> {
        std::mem::take(&mut self.pending_events)
    }

    pub fn conservation_violations(&self) -> Vec<(NodeId, f64)> {
        self.graph
            .intermediates()
            .filter_map(|n| {
                let inflow: f64 = n
                    .incoming()
                    .iter()
                    .map(|e| self.edge_states[e.index()].flow())
                    .sum();
                let outflow: f64 = n
                    .outgoing()
                    .iter()
                    .map(|e| self.edge_states[e.index()].flow())
                    .sum();
                let imbalance = (inflow - outflow).abs();
                (imbalance > FLOW_EPSILON).then_some((n.id(), imbalance))
            })
            .collect()
    }

    pub fn check_invariants(&self) -> Result<(), SimulationError> {
        if let Some((node, imbalance)) = self.conservation_violations().first().copied() {
            return Err(SimulationError::Conservation {
                node: self.graph.node_by_id(node).name().to_string(),
                imbalance,
            });
        }

        for (i, flow) in self.path_flows.iter().enumerate() {
            if *flow < -FLOW_EPSILON || !flow.is_finite() {
                return Err(SimulationError::NegativePathFlow {
                    path: self.graph.path_by_id(PathId(i)).name().to_string(),
                    flow: *flow,
                });
            }
        }

        for (edge, state) in self.graph.edges().iter().zip(&self.edge_states) {
            if state.is_failed() && state.flow() > FLOW_EPSILON {
                return Err(SimulationError::FlowOnFailedEdge {
                    edge: edge.name().to_string(),
                    flow: state.flow(),
                });
            }
            if state.flow() > state.capacity() + FLOW_EPSILON {
                return Err(SimulationError::CapacityBound {
                    edge: edge.name().to_string(),
                    flow: state.flow(),
                    capacity: state.capacity(),
                });
            }
        }
        Ok(())
    }

    pub(crate) fn assert_invariants(&self, after: &str) {
        if let Err(violation) = self.check_invariants() {
            error!(tick = self.tick, after, %violation, "simulation invariant violated");
            panic!("simulation invariant violated after {after}: {violation}");
        }
    }
}
