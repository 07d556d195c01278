use crate::analysis::maxflow::{MaxFlowCalculator, path_capacity_sum};
use crate::graph::edge::EdgeId;
use crate::graph::path::PathId;
use crate::simulation::alerts::Alert;
use crate::state::edge_state::EdgeStatus;
use crate::state::event::FlowClear;
use crate::state::network_state::{Bottleneck, FLOW_EPSILON, NetworkState};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PathStatus {
    Low,
    Normal,
    High,
    Saturated,
    Blocked,
}

impl PathStatus {
    fn classify(bottleneck: f64, utilization: f64) -> Self {
        match utilization {
            _ if bottleneck <= FLOW_EPSILON => PathStatus::Blocked,
            u if u >= 1.0 - FLOW_EPSILON => PathStatus::Saturated,
            u if u >= 0.8 => PathStatus::High,
            u if u >= 0.5 => PathStatus::Normal,
            _ => PathStatus::Low,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            PathStatus::Low => "LOW",
            PathStatus::Normal => "NORMAL",
            PathStatus::High => "HIGH",
            PathStatus::Saturated => "SATURATED",
            PathStatus::Blocked => "BLOCKED",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EdgeLoad {
    Low,
    Normal,
    High,
    Overload,
    Disabled,
}

impl EdgeLoad {
    fn classify(capacity: f64, failed: bool, utilization: f64) -> Self {
        match utilization {
            _ if failed || capacity <= 0.0 => EdgeLoad::Disabled,
            u if u > 1.0 + FLOW_EPSILON => EdgeLoad::Overload,
            u if u >= 0.8 => EdgeLoad::High,
            u if u >= 0.5 => EdgeLoad::Normal,
            _ => EdgeLoad::Low,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            EdgeLoad::Low => "LOW",
            EdgeLoad::Normal => "NORMAL",
            EdgeLoad::High => "HIGH",
            EdgeLoad::Overload => "OVERLOAD",
            EdgeLoad::Disabled => "DISABLED",
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct PathInfo {
    pub id: PathId,
    pub name: String,
    pub edges: Vec<EdgeId>,
    pub current_flow: f64,
    pub bottleneck: Bottleneck,
    pub utilization: f64,
    pub available: f64,
    pub status: PathStatus,
    pub shared_with: Vec<PathId>,
}

impl PathInfo {
    pub fn from_state(state: &NetworkState, id: PathId) -> Self {
        let graph = state.graph();
        let path = graph.path_by_id(id);
        let current_flow = state.path_flow(id);
        let bottleneck = state.bottleneck(id);
        let ratio = if bottleneck.capacity > FLOW_EPSILON {
            current_flow / bottleneck.capacity
        } else {
            0.0
        };
        let shared_with = graph
            .paths()
            .iter()
            .filter(|other| other.id() != id && other.shares_edge_with(path))
            .map(|other| other.id())
            .collect();

        Self {
            id,
            name: path.name().to_string(),
            edges: path.edges().to_vec(),
            current_flow,
            bottleneck,
            utilization: ratio * 100.0,
            available: (bottleneck.capacity - current_flow).max(0.0),
            status: PathStatus::classify(bottleneck.capacity, ratio),
            shared_with,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct EdgeInfo {
    pub id: EdgeId,
    pub name: String,
    pub from: String,
    pub to: String,
    pub base_capacity: f64,
    pub capacity: f64,
    pub flow: f64,
    pub residual: f64,
    pub utilization: f64,
    pub failed: bool,
    pub status: EdgeStatus,
    pub load: EdgeLoad,
    pub using_paths: Vec<PathId>,
    pub bottleneck_for: Vec<PathId>,
}

impl EdgeInfo {
    pub fn from_state(state: &NetworkState, id: EdgeId) -> Self {
        let graph = state.graph();
        let edge = graph.edge_by_id(id);
        let edge_state = state.edge_state(id);
        let ratio = match edge_state.utilization() {
            u if u.is_finite() => u,
            _ => 0.0,
        };
        let using_paths = graph.paths_through(id).to_vec();
        let bottleneck_for = using_paths
            .iter()
            .copied()
            .filter(|p| state.bottleneck(*p).edge == id)
            .collect();

        Self {
            id,
            name: edge.name().to_string(),
            from: graph.node_by_id(edge.from()).name().to_string(),
            to: graph.node_by_id(edge.to()).name().to_string(),
            base_capacity: edge.base_capacity(),
            capacity: edge_state.capacity(),
            flow: edge_state.flow(),
            residual: edge_state.residual(),
            utilization: ratio * 100.0,
            failed: edge_state.is_failed(),
            status: edge_state.status(),
            load: EdgeLoad::classify(edge_state.capacity(), edge_state.is_failed(), ratio),
            using_paths,
            bottleneck_for,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Metrics {
    pub tick: usize,
    pub throughput: f64,
    pub max_flow: f64,
    /// sum of raw path bottlenecks, overcounting shared edges
    pub path_capacity: f64,
    pub efficiency: f64,
    pub failed_edges: usize,
    pub blocked_paths: usize,
}

impl Metrics {
    pub fn from_state(state: &NetworkState) -> Self {
        let throughput = state.total_throughput();
        let max_flow = state.theoretical_max_flow();
        let efficiency = if max_flow > FLOW_EPSILON {
            throughput / max_flow
        } else {
            0.0
        };
        let failed_edges = state.edge_states().iter().filter(|s| s.is_failed()).count();
        let blocked_paths = state
            .graph()
            .paths()
            .iter()
            .filter(|p| state.bottleneck(p.id()).capacity <= FLOW_EPSILON)
            .count();

        Self {
            tick: state.tick(),
            throughput,
            max_flow,
            path_capacity: path_capacity_sum(state),
            efficiency,
            failed_edges,
            blocked_paths,
        }
    }
}

/// Read-only view handed to controllers: full edge and path state, but only
/// the alerts surfaced for the last tick.
#[derive(Clone, Debug, PartialEq)]
pub struct StateSnapshot {
    pub tick: usize,
    pub edges: Vec<EdgeInfo>,
    pub paths: Vec<PathInfo>,
    pub metrics: Metrics,
    pub min_cut: Vec<EdgeId>,
    pub alerts: Vec<Alert>,
    /// paths zeroed by failures on the last tick, whether or not their alert
    /// made the budget
    pub flow_clears: Vec<FlowClear>,
}

impl StateSnapshot {
    pub fn capture(
        state: &NetworkState,
        metrics: Metrics,
        alerts: &[Alert],
        flow_clears: &[FlowClear],
    ) -> Self {
        let graph = state.graph();
        let max_flow = MaxFlowCalculator::from_state(state).compute();
        Self {
            tick: state.tick(),
            edges: graph
                .edges()
                .iter()
                .map(|e| EdgeInfo::from_state(state, e.id()))
                .collect(),
            paths: graph
                .paths()
                .iter()
                .map(|p| PathInfo::from_state(state, p.id()))
                .collect(),
            metrics,
            min_cut: max_flow.min_cut().to_vec(),
            alerts: alerts.to_vec(),
            flow_clears: flow_clears.to_vec(),
        }
    }

    pub fn path(&self, name: &str) -> Option<&PathInfo> {
        self.paths.iter().find(|p| p.name == name)
    }

    pub fn edge(&self, name: &str) -> Option<&EdgeInfo> {
        self.edges.iter().find(|e| e.name == name)
    }
}
