use crate::analysis::paths::PathEnumerator;
use crate::config::SimulationConfig;
use crate::control::command::CommandReply;
use crate::control::controller::Controller;
use crate::control::flow_controller::FlowController;
use crate::error::{ClockError, DefinitionError};
use crate::graph::builder::GraphBuilder;
use crate::graph::graph::Graph;
use crate::simulation::alerts::{Alert, AlertSystem};
use crate::simulation::dynamics::CapacityDynamics;
use crate::state::event::FlowClear;
use crate::state::network_state::NetworkState;
use crate::state::snapshot::{Metrics, StateSnapshot};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::collections::VecDeque;
use tracing::{debug, info};

const HISTORY_LEN: usize = 256;

/// Offsets the enumeration stream from the dynamics stream so both derive
/// from one seed without sharing draws.
const ENUMERATION_SEED_OFFSET: u64 = 0x9E37_79B9_7F4A_7C15;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ClockState {
    Idle,
    Stepping,
    Terminated,
}

#[derive(Clone, Debug, PartialEq)]
pub struct TickReport {
    pub tick: usize,
    pub alerts: Vec<Alert>,
    pub flow_clears: Vec<FlowClear>,
    pub metrics: Metrics,
    pub events_total: usize,
}

pub struct SimulationEngine {
    state: NetworkState,
    dynamics: CapacityDynamics,
    alerts: AlertSystem,
    clock: ClockState,
    metrics: Metrics,
    history: VecDeque<Metrics>,
    last_alerts: Vec<Alert>,
    last_flow_clears: Vec<FlowClear>,
}

impl SimulationEngine {
    pub fn new(graph: Graph, config: &SimulationConfig) -> Self {
        let state = NetworkState::new(graph);
        let metrics = Metrics::from_state(&state);
        Self {
            state,
            dynamics: CapacityDynamics::new(config.dynamics.clone(), config.seed),
            alerts: AlertSystem::new(config.alert_budget),
            clock: ClockState::Idle,
            metrics,
            history: VecDeque::from([metrics]),
            last_alerts: Vec::new(),
            last_flow_clears: Vec::new(),
        }
    }

    /// Validates a network definition and fixes its path set. Definitions
    /// without predefined paths get theirs from the path enumerator.
    pub fn load(builder: GraphBuilder, config: &SimulationConfig) -> Result<Self, DefinitionError> {
        let mut graph = builder.build()?;
        if graph.path_count() == 0 {
            let mut rng = StdRng::seed_from_u64(config.seed.wrapping_add(ENUMERATION_SEED_OFFSET));
            let routes = PathEnumerator::new(&graph, &config.enumeration)
                .enumerate(&mut rng)
                .into_routes();
            graph = graph.with_paths(routes)?;
        }
        info!(
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            paths = graph.path_count(),
            seed = config.seed,
            "network loaded"
        );
        Ok(Self::new(graph, config))
    }

    pub fn state(&self) -> &NetworkState {
        &self.state
    }

    pub fn graph(&self) -> &Graph {
        self.state.graph()
    }

    /// Command surface over the live state. Manual failures and recoveries
    /// issued through it surface as alerts on the next tick.
    pub fn controller(&mut self) -> FlowController<'_> {
        FlowController::new(&mut self.state)
    }

    pub fn clock_state(&self) -> ClockState {
        self.clock
    }

    pub fn terminate(&mut self) {
        if self.clock != ClockState::Terminated {
            info!(tick = self.state.tick(), "simulation terminated");
            self.clock = ClockState::Terminated;
        }
    }

    pub fn step(&mut self) -> Result<TickReport, ClockError> {
        if self.clock == ClockState::Terminated {
            return Err(ClockError::Terminated);
        }
        self.clock = ClockState::Stepping;

        let tick = self.state.advance_tick();
        let flow_clears = self.dynamics.step(&mut self.state);
        let events = self.state.drain_events();
        let alerts = self.alerts.sample(&events);
        self.state.assert_invariants("tick");

        let metrics = Metrics::from_state(&self.state);
        self.metrics = metrics;
        if self.history.len() == HISTORY_LEN {
            self.history.pop_front();
        }
        self.history.push_back(metrics);
        self.last_alerts = alerts.clone();
        self.last_flow_clears = flow_clears.clone();

        debug!(
            tick,
            events = events.len(),
            alerts = alerts.len(),
            throughput = metrics.throughput,
            max_flow = metrics.max_flow,
            "tick"
        );
        self.clock = ClockState::Idle;
        Ok(TickReport {
            tick,
            alerts,
            flow_clears,
            metrics,
            events_total: events.len(),
        })
    }

    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    pub fn history(&self) -> &VecDeque<Metrics> {
        &self.history
    }

    pub fn last_alerts(&self) -> &[Alert] {
        &self.last_alerts
    }

    pub fn last_flow_clears(&self) -> &[FlowClear] {
        &self.last_flow_clears
    }

    pub fn alert_system(&self) -> &AlertSystem {
        &self.alerts
    }

    pub fn theoretical_max_flow(&self) -> f64 {
        self.state.theoretical_max_flow()
    }

    pub fn full_state_snapshot(&self) -> StateSnapshot {
        StateSnapshot::capture(
            &self.state,
            Metrics::from_state(&self.state),
            &self.last_alerts,
            &self.last_flow_clears,
        )
    }

    pub fn run(
        &mut self,
        controller: &mut dyn Controller,
        ticks: usize,
    ) -> Result<Vec<(CommandReply, TickReport)>, ClockError> {
        let mut log = Vec::with_capacity(ticks);
        for _ in 0..ticks {
            if self.clock == ClockState::Terminated {
                return Err(ClockError::Terminated);
            }
            let command = controller.decide(&self.full_state_snapshot());
            let reply = self.controller().apply(&command);
            debug!(
                tick = self.state.tick(),
                ?command,
                ok = reply.ok,
                message = %reply.message,
                "controller acted"
            );
            let report = self.step()?;
            log.push((reply, report));
        }
        Ok(log)
    }
}
