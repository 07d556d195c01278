use crate::config::DynamicsConfig;
use crate::graph::edge::EdgeId;
use crate::state::edge_state::EdgeStatus;
use crate::state::event::FlowClear;
use crate::state::network_state::NetworkState;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

pub struct CapacityDynamics {
    config: DynamicsConfig,
    rng: StdRng,
}

impl CapacityDynamics {
    pub fn new(config: DynamicsConfig, seed: u64) -> Self {
        let config = DynamicsConfig {
            walk_step: config.walk_step.max(0.0),
            min_capacity_fraction: config.min_capacity_fraction.clamp(0.0, 1.0),
            failure_probability: config.failure_probability.clamp(0.0, 1.0),
            recovery_probability: config.recovery_probability.clamp(0.0, 1.0),
        };
        Self {
            config,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn config(&self) -> &DynamicsConfig {
        &self.config
    }

    /// Advances every edge by one tick. Each edge draws from the stream in
    /// id order, so the draw sequence only depends on the seed and the
    /// edge states. Operator-disabled edges are left alone.
    pub fn step(&mut self, state: &mut NetworkState) -> Vec<FlowClear> {
        let mut clears = Vec::new();

        for i in 0..state.graph().edge_count() {
            let edge = EdgeId(i);
            let base = state.graph().edge_by_id(edge).base_capacity();

            match state.edge_state(edge).status() {
                EdgeStatus::Disabled => {}
                EdgeStatus::Failed => {
                    if self.rng.gen_bool(self.config.recovery_probability) {
                        state.restore_edge(edge);
                    }
                }
                EdgeStatus::Active => {
                    if self.config.walk_step > 0.0 && base > 0.0 {
                        let step = self.config.walk_step * base;
                        let noise = self.rng.gen_range(-step..=step);
                        let floor = self.config.min_capacity_fraction * base;
                        let current = state.edge_state(edge).capacity();
                        let capacity = (current + noise).clamp(floor, base);
                        state.set_capacity(edge, capacity);
                    }
                    if self.rng.gen_bool(self.config.failure_probability) {
                        let clear = state.fail_edge(edge, EdgeStatus::Failed);
                        if !clear.paths.is_empty() {
                            clears.push(clear);
                        }
                    }
                }
            }
        }

        state.shed_overloads();
        clears
    }
}
