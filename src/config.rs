use std::time::Duration;

#[derive(Clone, Debug, PartialEq)]
pub struct DynamicsConfig {
    /// Half-width of the uniform random-walk step, as a fraction of the
    /// edge's base capacity.
    pub walk_step: f64,
    pub min_capacity_fraction: f64,
    pub failure_probability: f64,
    pub recovery_probability: f64,
}

impl DynamicsConfig {
    pub fn frozen() -> Self {
        Self {
            walk_step: 0.0,
            min_capacity_fraction: 1.0,
            failure_probability: 0.0,
            recovery_probability: 0.0,
        }
    }
}

impl Default for DynamicsConfig {
    fn default() -> Self {
        Self {
            walk_step: 0.05,
            min_capacity_fraction: 0.25,
            failure_probability: 0.01,
            recovery_probability: 0.2,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct EnumerationConfig {
    pub complete_max_nodes: usize,
    pub smart_max_nodes: usize,
    pub max_paths: usize,
    pub max_time: Duration,
    pub target_paths: usize,
    pub sample_attempts: usize,
}

impl Default for EnumerationConfig {
    fn default() -> Self {
        Self {
            complete_max_nodes: 16,
            smart_max_nodes: 64,
            max_paths: 1_000,
            max_time: Duration::from_secs(2),
            target_paths: 32,
            sample_attempts: 8,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct SimulationConfig {
    pub seed: u64,
    pub alert_budget: usize,
    pub dynamics: DynamicsConfig,
    pub enumeration: EnumerationConfig,
}

impl SimulationConfig {
    pub fn frozen(seed: u64) -> Self {
        Self {
            seed,
            dynamics: DynamicsConfig::frozen(),
            ..Self::default()
        }
    }
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            alert_budget: 3,
            dynamics: DynamicsConfig::default(),
            enumeration: EnumerationConfig::default(),
        }
    }
}
