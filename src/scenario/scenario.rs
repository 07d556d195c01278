use crate::graph::builder::GraphBuilder;
use crate::scenario::basic::FixedScenario;
use crate::scenario::random::RandomScenario;
use crate::scenario::stress::{GridScenario, LayeredScenario, StarScenario};
use clap::ValueEnum;
use rand::rngs::StdRng;

/// Source of a network definition. Generated capacities are drawn from the
/// supplied generator so a seed reproduces the network.
pub trait Scenario {
    fn name(&self) -> &str;
    fn builder(&self, rng: &mut StdRng) -> GraphBuilder;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum Sample {
    Diamond,
    Complex,
    Linear,
    Parallel,
    Bottleneck,
    Grid,
    Star,
    Layered,
    Random,
}

impl Sample {
    pub fn scenario(self) -> Box<dyn Scenario> {
        match self {
            Sample::Diamond => Box::new(FixedScenario::diamond()),
            Sample::Complex => Box::new(FixedScenario::complex()),
            Sample::Linear => Box::new(FixedScenario::linear()),
            Sample::Parallel => Box::new(FixedScenario::parallel()),
            Sample::Bottleneck => Box::new(FixedScenario::bottleneck()),
            Sample::Grid => Box::new(GridScenario::new(3, 3)),
            Sample::Star => Box::new(StarScenario::new(5)),
            Sample::Layered => Box::new(LayeredScenario::new(vec![3, 2])),
            Sample::Random => Box::new(RandomScenario::new(10, 20)),
        }
    }
}
