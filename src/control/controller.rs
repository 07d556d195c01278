use crate::control::command::Command;
use crate::state::snapshot::{PathInfo, PathStatus, StateSnapshot};
use std::collections::VecDeque;

pub trait Controller {
    fn decide(&mut self, snapshot: &StateSnapshot) -> Command;
}

/// Saturates the open path with the most headroom; holds once every path is
/// saturated or blocked.
pub struct GreedyController {
    min_gain: f64,
}

impl GreedyController {
    pub fn new() -> Self {
        Self { min_gain: 1e-3 }
    }
}

impl Default for GreedyController {
    fn default() -> Self {
        Self::new()
    }
}

impl Controller for GreedyController {
    fn decide(&mut self, snapshot: &StateSnapshot) -> Command {
        snapshot
            .paths
            .iter()
            .filter(|p| !matches!(p.status, PathStatus::Blocked | PathStatus::Saturated))
            .filter(|p| p.available > self.min_gain)
            .fold(None, |best: Option<&PathInfo>, p| match best {
                Some(b) if b.available >= p.available => Some(b),
                _ => Some(p),
            })
            .map(|p| Command::Saturate {
                path: p.name.clone(),
            })
            .unwrap_or(Command::Hold)
    }
}

pub struct ScriptedController {
    commands: VecDeque<Command>,
}

impl ScriptedController {
    pub fn new(commands: impl IntoIterator<Item = Command>) -> Self {
        Self {
            commands: commands.into_iter().collect(),
        }
    }

    pub fn remaining(&self) -> usize {
        self.commands.len()
    }
}

impl Controller for ScriptedController {
    fn decide(&mut self, _snapshot: &StateSnapshot) -> Command {
        self.commands.pop_front().unwrap_or(Command::Hold)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::builder::GraphBuilder;
    use crate::graph::node::NodeKind;
    use crate::graph::path::PathId;
    use crate::state::network_state::NetworkState;
    use crate::state::snapshot::Metrics;

    fn state() -> NetworkState {
        let mut builder = GraphBuilder::new();
        builder
            .add_node("s", NodeKind::Source)
            .add_node("a", NodeKind::Intermediate)
            .add_node("t", NodeKind::Sink)
            .add_edge("e1", "s", "a", 10.0)
            .add_edge("e2", "a", "t", 4.0)
            .add_edge("e3", "a", "t", 5.0)
            .add_path("P1", ["e1", "e2"])
            .add_path("P2", ["e1", "e3"]);
        NetworkState::new(builder.build().unwrap())
    }

    fn snapshot(state: &NetworkState) -> StateSnapshot {
        StateSnapshot::capture(state, Metrics::default(), &[], &[])
    }

    #[test]
    fn test_greedy_picks_most_headroom() {
        let mut state = state();
        let mut greedy = GreedyController::new();
        assert_eq!(
            Command::Saturate {
                path: "P2".to_string()
            },
            greedy.decide(&snapshot(&state))
        );

        state.commit_path_flows(&[(PathId(1), 5.0)]);
        assert_eq!(
            Command::Saturate {
                path: "P1".to_string()
            },
            greedy.decide(&snapshot(&state))
        );

        state.commit_path_flows(&[(PathId(0), 4.0)]);
        assert_eq!(Command::Hold, greedy.decide(&snapshot(&state)));
    }

    #[test]
    fn test_greedy_keeps_first_path_on_equal_headroom() {
        let mut builder = GraphBuilder::new();
        builder
            .add_node("s", NodeKind::Source)
            .add_node("t", NodeKind::Sink)
            .add_edge("e1", "s", "t", 6.0)
            .add_edge("e2", "s", "t", 6.0)
            .add_path("P1", ["e1"])
            .add_path("P2", ["e2"]);
        let state = NetworkState::new(builder.build().unwrap());

        assert_eq!(
            Command::Saturate {
                path: "P1".to_string()
            },
            GreedyController::new().decide(&snapshot(&state))
        );
    }

    #[test]
    fn test_script_replays_then_holds() {
        let state = state();
        let mut script =
            ScriptedController::new([Command::ClearAll, Command::Distribute { total: 2.0 }]);

        assert_eq!(Command::ClearAll, script.decide(&snapshot(&state)));
        assert_eq!(Command::Distribute { total: 2.0 }, script.decide(&snapshot(&state)));
        assert_eq!(0, script.remaining());
        assert_eq!(Command::Hold, script.decide(&snapshot(&state)));
    }
}
