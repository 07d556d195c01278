use crate::control::command::{Command, CommandEffect, CommandReply};
use crate::error::{CommandError, NotFoundError, ValidationError};
use crate::graph::edge::EdgeId;
use crate::graph::node::NodeId;
use crate::graph::path::PathId;
use crate::state::edge_state::EdgeStatus;
use crate::state::network_state::{Bottleneck, FLOW_EPSILON, NetworkState};
use crate::state::snapshot::{EdgeInfo, PathInfo};
use tracing::debug;

const SATURATION_TOLERANCE: f64 = 1e-3;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SafeFlow {
    pub current: f64,
    pub max_safe: f64,
    pub available: f64,
    pub bottleneck: Bottleneck,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PathCriterion {
    Capacity,
    Utilization,
    Flow,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ValidationReport {
    pub conservation_violations: Vec<(NodeId, f64)>,
    pub overloads: Vec<(EdgeId, f64)>,
    pub throughput: f64,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.conservation_violations.is_empty() && self.overloads.is_empty()
    }
}

/// Validates and commits flow commands against the network state it
/// borrows. Every command either commits entirely or leaves the state
/// untouched; holding the `&mut` borrow serialises commands.
pub struct FlowController<'a> {
    state: &'a mut NetworkState,
}

impl<'a> FlowController<'a> {
    pub fn new(state: &'a mut NetworkState) -> Self {
        Self { state }
    }

    pub fn state(&self) -> &NetworkState {
        self.state
    }

    fn path_name(&self, path: PathId) -> Result<String, NotFoundError> {
        let graph = self.state.graph();
        if path.index() < graph.path_count() {
            Ok(graph.path_by_id(path).name().to_string())
        } else {
            Err(NotFoundError::Path(format!("#{}", path.index())))
        }
    }

    fn edge_name(&self, edge: EdgeId) -> Result<String, NotFoundError> {
        let graph = self.state.graph();
        if edge.index() < graph.edge_count() {
            Ok(graph.edge_by_id(edge).name().to_string())
        } else {
            Err(NotFoundError::Edge(format!("#{}", edge.index())))
        }
    }

    /// Checks that moving every listed path to its target keeps each edge
    /// within capacity, then commits all targets together.
    fn commit(&mut self, targets: &[(PathId, f64)], after: &str) -> Result<(), CommandError> {
        if let Some((edge, overflow)) = self.state.worst_overflow(targets) {
            let edge = self.edge_name(edge)?;
            debug!(command = after, %edge, overflow, "command rejected");
            return Err(ValidationError::CapacityExceeded { edge, overflow }.into());
        }
        self.state.commit_path_flows(targets);
        self.state.assert_invariants(after);
        Ok(())
    }

    pub fn set_path_flow(
        &mut self,
        path: PathId,
        target: f64,
    ) -> Result<CommandEffect, CommandError> {
        let name = self.path_name(path)?;
        if !target.is_finite() || target < 0.0 {
            return Err(ValidationError::InvalidAmount(target).into());
        }
        let from = self.state.path_flow(path);
        self.commit(&[(path, target)], "set_path_flow")?;
        debug!(path = %name, from, to = target, "path flow set");
        Ok(CommandEffect::FlowSet {
            path: name,
            from,
            to: target,
        })
    }

    pub fn update_path_flow(
        &mut self,
        path: PathId,
        delta: f64,
    ) -> Result<CommandEffect, CommandError> {
        let name = self.path_name(path)?;
        if !delta.is_finite() {
            return Err(ValidationError::InvalidAmount(delta).into());
        }
        let from = self.state.path_flow(path);
        let to = from + delta;
        if to < -FLOW_EPSILON {
            return Err(ValidationError::NegativeFlow {
                path: name,
                flow: to,
            }
            .into());
        }
        let to = to.max(0.0);
        self.commit(&[(path, to)], "update_path_flow")?;
        debug!(path = %name, from, to, "path flow updated");
        Ok(CommandEffect::FlowSet {
            path: name,
            from,
            to,
        })
    }

    /// Raises a path to its current bottleneck. A second call with nothing
    /// changed in between reports `AlreadySaturated` and changes nothing.
    pub fn saturate_path_flow(&mut self, path: PathId) -> Result<CommandEffect, CommandError> {
        let name = self.path_name(path)?;
        let bottleneck = self.state.bottleneck(path);
        let bottleneck_name = self.edge_name(bottleneck.edge)?;
        if bottleneck.capacity <= FLOW_EPSILON {
            return Err(ValidationError::PathBlocked {
                path: name,
                edge: bottleneck_name,
            }
            .into());
        }

        let from = self.state.path_flow(path);
        if (from - bottleneck.capacity).abs() < SATURATION_TOLERANCE {
            return Ok(CommandEffect::AlreadySaturated {
                path: name,
                flow: from,
                bottleneck: bottleneck_name,
            });
        }

        self.commit(&[(path, bottleneck.capacity)], "saturate_path_flow")?;
        debug!(
            path = %name,
            from,
            to = bottleneck.capacity,
            bottleneck = %bottleneck_name,
            "path saturated"
        );
        Ok(CommandEffect::Saturated {
            path: name,
            from,
            to: bottleneck.capacity,
            bottleneck: bottleneck_name,
        })
    }

    pub fn clear_all_flows(&mut self) -> Result<CommandEffect, CommandError> {
        let paths = self.state.clear_path_flows();
        self.state.assert_invariants("clear_all_flows");
        debug!(paths, "all flows cleared");
        Ok(CommandEffect::Cleared { paths })
    }

    /// Gives every path `total / |paths|`. If any edge cannot take the
    /// combined assignment the whole command is rejected; no path's share is
    /// moved to another.
    pub fn distribute_flow_equally(&mut self, total: f64) -> Result<CommandEffect, CommandError> {
        if !total.is_finite() || total < 0.0 {
            return Err(ValidationError::InvalidAmount(total).into());
        }
        let paths = self.state.graph().path_count();
        let per_path = total / paths as f64;
        let targets = (0..paths)
            .map(|i| (PathId(i), per_path))
            .collect::<Vec<(PathId, f64)>>();
        self.commit(&targets, "distribute_flow_equally")?;
        debug!(total, per_path, paths, "flow distributed");
        Ok(CommandEffect::Distributed { per_path, paths })
    }

    pub fn disable_edge(&mut self, edge: EdgeId) -> Result<CommandEffect, CommandError> {
        let name = self.edge_name(edge)?;
        if self.state.edge_state(edge).is_failed() {
            return Err(ValidationError::EdgeAlreadyDisabled(name).into());
        }
        let clear = self.state.fail_edge(edge, EdgeStatus::Disabled);
        self.state.assert_invariants("disable_edge");
        let cleared = clear
            .paths
            .iter()
            .map(|p| self.state.graph().path_by_id(*p).name().to_string())
            .collect();
        Ok(CommandEffect::EdgeDisabled {
            edge: name,
            cleared,
        })
    }

    pub fn enable_edge(&mut self, edge: EdgeId) -> Result<CommandEffect, CommandError> {
        let name = self.edge_name(edge)?;
        if !self.state.edge_state(edge).is_failed() {
            return Err(ValidationError::EdgeAlreadyEnabled(name).into());
        }
        let capacity = self.state.restore_edge(edge);
        self.state.assert_invariants("enable_edge");
        Ok(CommandEffect::EdgeEnabled {
            edge: name,
            capacity,
        })
    }

    pub fn path_info(&self, path: PathId) -> Result<PathInfo, NotFoundError> {
        self.path_name(path)?;
        Ok(PathInfo::from_state(self.state, path))
    }

    pub fn edge_info(&self, edge: EdgeId) -> Result<EdgeInfo, NotFoundError> {
        self.edge_name(edge)?;
        Ok(EdgeInfo::from_state(self.state, edge))
    }

    pub fn max_safe_flow(&self, path: PathId) -> Result<SafeFlow, NotFoundError> {
        self.path_name(path)?;
        let current = self.state.path_flow(path);
        let bottleneck = self.state.bottleneck(path);
        Ok(SafeFlow {
            current,
            max_safe: bottleneck.capacity,
            available: (bottleneck.capacity - current).max(0.0),
            bottleneck,
        })
    }

    pub fn best_path(&self, criterion: PathCriterion) -> Option<PathId> {
        let paths = self.state.graph().paths().iter().map(|p| p.id());
        let bottleneck = |p: PathId| self.state.bottleneck(p).capacity;
        let utilization = |p: PathId| match bottleneck(p) {
            b if b > FLOW_EPSILON => self.state.path_flow(p) / b,
            _ => f64::INFINITY,
        };
        match criterion {
            PathCriterion::Capacity => {
                paths.max_by(|a, b| bottleneck(*a).total_cmp(&bottleneck(*b)))
            }
            PathCriterion::Utilization => {
                paths.min_by(|a, b| utilization(*a).total_cmp(&utilization(*b)))
            }
            PathCriterion::Flow => paths.min_by(|a, b| {
                self.state
                    .path_flow(*a)
                    .total_cmp(&self.state.path_flow(*b))
            }),
        }
    }

    pub fn validate_and_report(&self) -> ValidationReport {
        let overloads = self
            .state
            .edge_states()
            .iter()
            .enumerate()
            .filter(|(_, s)| s.flow() > s.capacity() + FLOW_EPSILON)
            .map(|(i, s)| (EdgeId(i), s.flow() - s.capacity()))
            .collect();
        ValidationReport {
            conservation_violations: self.state.conservation_violations(),
            overloads,
            throughput: self.state.total_throughput(),
        }
    }

    fn execute(&mut self, command: &Command) -> Result<CommandEffect, CommandError> {
        let graph = self.state.graph();
        match command {
            Command::SetFlow { path, flow } => {
                let id = graph.path_id(path)?;
                self.set_path_flow(id, *flow)
            }
            Command::UpdateFlow { path, delta } => {
                let id = graph.path_id(path)?;
                self.update_path_flow(id, *delta)
            }
            Command::Saturate { path } => {
                let id = graph.path_id(path)?;
                self.saturate_path_flow(id)
            }
            Command::ClearAll => self.clear_all_flows(),
            Command::Distribute { total } => self.distribute_flow_equally(*total),
            Command::DisableEdge { edge } => {
                let id = graph.edge_id(edge)?;
                self.disable_edge(id)
            }
            Command::EnableEdge { edge } => {
                let id = graph.edge_id(edge)?;
                self.enable_edge(id)
            }
            Command::Hold => Ok(CommandEffect::Held),
        }
    }

    /// Runs a named command and renders the `(ok, message)` reply. Rejected
    /// absolute assignments carry the path's safe-flow figures as a hint.
    pub fn apply(&mut self, command: &Command) -> CommandReply {
        let result = self.execute(command);
        let over_capacity = matches!(
            result,
            Err(CommandError::Validation(ValidationError::CapacityExceeded { .. }))
        );
        let hint = match command {
            Command::SetFlow { path, .. } if over_capacity => self
                .state
                .graph()
                .path_id(path)
                .ok()
                .and_then(|id| self.max_safe_flow(id).ok()),
            _ => None,
        };

        let mut reply = CommandReply::from(result);
        if let Some(safe) = hint {
            let bottleneck = self.state.graph().edge_by_id(safe.bottleneck.edge).name();
            reply.message.push_str(&format!(
                " (max safe flow {:.2}, available {:.2}, bottleneck {})",
                safe.max_safe, safe.available, bottleneck
            ));
        }
        reply
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::builder::GraphBuilder;
    use crate::graph::node::NodeKind;
    use approx::assert_relative_eq;
    use proptest::prelude::*;

    fn diamond() -> NetworkState {
        let mut builder = GraphBuilder::new();
        builder
            .add_node("s", NodeKind::Source)
            .add_node("a", NodeKind::Intermediate)
            .add_node("b", NodeKind::Intermediate)
            .add_node("t", NodeKind::Sink)
            .add_edge("e1", "s", "a", 8.0)
            .add_edge("e2", "s", "b", 6.0)
            .add_edge("e3", "a", "t", 7.0)
            .add_edge("e4", "b", "t", 9.0)
            .add_path("P1", ["e1", "e3"])
            .add_path("P2", ["e2", "e4"]);
        NetworkState::new(builder.build().unwrap())
    }

    //      ┌─e2→ a ─e4─┐
    //  s ─e1→ m        t      P1 = e1 e2 e4, P2 = e1 e3 e5, P3 = e6 e7
    //      └─e3→ b ─e5─┘
    //  s ─e6→ c ─e7→ t
    fn three_paths() -> NetworkState {
        let mut builder = GraphBuilder::new();
        builder
            .add_node("s", NodeKind::Source)
            .add_node("m", NodeKind::Intermediate)
            .add_node("a", NodeKind::Intermediate)
            .add_node("b", NodeKind::Intermediate)
            .add_node("c", NodeKind::Intermediate)
            .add_node("t", NodeKind::Sink)
            .add_edge("e1", "s", "m", 20.0)
            .add_edge("e2", "m", "a", 10.0)
            .add_edge("e3", "m", "b", 10.0)
            .add_edge("e4", "a", "t", 10.0)
            .add_edge("e5", "b", "t", 10.0)
            .add_edge("e6", "s", "c", 10.0)
            .add_edge("e7", "c", "t", 10.0)
            .add_path("P1", ["e1", "e2", "e4"])
            .add_path("P2", ["e6", "e7"])
            .add_path("P3", ["e1", "e3", "e5"]);
        NetworkState::new(builder.build().unwrap())
    }

    fn unchanged(state: &NetworkState) -> (Vec<f64>, Vec<crate::state::edge_state::EdgeState>) {
        (state.path_flows().to_vec(), state.edge_states().to_vec())
    }

    #[test]
    fn test_diamond_scenario() {
        let mut state = diamond();
        let mut controller = FlowController::new(&mut state);

        assert!(controller.set_path_flow(PathId(0), 7.0).is_ok());

        let err = controller.set_path_flow(PathId(0), 9.0).unwrap_err();
        match err {
            CommandError::Validation(ValidationError::CapacityExceeded { edge, overflow }) => {
                assert_eq!("e3", edge);
                assert_relative_eq!(2.0, overflow);
            }
            other => panic!("unexpected rejection {other:?}"),
        }
        assert_relative_eq!(7.0, controller.state().path_flow(PathId(0)));

        let effect = controller.saturate_path_flow(PathId(1)).unwrap();
        assert_eq!(
            CommandEffect::Saturated {
                path: "P2".to_string(),
                from: 0.0,
                to: 6.0,
                bottleneck: "e2".to_string()
            },
            effect
        );

        let effect = controller.disable_edge(EdgeId(2)).unwrap();
        assert_eq!(
            CommandEffect::EdgeDisabled {
                edge: "e3".to_string(),
                cleared: vec!["P1".to_string()]
            },
            effect
        );
        assert_relative_eq!(0.0, controller.state().path_flow(PathId(0)));
        assert_relative_eq!(6.0, controller.state().path_flow(PathId(1)));
    }

    #[test]
    fn test_rejected_commands_leave_state_untouched() {
        let mut state = three_paths();
        let mut controller = FlowController::new(&mut state);
        controller.set_path_flow(PathId(0), 6.0).unwrap();
        controller.set_path_flow(PathId(1), 3.0).unwrap();
        let before = unchanged(controller.state());

        assert!(controller.set_path_flow(PathId(2), 15.0).is_err());
        assert!(controller.update_path_flow(PathId(0), 5.0).is_err());
        assert!(controller.update_path_flow(PathId(1), -4.0).is_err());
        assert!(controller.distribute_flow_equally(33.0).is_err());
        assert!(controller.set_path_flow(PathId(0), f64::NAN).is_err());
        assert!(controller.set_path_flow(PathId(9), 1.0).is_err());

        assert_eq!(before, unchanged(controller.state()));
    }

    #[test]
    fn test_shared_edge_limits_sibling_paths() {
        let mut state = three_paths();
        let mut controller = FlowController::new(&mut state);
        controller.set_path_flow(PathId(0), 10.0).unwrap();
        controller.set_path_flow(PathId(2), 10.0).unwrap();

        // e1 now carries 20 of 20
        let err = controller.update_path_flow(PathId(2), 0.5).unwrap_err();
        assert!(matches!(
            err,
            CommandError::Validation(ValidationError::CapacityExceeded { ref edge, .. })
                if edge == "e1"
        ));
        assert_relative_eq!(20.0, controller.state().edge_state(EdgeId(0)).flow());
    }

    #[test]
    fn test_saturation_is_idempotent() {
        let mut state = diamond();
        let mut controller = FlowController::new(&mut state);

        let first = controller.saturate_path_flow(PathId(0)).unwrap();
        let flow = controller.state().path_flow(PathId(0));
        let second = controller.saturate_path_flow(PathId(0)).unwrap();

        assert!(matches!(first, CommandEffect::Saturated { .. }));
        assert_eq!(
            CommandEffect::AlreadySaturated {
                path: "P1".to_string(),
                flow: 7.0,
                bottleneck: "e3".to_string()
            },
            second
        );
        assert_eq!(flow, controller.state().path_flow(PathId(0)));
    }

    #[test]
    fn test_saturate_blocked_path_is_rejected() {
        let mut state = diamond();
        let mut controller = FlowController::new(&mut state);
        controller.disable_edge(EdgeId(0)).unwrap();

        assert_eq!(
            CommandError::Validation(ValidationError::PathBlocked {
                path: "P1".to_string(),
                edge: "e1".to_string()
            }),
            controller.saturate_path_flow(PathId(0)).unwrap_err()
        );
    }

    #[test]
    fn test_cascading_clear_touches_only_paths_through_edge() {
        let mut state = three_paths();
        let mut controller = FlowController::new(&mut state);
        controller.set_path_flow(PathId(0), 4.0).unwrap();
        controller.set_path_flow(PathId(1), 5.0).unwrap();
        controller.set_path_flow(PathId(2), 6.0).unwrap();

        let effect = controller.disable_edge(EdgeId(0)).unwrap();
        assert_eq!(
            CommandEffect::EdgeDisabled {
                edge: "e1".to_string(),
                cleared: vec!["P1".to_string(), "P3".to_string()]
            },
            effect
        );
        assert_relative_eq!(0.0, controller.state().path_flow(PathId(0)));
        assert_relative_eq!(5.0, controller.state().path_flow(PathId(1)));
        assert_relative_eq!(0.0, controller.state().path_flow(PathId(2)));
    }

    #[test]
    fn test_disable_and_enable_round_trip() {
        let mut state = diamond();
        let mut controller = FlowController::new(&mut state);

        controller.disable_edge(EdgeId(1)).unwrap();
        assert_eq!(
            CommandError::Validation(ValidationError::EdgeAlreadyDisabled("e2".to_string())),
            controller.disable_edge(EdgeId(1)).unwrap_err()
        );
        assert!(controller.set_path_flow(PathId(1), 1.0).is_err());

        let effect = controller.enable_edge(EdgeId(1)).unwrap();
        assert_eq!(
            CommandEffect::EdgeEnabled {
                edge: "e2".to_string(),
                capacity: 6.0
            },
            effect
        );
        assert_eq!(
            CommandError::Validation(ValidationError::EdgeAlreadyEnabled("e2".to_string())),
            controller.enable_edge(EdgeId(1)).unwrap_err()
        );
        assert!(controller.set_path_flow(PathId(1), 1.0).is_ok());
    }

    #[test]
    fn test_distribute_is_all_or_nothing() {
        let mut state = diamond();
        let mut controller = FlowController::new(&mut state);

        assert_eq!(
            CommandEffect::Distributed {
                per_path: 5.0,
                paths: 2
            },
            controller.distribute_flow_equally(10.0).unwrap()
        );
        assert_relative_eq!(10.0, controller.state().total_throughput());

        // 7 per path fits P1 but not P2 (e2 = 6); nothing may change
        let err = controller.distribute_flow_equally(14.0).unwrap_err();
        assert!(matches!(
            err,
            CommandError::Validation(ValidationError::CapacityExceeded { ref edge, .. })
                if edge == "e2"
        ));
        assert_relative_eq!(5.0, controller.state().path_flow(PathId(0)));
        assert_relative_eq!(5.0, controller.state().path_flow(PathId(1)));
    }

    #[test]
    fn test_path_and_edge_info() {
        let mut state = diamond();
        let mut controller = FlowController::new(&mut state);
        controller.set_path_flow(PathId(0), 6.0).unwrap();

        let info = controller.path_info(PathId(0)).unwrap();
        assert_relative_eq!(6.0, info.current_flow);
        assert_relative_eq!(7.0, info.bottleneck.capacity);
        assert_eq!(EdgeId(2), info.bottleneck.edge);
        assert_relative_eq!(600.0 / 7.0, info.utilization);
        assert_eq!(crate::state::snapshot::PathStatus::High, info.status);

        let info = controller.edge_info(EdgeId(2)).unwrap();
        assert_relative_eq!(7.0, info.capacity);
        assert_relative_eq!(6.0, info.flow);
        assert_relative_eq!(1.0, info.residual);
        assert!(!info.failed);
        assert_eq!(vec![PathId(0)], info.bottleneck_for);

        assert!(controller.path_info(PathId(5)).is_err());
        assert!(controller.edge_info(EdgeId(5)).is_err());
    }

    #[test]
    fn test_best_path_criteria() {
        let mut state = diamond();
        let mut controller = FlowController::new(&mut state);
        assert_eq!(Some(PathId(0)), controller.best_path(PathCriterion::Capacity));

        controller.set_path_flow(PathId(0), 7.0).unwrap();
        assert_eq!(Some(PathId(1)), controller.best_path(PathCriterion::Utilization));
        assert_eq!(Some(PathId(1)), controller.best_path(PathCriterion::Flow));
    }

    #[test]
    fn test_apply_resolves_names_and_hints() {
        let mut state = diamond();
        let mut controller = FlowController::new(&mut state);

        let reply = controller.apply(&Command::SetFlow {
            path: "P1".to_string(),
            flow: 9.0,
        });
        assert!(!reply.ok);
        assert!(reply.message.starts_with("edge e3 would exceed capacity by 2.00"));
        assert!(reply.message.contains("max safe flow 7.00"));

        let reply = controller.apply(&Command::Saturate {
            path: "P7".to_string(),
        });
        assert_eq!(CommandReply::rejected("path P7 not found"), reply);

        let reply = controller.apply(&Command::DisableEdge {
            edge: "e4".to_string(),
        });
        assert!(reply.ok);
        assert!(controller.validate_and_report().is_valid());
    }

    #[derive(Clone, Debug)]
    enum Op {
        Set(usize, f64),
        Update(usize, f64),
        Saturate(usize),
        Distribute(f64),
        Disable(usize),
        Enable(usize),
        Clear,
    }

    fn op() -> impl Strategy<Value = Op> {
        prop_oneof![
            (0..3usize, 0.0..25.0f64).prop_map(|(p, f)| Op::Set(p, f)),
            (0..3usize, -10.0..10.0f64).prop_map(|(p, d)| Op::Update(p, d)),
            (0..3usize).prop_map(Op::Saturate),
            (0.0..40.0f64).prop_map(Op::Distribute),
            (0..7usize).prop_map(Op::Disable),
            (0..7usize).prop_map(Op::Enable),
            Just(Op::Clear),
        ]
    }

    proptest! {
        #[test]
        fn test_invariants_hold_for_any_command_sequence(
            ops in prop::collection::vec(op(), 1..60)
        ) {
            let mut state = three_paths();
            let mut controller = FlowController::new(&mut state);

            for op in ops {
                let before = unchanged(controller.state());
                let result = match op {
                    Op::Set(p, f) => controller.set_path_flow(PathId(p), f),
                    Op::Update(p, d) => controller.update_path_flow(PathId(p), d),
                    Op::Saturate(p) => controller.saturate_path_flow(PathId(p)),
                    Op::Distribute(t) => controller.distribute_flow_equally(t),
                    Op::Disable(e) => controller.disable_edge(EdgeId(e)),
                    Op::Enable(e) => controller.enable_edge(EdgeId(e)),
                    Op::Clear => controller.clear_all_flows(),
                };

                prop_assert!(controller.state().check_invariants().is_ok());
                if result.is_err() {
                    prop_assert_eq!(&before, &unchanged(controller.state()));
                }
                for s in controller.state().edge_states() {
                    prop_assert!(s.flow() >= -FLOW_EPSILON);
                    if s.is_failed() {
                        prop_assert!(s.flow() <= FLOW_EPSILON);
                    }
                }
            }
        }
    }
}
