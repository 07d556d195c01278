use crate::control::command::{Command, CommandReply};
use crate::control::controller::{Controller, GreedyController};
use crate::graph::path::PathId;
use crate::simulation::engine::SimulationEngine;

pub struct App {
    pub engine: SimulationEngine,
    pub running: bool,
    selected: usize,
    reply: Option<CommandReply>,
    greedy: GreedyController,
}

impl App {
    pub fn new(engine: SimulationEngine) -> Self {
        Self {
            engine,
            running: true,
            selected: 0,
            reply: None,
            greedy: GreedyController::new(),
        }
    }

    pub fn selected(&self) -> PathId {
        PathId(self.selected)
    }

    pub fn reply(&self) -> Option<&CommandReply> {
        self.reply.as_ref()
    }

    pub fn select_next(&mut self) {
        let count = self.engine.graph().path_count();
        self.selected = (self.selected + 1) % count;
    }

    pub fn select_prev(&mut self) {
        let count = self.engine.graph().path_count();
        self.selected = (self.selected + count - 1) % count;
    }

    fn selected_name(&self) -> String {
        self.engine.graph().path_by_id(self.selected()).name().to_string()
    }

    fn apply(&mut self, command: Command) {
        self.reply = Some(self.engine.controller().apply(&command));
    }

    pub fn step(&mut self) {
        match self.engine.step() {
            Ok(_) => {}
            Err(e) => self.reply = Some(CommandReply::rejected(e.to_string())),
        }
    }

    pub fn saturate_selected(&mut self) {
        let path = self.selected_name();
        self.apply(Command::Saturate { path });
    }

    pub fn adjust_selected(&mut self, delta: f64) {
        let path = self.selected_name();
        self.apply(Command::UpdateFlow { path, delta });
    }

    pub fn clear_all(&mut self) {
        self.apply(Command::ClearAll);
    }

    pub fn disable_selected_bottleneck(&mut self) {
        let bottleneck = self.engine.state().bottleneck(self.selected());
        let edge = self.engine.graph().edge_by_id(bottleneck.edge).name().to_string();
        self.apply(Command::DisableEdge { edge });
    }

    pub fn enable_selected_edges(&mut self) {
        let failed = self
            .engine
            .graph()
            .path_by_id(self.selected())
            .edges()
            .iter()
            .filter(|e| self.engine.state().edge_state(**e).is_failed())
            .map(|e| self.engine.graph().edge_by_id(*e).name().to_string())
            .collect::<Vec<String>>();

        if failed.is_empty() {
            self.reply = Some(CommandReply::rejected(format!(
                "no failed edges on path {}",
                self.selected_name()
            )));
            return;
        }
        let replies = failed
            .into_iter()
            .map(|edge| self.engine.controller().apply(&Command::EnableEdge { edge }))
            .collect::<Vec<CommandReply>>();
        self.reply = Some(CommandReply {
            ok: replies.iter().all(|r| r.ok),
            message: replies
                .iter()
                .map(|r| r.message.as_str())
                .collect::<Vec<&str>>()
                .join("; "),
        });
    }

    pub fn greedy_act(&mut self) {
        let command = self.greedy.decide(&self.engine.full_state_snapshot());
        self.apply(command);
    }
}

impl Drop for App {
    fn drop(&mut self) {
        ratatui::restore();
    }
}
