use crate::graph::edge::EdgeId;
use crate::graph::graph::Graph;
use crate::graph::path::PathId;

#[derive(Clone, Debug, PartialEq)]
pub enum NetworkEvent {
    Failure { edge: EdgeId, capacity_lost: f64 },
    Recovery { edge: EdgeId, capacity: f64 },
    /// Capacity drifted below committed flow; `excess` was shed.
    Overload { edge: EdgeId, excess: f64 },
}

impl NetworkEvent {
    pub fn edge(&self) -> EdgeId {
        match self {
            NetworkEvent::Failure { edge, .. }
            | NetworkEvent::Recovery { edge, .. }
            | NetworkEvent::Overload { edge, .. } => *edge,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct FlowClear {
    pub edge: EdgeId,
    pub paths: Vec<PathId>,
}

impl FlowClear {
    pub fn describe(&self, graph: &Graph) -> String {
        let paths = self
            .paths
            .iter()
            .map(|p| graph.path_by_id(*p).name())
            .collect::<Vec<&str>>()
            .join(", ");
        format!("{} failed, cleared {}", graph.edge_by_id(self.edge).name(), paths)
    }
}
