use crate::graph::edge::EdgeId;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NodeKind {
    Source,
    Intermediate,
    Sink,
}

impl NodeKind {
    pub fn parse(kind: &str) -> Option<Self> {
        match kind {
            "source" => Some(NodeKind::Source),
            "intermediate" => Some(NodeKind::Intermediate),
            "sink" => Some(NodeKind::Sink),
            _ => None,
        }
    }
}

pub struct Node {
    id: NodeId,
    name: String,
    kind: NodeKind,
    incoming: Vec<EdgeId>,
    outgoing: Vec<EdgeId>,
}

impl Node {
    pub fn new(id: NodeId, name: impl Into<String>, kind: NodeKind) -> Self {
        Self {
            id,
            name: name.into(),
            kind,
            incoming: Vec::new(),
            outgoing: Vec::new(),
        }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    pub fn incoming(&self) -> &[EdgeId] {
        &self.incoming
    }

    pub fn outgoing(&self) -> &[EdgeId] {
        &self.outgoing
    }

    pub(crate) fn attach_incoming(&mut self, edge: EdgeId) {
        self.incoming.push(edge);
    }

    pub(crate) fn attach_outgoing(&mut self, edge: EdgeId) {
        self.outgoing.push(edge);
    }
}
