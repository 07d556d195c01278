use crate::graph::node::NodeId;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EdgeId(pub usize);

impl EdgeId {
    pub fn index(self) -> usize {
        self.0
    }
}

pub struct Edge {
    id: EdgeId,
    name: String,
    from: NodeId,
    to: NodeId,
    /// base_capacity >= 0.0, also the ceiling of the capacity random walk
    base_capacity: f64,
}

impl Edge {
    pub fn new(
        id: EdgeId,
        name: impl Into<String>,
        from: NodeId,
        to: NodeId,
        base_capacity: f64,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            from,
            to,
            base_capacity,
        }
    }

    pub fn id(&self) -> EdgeId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn from(&self) -> NodeId {
        self.from
    }

    pub fn to(&self) -> NodeId {
        self.to
    }

    pub fn base_capacity(&self) -> f64 {
        self.base_capacity
    }
}
