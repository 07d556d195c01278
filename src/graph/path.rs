use crate::graph::edge::EdgeId;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PathId(pub usize);

impl PathId {
    pub fn index(self) -> usize {
        self.0
    }
}

pub struct Path {
    id: PathId,
    name: String,
    edges: Vec<EdgeId>,
}

impl Path {
    pub fn new(id: PathId, name: impl Into<String>, edges: Vec<EdgeId>) -> Self {
        Self {
            id,
            name: name.into(),
            edges,
        }
    }

    pub fn id(&self) -> PathId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn edges(&self) -> &[EdgeId] {
        &self.edges
    }

    pub fn uses(&self, edge: EdgeId) -> bool {
        self.edges.contains(&edge)
    }

    pub fn shares_edge_with(&self, other: &Path) -> bool {
        self.edges.iter().any(|e| other.uses(*e))
    }
}
