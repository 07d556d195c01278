use crate::error::{DefinitionError, NotFoundError};
use crate::graph::edge::{Edge, EdgeId};
use crate::graph::node::{Node, NodeId, NodeKind};
use crate::graph::path::{Path, PathId};
use std::collections::{HashMap, HashSet};

pub struct Graph {
    nodes: Vec<Node>,
    edges: Vec<Edge>,
    paths: Vec<Path>,
    source: NodeId,
    sink: NodeId,
    edge_paths: Vec<Vec<PathId>>,
    node_index: HashMap<String, NodeId>,
    edge_index: HashMap<String, EdgeId>,
    path_index: HashMap<String, PathId>,
}

impl Graph {
    /// Callers guarantee ids are dense, endpoints exist and exactly one
    /// source and sink are present; the builder checks all of it.
    pub(crate) fn new(
        mut nodes: Vec<Node>,
        edges: Vec<Edge>,
        source: NodeId,
        sink: NodeId,
    ) -> Self {
        edges.iter().for_each(|e| {
            nodes[e.from().index()].attach_outgoing(e.id());
            nodes[e.to().index()].attach_incoming(e.id());
        });
        let node_index = nodes
            .iter()
            .map(|n| (n.name().to_string(), n.id()))
            .collect();
        let edge_index = edges
            .iter()
            .map(|e| (e.name().to_string(), e.id()))
            .collect();
        let edge_paths = vec![Vec::new(); edges.len()];
        Self {
            nodes,
            edges,
            paths: Vec::new(),
            source,
            sink,
            edge_paths,
            node_index,
            edge_index,
            path_index: HashMap::new(),
        }
    }

    pub fn with_paths(self, routes: Vec<Vec<EdgeId>>) -> Result<Self, DefinitionError> {
        let named = routes
            .into_iter()
            .enumerate()
            .map(|(i, edges)| (format!("P{}", i + 1), edges))
            .collect();
        self.with_named_paths(named)
    }

    pub(crate) fn with_named_paths(
        mut self,
        routes: Vec<(String, Vec<EdgeId>)>,
    ) -> Result<Self, DefinitionError> {
        if routes.is_empty() {
            return Err(DefinitionError::NoPaths);
        }
        let mut paths = Vec::with_capacity(routes.len());
        let mut path_index = HashMap::new();
        for (i, (name, edges)) in routes.into_iter().enumerate() {
            self.check_route(&name, &edges)?;
            if path_index.insert(name.clone(), PathId(i)).is_some() {
                return Err(DefinitionError::DuplicatePath(name));
            }
            paths.push(Path::new(PathId(i), name, edges));
        }

        let mut edge_paths = vec![Vec::new(); self.edges.len()];
        paths.iter().for_each(|p| {
            p.edges()
                .iter()
                .for_each(|e| edge_paths[e.index()].push(p.id()))
        });

        self.paths = paths;
        self.path_index = path_index;
        self.edge_paths = edge_paths;
        Ok(self)
    }

    fn check_route(&self, name: &str, edges: &[EdgeId]) -> Result<(), DefinitionError> {
        let malformed = |reason: &str| DefinitionError::MalformedPath {
            path: name.to_string(),
            reason: reason.to_string(),
        };
        if edges.is_empty() {
            return Err(malformed("empty edge sequence"));
        }
        if let Some(e) = edges.iter().find(|e| e.index() >= self.edges.len()) {
            return Err(DefinitionError::UnknownPathEdge {
                path: name.to_string(),
                edge: format!("#{}", e.index()),
            });
        }

        let mut at = self.source;
        let mut visited = HashSet::from([at]);
        for e in edges {
            let edge = self.edge_by_id(*e);
            if edge.from() != at {
                return Err(malformed(&format!(
                    "edge {} does not continue from node {}",
                    edge.name(),
                    self.node_by_id(at).name()
                )));
            }
            at = edge.to();
            if !visited.insert(at) {
                return Err(malformed(&format!(
                    "node {} is visited twice",
                    self.node_by_id(at).name()
                )));
            }
        }
        if at != self.sink {
            return Err(malformed("does not end at the sink"));
        }
        Ok(())
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn paths(&self) -> &[Path] {
        &self.paths
    }

    pub fn node_by_id(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    pub fn edge_by_id(&self, id: EdgeId) -> &Edge {
        &self.edges[id.index()]
    }

    pub fn path_by_id(&self, id: PathId) -> &Path {
        &self.paths[id.index()]
    }

    pub fn outgoing(&self, id: NodeId) -> &[EdgeId] {
        self.nodes[id.index()].outgoing()
    }

    pub fn incoming(&self, id: NodeId) -> &[EdgeId] {
        self.nodes[id.index()].incoming()
    }

    pub fn paths_through(&self, edge: EdgeId) -> &[PathId] {
        &self.edge_paths[edge.index()]
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn path_count(&self) -> usize {
        self.paths.len()
    }

    pub fn source(&self) -> NodeId {
        self.source
    }

    pub fn sink(&self) -> NodeId {
        self.sink
    }

    pub fn intermediates(&self) -> impl Iterator<Item = &Node> {
        self.nodes
            .iter()
            .filter(|n| n.kind() == NodeKind::Intermediate)
    }

    pub fn node_id(&self, name: &str) -> Result<NodeId, NotFoundError> {
        self.node_index
            .get(name)
            .copied()
            .ok_or_else(|| NotFoundError::Node(name.to_string()))
    }

    pub fn edge_id(&self, name: &str) -> Result<EdgeId, NotFoundError> {
        self.edge_index
            .get(name)
            .copied()
            .ok_or_else(|| NotFoundError::Edge(name.to_string()))
    }

    pub fn path_id(&self, name: &str) -> Result<PathId, NotFoundError> {
        self.path_index
            .get(name)
            .copied()
            .ok_or_else(|| NotFoundError::Path(name.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::builder::GraphBuilder;

    fn diamond() -> Graph {
        let mut builder = GraphBuilder::new();
        builder
            .add_node("s", NodeKind::Source)
            .add_node("a", NodeKind::Intermediate)
            .add_node("b", NodeKind::Intermediate)
            .add_node("t", NodeKind::Sink)
            .add_edge("e1", "s", "a", 8.0)
            .add_edge("e2", "s", "b", 6.0)
            .add_edge("e3", "a", "t", 7.0)
            .add_edge("e4", "b", "t", 9.0);
        builder.build().unwrap()
    }

    #[test]
    fn test_adjacency_is_wired_both_ways() {
        let graph = diamond();
        let a = graph.node_id("a").unwrap();

        assert_eq!(graph.incoming(a), &[EdgeId(0)]);
        assert_eq!(graph.outgoing(a), &[EdgeId(2)]);
        assert_eq!(graph.outgoing(graph.source()).len(), 2);
        assert_eq!(graph.incoming(graph.sink()).len(), 2);
        assert_eq!(graph.intermediates().count(), 2);
    }

    #[test]
    fn test_with_paths_indexes_edges_to_paths() {
        let graph = diamond()
            .with_paths(vec![vec![EdgeId(0), EdgeId(2)], vec![EdgeId(1), EdgeId(3)]])
            .unwrap();

        assert_eq!(graph.path_id("P2").unwrap(), PathId(1));
        assert_eq!(graph.paths_through(EdgeId(2)), &[PathId(0)]);
        assert_eq!(graph.paths_through(EdgeId(3)), &[PathId(1)]);
    }

    #[test]
    fn test_with_paths_rejects_broken_routes() {
        let err = diamond()
            .with_paths(vec![vec![EdgeId(0), EdgeId(3)]])
            .err()
            .unwrap();
        assert!(matches!(err, DefinitionError::MalformedPath { .. }));

        let err = diamond().with_paths(vec![vec![EdgeId(0)]]).err().unwrap();
        assert!(matches!(err, DefinitionError::MalformedPath { .. }));

        let err = diamond().with_paths(Vec::new()).err().unwrap();
        assert_eq!(err, DefinitionError::NoPaths);
    }

    #[test]
    fn test_lookup_by_name_reports_missing_ids() {
        let graph = diamond();
        assert_eq!(graph.edge_id("e4").unwrap(), EdgeId(3));
        assert_eq!(
            graph.edge_id("e9").unwrap_err(),
            NotFoundError::Edge("e9".to_string())
        );
        assert_eq!(
            graph.path_id("P1").unwrap_err(),
            NotFoundError::Path("P1".to_string())
        );
    }
}
