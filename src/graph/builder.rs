use crate::error::DefinitionError;
use crate::graph::edge::{Edge, EdgeId};
use crate::graph::graph::Graph;
use crate::graph::node::{Node, NodeId, NodeKind};
use std::collections::{HashMap, HashSet, VecDeque};

struct EdgeDef {
    name: String,
    from: String,
    to: String,
    capacity: f64,
}

#[derive(Default)]
pub struct GraphBuilder {
    nodes: Vec<(String, NodeKind)>,
    bad_kinds: Vec<(String, String)>,
    edges: Vec<EdgeDef>,
    paths: Vec<(String, Vec<String>)>,
}

impl GraphBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_node(&mut self, name: impl Into<String>, kind: NodeKind) -> &mut Self {
        self.nodes.push((name.into(), kind));
        self
    }

    pub fn add_node_kind(&mut self, name: impl Into<String>, kind: &str) -> &mut Self {
        let name = name.into();
        match NodeKind::parse(kind) {
            Some(kind) => self.nodes.push((name, kind)),
            None => self.bad_kinds.push((name, kind.to_string())),
        }
        self
    }

    pub fn add_edge(
        &mut self,
        name: impl Into<String>,
        from: impl Into<String>,
        to: impl Into<String>,
        capacity: f64,
    ) -> &mut Self {
        self.edges.push(EdgeDef {
            name: name.into(),
            from: from.into(),
            to: to.into(),
            capacity,
        });
        self
    }

    /// Predefines a path by edge names. A builder with no predefined paths
    /// produces a graph whose path set is filled in by enumeration.
    pub fn add_path<S: Into<String>>(
        &mut self,
        name: impl Into<String>,
        edges: impl IntoIterator<Item = S>,
    ) -> &mut Self {
        self.paths
            .push((name.into(), edges.into_iter().map(Into::into).collect()));
        self
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn validate(&self) -> Result<(), DefinitionError> {
        if let Some((node, kind)) = self.bad_kinds.first() {
            return Err(DefinitionError::UnknownNodeKind {
                node: node.clone(),
                kind: kind.clone(),
            });
        }

        let mut seen = HashSet::new();
        if let Some((name, _)) = self.nodes.iter().find(|(n, _)| !seen.insert(n.as_str())) {
            return Err(DefinitionError::DuplicateNode(name.clone()));
        }
        let mut seen = HashSet::new();
        if let Some(e) = self.edges.iter().find(|e| !seen.insert(e.name.as_str())) {
            return Err(DefinitionError::DuplicateEdge(e.name.clone()));
        }
        let mut seen = HashSet::new();
        if let Some((name, _)) = self.paths.iter().find(|(n, _)| !seen.insert(n.as_str())) {
            return Err(DefinitionError::DuplicatePath(name.clone()));
        }

        let count = |kind| self.nodes.iter().filter(|(_, k)| *k == kind).count();
        match count(NodeKind::Source) {
            1 => {}
            found => return Err(DefinitionError::SourceCount { found }),
        }
        match count(NodeKind::Sink) {
            1 => {}
            found => return Err(DefinitionError::SinkCount { found }),
        }

        let index = self.node_index();
        for e in &self.edges {
            for endpoint in [&e.from, &e.to] {
                if !index.contains_key(endpoint.as_str()) {
                    return Err(DefinitionError::UnknownEndpoint {
                        edge: e.name.clone(),
                        node: endpoint.clone(),
                    });
                }
            }
            if !e.capacity.is_finite() || e.capacity < 0.0 {
                return Err(DefinitionError::InvalidCapacity {
                    edge: e.name.clone(),
                    capacity: e.capacity,
                });
            }
        }

        let edge_names: HashSet<&str> = self.edges.iter().map(|e| e.name.as_str()).collect();
        for (path, edges) in &self.paths {
            if let Some(edge) = edges.iter().find(|e| !edge_names.contains(e.as_str())) {
                return Err(DefinitionError::UnknownPathEdge {
                    path: path.clone(),
                    edge: edge.clone(),
                });
            }
        }

        self.check_reachability(&index)
    }

    fn node_index(&self) -> HashMap<&str, usize> {
        self.nodes
            .iter()
            .enumerate()
            .map(|(i, (name, _))| (name.as_str(), i))
            .collect()
    }

    fn check_reachability(&self, index: &HashMap<&str, usize>) -> Result<(), DefinitionError> {
        let n = self.nodes.len();
        let mut forward = vec![Vec::new(); n];
        let mut backward = vec![Vec::new(); n];
        self.edges.iter().for_each(|e| {
            let (f, t) = (index[e.from.as_str()], index[e.to.as_str()]);
            forward[f].push(t);
            backward[t].push(f);
        });

        let position = |kind| self.nodes.iter().position(|(_, k)| *k == kind);
        let (Some(source), Some(sink)) = (position(NodeKind::Source), position(NodeKind::Sink))
        else {
            return Err(DefinitionError::SourceCount { found: 0 });
        };

        let from_source = reach(&forward, source);
        if let Some(i) = (0..n).find(|i| !from_source[*i]) {
            return Err(DefinitionError::UnreachableFromSource(self.nodes[i].0.clone()));
        }
        let to_sink = reach(&backward, sink);
        if let Some(i) = (0..n).find(|i| !to_sink[*i]) {
            return Err(DefinitionError::CannotReachSink(self.nodes[i].0.clone()));
        }
        Ok(())
    }

    pub fn build(self) -> Result<Graph, DefinitionError> {
        self.validate()?;

        let index = self.node_index();
        let edges = self
            .edges
            .iter()
            .enumerate()
            .map(|(i, e)| {
                Edge::new(
                    EdgeId(i),
                    e.name.clone(),
                    NodeId(index[e.from.as_str()]),
                    NodeId(index[e.to.as_str()]),
                    e.capacity,
                )
            })
            .collect::<Vec<Edge>>();
        let edge_index: HashMap<&str, EdgeId> = self
            .edges
            .iter()
            .enumerate()
            .map(|(i, e)| (e.name.as_str(), EdgeId(i)))
            .collect();
        let routes = self
            .paths
            .iter()
            .map(|(name, edges)| {
                (
                    name.clone(),
                    edges.iter().map(|e| edge_index[e.as_str()]).collect(),
                )
            })
            .collect::<Vec<(String, Vec<EdgeId>)>>();

        let mut source = NodeId(0);
        let mut sink = NodeId(0);
        let nodes = self
            .nodes
            .iter()
            .enumerate()
            .map(|(i, (name, kind))| {
                match kind {
                    NodeKind::Source => source = NodeId(i),
                    NodeKind::Sink => sink = NodeId(i),
                    NodeKind::Intermediate => {}
                }
                Node::new(NodeId(i), name.clone(), *kind)
            })
            .collect();

        let graph = Graph::new(nodes, edges, source, sink);
        if routes.is_empty() {
            Ok(graph)
        } else {
            graph.with_named_paths(routes)
        }
    }
}

fn reach(adj: &[Vec<usize>], start: usize) -> Vec<bool> {
    let mut seen = vec![false; adj.len()];
    let mut queue = VecDeque::from([start]);
    seen[start] = true;
    while let Some(at) = queue.pop_front() {
        for next in &adj[at] {
            if !seen[*next] {
                seen[*next] = true;
                queue.push_back(*next);
            }
        }
    }
    seen
}

#[cfg(test)]
mod tests {
    use super::*;

    fn diamond() -> GraphBuilder {
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
        builder
    }

    #[test]
    fn test_valid_definition_builds() {
        let mut builder = diamond();
        builder.add_path("P1", ["e1", "e3"]).add_path("P2", ["e2", "e4"]);
        let graph = builder.build().unwrap();

        assert_eq!(graph.node_count(), 4);
        assert_eq!(graph.edge_count(), 4);
        assert_eq!(graph.path_count(), 2);
        assert_eq!(graph.node_by_id(graph.source()).name(), "s");
        assert_eq!(graph.node_by_id(graph.sink()).name(), "t");
    }

    #[test]
    fn test_second_source_is_rejected() {
        let mut builder = diamond();
        builder.add_node("s2", NodeKind::Source).add_edge("e5", "s2", "a", 1.0);
        assert_eq!(
            builder.validate(),
            Err(DefinitionError::SourceCount { found: 2 })
        );
    }

    #[test]
    fn test_missing_sink_is_rejected() {
        let mut builder = GraphBuilder::new();
        builder
            .add_node("s", NodeKind::Source)
            .add_node("a", NodeKind::Intermediate)
            .add_edge("e1", "s", "a", 1.0);
        assert_eq!(
            builder.validate(),
            Err(DefinitionError::SinkCount { found: 0 })
        );
    }

    #[test]
    fn test_duplicate_ids_are_rejected() {
        let mut builder = diamond();
        builder.add_node("a", NodeKind::Intermediate);
        assert_eq!(
            builder.validate(),
            Err(DefinitionError::DuplicateNode("a".to_string()))
        );

        let mut builder = diamond();
        builder.add_edge("e1", "a", "b", 1.0);
        assert_eq!(
            builder.validate(),
            Err(DefinitionError::DuplicateEdge("e1".to_string()))
        );
    }

    #[test]
    fn test_disconnected_nodes_are_rejected() {
        let mut builder = diamond();
        builder.add_node("island", NodeKind::Intermediate);
        assert_eq!(
            builder.validate(),
            Err(DefinitionError::UnreachableFromSource("island".to_string()))
        );

        let mut builder = diamond();
        builder
            .add_node("dead_end", NodeKind::Intermediate)
            .add_edge("e5", "a", "dead_end", 3.0);
        assert_eq!(
            builder.validate(),
            Err(DefinitionError::CannotReachSink("dead_end".to_string()))
        );
    }

    #[test]
    fn test_bad_edges_and_kinds_are_rejected() {
        let mut builder = diamond();
        builder.add_edge("e5", "a", "nowhere", 1.0);
        assert!(matches!(
            builder.validate(),
            Err(DefinitionError::UnknownEndpoint { .. })
        ));

        let mut builder = diamond();
        builder.add_edge("e5", "a", "b", -1.0);
        assert!(matches!(
            builder.validate(),
            Err(DefinitionError::InvalidCapacity { .. })
        ));

        let mut builder = diamond();
        builder.add_node_kind("c", "relay");
        assert!(matches!(
            builder.validate(),
            Err(DefinitionError::UnknownNodeKind { .. })
        ));
    }

    #[test]
    fn test_predefined_path_must_be_contiguous() {
        let mut builder = diamond();
        builder.add_path("P1", ["e1", "e4"]);
        assert!(matches!(
            builder.build().err().unwrap(),
            DefinitionError::MalformedPath { .. }
        ));

        let mut builder = diamond();
        builder.add_path("P1", ["e1", "e7"]);
        assert!(matches!(
            builder.build().err().unwrap(),
            DefinitionError::UnknownPathEdge { .. }
        ));
    }
}
