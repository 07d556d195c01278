use crate::config::EnumerationConfig;
use crate::graph::edge::EdgeId;
use crate::graph::graph::Graph;
use crate::graph::node::NodeId;
use rand::Rng;
use rand::seq::SliceRandom;
use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashSet};
use std::time::Instant;
use tracing::{debug, info, warn};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Strategy {
    Complete,
    Smart,
    Sample,
}

#[derive(Debug)]
pub struct Enumeration {
    routes: Vec<Vec<EdgeId>>,
    strategy: Strategy,
    complete: bool,
}

impl Enumeration {
    pub fn routes(&self) -> &[Vec<EdgeId>] {
        &self.routes
    }

    pub fn into_routes(self) -> Vec<Vec<EdgeId>> {
        self.routes
    }

    pub fn strategy(&self) -> Strategy {
        self.strategy
    }

    pub fn is_complete(&self) -> bool {
        self.complete
    }
}

#[derive(Debug, PartialEq)]
enum Cutoff {
    Paths,
    Time,
}

pub struct PathEnumerator<'a> {
    graph: &'a Graph,
    config: &'a EnumerationConfig,
}

impl<'a> PathEnumerator<'a> {
    pub fn new(graph: &'a Graph, config: &'a EnumerationConfig) -> Self {
        Self { graph, config }
    }

    pub fn select_strategy(&self) -> Strategy {
        match self.graph.node_count() {
            n if n <= self.config.complete_max_nodes => Strategy::Complete,
            n if n <= self.config.smart_max_nodes => Strategy::Smart,
            _ => Strategy::Sample,
        }
    }

    pub fn enumerate<R: Rng>(&self, rng: &mut R) -> Enumeration {
        self.enumerate_with(self.select_strategy(), rng)
    }

    pub fn enumerate_with<R: Rng>(&self, strategy: Strategy, rng: &mut R) -> Enumeration {
        let started = Instant::now();
        let (routes, strategy, complete) = match strategy {
            Strategy::Complete => match self.complete() {
                Ok(routes) => (routes, Strategy::Complete, true),
                Err(cutoff) => {
                    warn!(
                        ?cutoff,
                        max_paths = self.config.max_paths,
                        "complete enumeration cut off, falling back to sampling"
                    );
                    let target = self.config.target_paths.min(self.config.max_paths);
                    (self.sample(target, rng), Strategy::Sample, false)
                }
            },
            Strategy::Smart => (self.smart(self.config.target_paths), Strategy::Smart, false),
            Strategy::Sample => (
                self.sample(self.config.target_paths, rng),
                Strategy::Sample,
                false,
            ),
        };

        let elapsed = started.elapsed();
        info!(
            ?strategy,
            paths = routes.len(),
            nodes = self.graph.node_count(),
            edges = self.graph.edge_count(),
            elapsed_ms = elapsed.as_millis() as u64,
            "path set selected"
        );
        Enumeration {
            routes,
            strategy,
            complete,
        }
    }

    /// Depth-first enumeration of all simple paths. Fails once more than
    /// `max_paths` paths exist or `max_time` has passed.
    fn complete(&self) -> Result<Vec<Vec<EdgeId>>, Cutoff> {
        let started = Instant::now();
        let source = self.graph.source();
        let sink = self.graph.sink();
        let mut on_route = vec![false; self.graph.node_count()];
        on_route[source.index()] = true;

        let mut routes = Vec::new();
        let mut route: Vec<EdgeId> = Vec::new();
        let mut stack: Vec<(NodeId, usize)> = vec![(source, 0)];
        let mut steps = 0usize;

        while let Some(top) = stack.last_mut() {
            let (node, next) = *top;
            top.1 += 1;

            steps += 1;
            if steps % 1024 == 0 && started.elapsed() > self.config.max_time {
                return Err(Cutoff::Time);
            }

            let outgoing = self.graph.outgoing(node);
            if next >= outgoing.len() {
                stack.pop();
                on_route[node.index()] = false;
                route.pop();
                continue;
            }

            let edge = outgoing[next];
            let to = self.graph.edge_by_id(edge).to();
            if on_route[to.index()] {
                continue;
            }
            if to == sink {
                if routes.len() == self.config.max_paths {
                    return Err(Cutoff::Paths);
                }
                let mut found = route.clone();
                found.push(edge);
                routes.push(found);
                continue;
            }
            on_route[to.index()] = true;
            route.push(edge);
            stack.push((to, 0));
        }

        debug!(paths = routes.len(), steps, "complete enumeration finished");
        Ok(routes)
    }

    /// Repeatedly takes the cheapest route where every edge already used by
    /// a chosen route costs as much as a detour through the whole graph.
    fn smart(&self, target: usize) -> Vec<Vec<EdgeId>> {
        let mut usage = vec![0u64; self.graph.edge_count()];
        let mut seen = HashSet::new();
        let mut routes = Vec::new();

        for _ in 0..target.saturating_mul(4) {
            if routes.len() >= target {
                break;
            }
            let Some(route) = self.cheapest_route(&usage) else {
                break;
            };
            route.iter().for_each(|e| usage[e.index()] += 1);
            if seen.insert(route.clone()) {
                routes.push(route);
            }
        }
        routes
    }

    fn cheapest_route(&self, usage: &[u64]) -> Option<Vec<EdgeId>> {
        let n = self.graph.node_count();
        let penalty = n as u64;
        let source = self.graph.source();
        let sink = self.graph.sink();

        let mut cost = vec![u64::MAX; n];
        let mut entered_by: Vec<Option<EdgeId>> = vec![None; n];
        let mut heap = BinaryHeap::from([Reverse((0u64, source.index()))]);
        cost[source.index()] = 0;

        while let Some(Reverse((c, at))) = heap.pop() {
            if c > cost[at] {
                continue;
            }
            if at == sink.index() {
                break;
            }
            for e in self.graph.outgoing(NodeId(at)) {
                let to = self.graph.edge_by_id(*e).to().index();
                let next = c + 1 + usage[e.index()] * penalty;
                if next < cost[to] {
                    cost[to] = next;
                    entered_by[to] = Some(*e);
                    heap.push(Reverse((next, to)));
                }
            }
        }

        let mut route = Vec::new();
        let mut at = sink;
        while at != source {
            let edge = entered_by[at.index()]?;
            route.push(edge);
            at = self.graph.edge_by_id(edge).from();
        }
        route.reverse();
        Some(route)
    }

    fn sample<R: Rng>(&self, target: usize, rng: &mut R) -> Vec<Vec<EdgeId>> {
        let budget = 64 * self.graph.node_count().max(1);
        let mut seen = HashSet::new();
        let mut routes = Vec::new();

        for _ in 0..target.saturating_mul(self.config.sample_attempts) {
            if routes.len() >= target {
                break;
            }
            if let Some(route) = self.random_route(budget, rng) {
                if seen.insert(route.clone()) {
                    routes.push(route);
                }
            }
        }
        routes
    }

    fn random_route<R: Rng>(&self, budget: usize, rng: &mut R) -> Option<Vec<EdgeId>> {
        let source = self.graph.source();
        let sink = self.graph.sink();
        let mut on_route = vec![false; self.graph.node_count()];
        on_route[source.index()] = true;

        let shuffled = |node: NodeId, rng: &mut R| {
            let mut options = self.graph.outgoing(node).to_vec();
            options.shuffle(rng);
            options
        };

        let mut route = Vec::new();
        let mut stack = vec![(source, shuffled(source, &mut *rng))];
        for _ in 0..budget {
            let Some((node, options)) = stack.last_mut() else {
                return None;
            };
            let at = *node;
            let Some(edge) = options.pop() else {
                stack.pop();
                on_route[at.index()] = false;
                route.pop();
                continue;
            };

            let to = self.graph.edge_by_id(edge).to();
            if on_route[to.index()] {
                continue;
            }
            route.push(edge);
            if to == sink {
                return Some(route);
            }
            on_route[to.index()] = true;
            stack.push((to, shuffled(to, &mut *rng)));
        }
        None
    }
}
