use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum DefinitionError {
    #[error("network must contain exactly one source node, found {found}")]
    SourceCount { found: usize },

    #[error("network must contain exactly one sink node, found {found}")]
    SinkCount { found: usize },

    #[error("duplicate node id '{0}'")]
    DuplicateNode(String),

    #[error("duplicate edge id '{0}'")]
    DuplicateEdge(String),

    #[error("duplicate path id '{0}'")]
    DuplicatePath(String),

    #[error("unknown node kind '{kind}' for node '{node}'")]
    UnknownNodeKind { node: String, kind: String },

    #[error("edge '{edge}' references unknown node '{node}'")]
    UnknownEndpoint { edge: String, node: String },

    #[error("edge '{edge}' has invalid capacity {capacity}")]
    InvalidCapacity { edge: String, capacity: f64 },

    #[error("node '{0}' is not reachable from the source")]
    UnreachableFromSource(String),

    #[error("node '{0}' cannot reach the sink")]
    CannotReachSink(String),

    #[error("path '{path}' references unknown edge '{edge}'")]
    UnknownPathEdge { path: String, edge: String },

    #[error("path '{path}' is not a simple source-to-sink route: {reason}")]
    MalformedPath { path: String, reason: String },

    #[error("no source-to-sink paths available")]
    NoPaths,
}

/// A flow command would break a capacity or sign constraint. The command is
/// rejected and no state changes.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("edge {edge} would exceed capacity by {overflow:.2}")]
    CapacityExceeded { edge: String, overflow: f64 },

    #[error("flow on path {path} would become negative ({flow:.2})")]
    NegativeFlow { path: String, flow: f64 },

    #[error("flow amount {0} is not a finite non-negative number")]
    InvalidAmount(f64),

    #[error("path {path} is blocked at edge {edge}")]
    PathBlocked { path: String, edge: String },

    #[error("edge {0} is already disabled")]
    EdgeAlreadyDisabled(String),

    #[error("edge {0} is already enabled")]
    EdgeAlreadyEnabled(String),
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum NotFoundError {
    #[error("path {0} not found")]
    Path(String),

    #[error("edge {0} not found")]
    Edge(String),

    #[error("node {0} not found")]
    Node(String),
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum CommandError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    NotFound(#[from] NotFoundError),
}

/// An internal invariant was found broken after a committed operation.
/// Indicates a bug in the core, never a user error.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SimulationError {
    #[error("flow conservation violated at node {node}: imbalance {imbalance:.6}")]
    Conservation { node: String, imbalance: f64 },

    #[error("edge {edge} carries {flow:.6} over capacity {capacity:.6}")]
    CapacityBound {
        edge: String,
        flow: f64,
        capacity: f64,
    },

    #[error("failed edge {edge} still carries flow {flow:.6}")]
    FlowOnFailedEdge { edge: String, flow: f64 },

    #[error("path {path} carries negative flow {flow:.6}")]
    NegativePathFlow { path: String, flow: f64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ClockError {
    #[error("simulation has terminated")]
    Terminated,
}
