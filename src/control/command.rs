use crate::error::CommandError;
use std::fmt;

#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    SetFlow { path: String, flow: f64 },
    UpdateFlow { path: String, delta: f64 },
    Saturate { path: String },
    ClearAll,
    Distribute { total: f64 },
    DisableEdge { edge: String },
    EnableEdge { edge: String },
    Hold,
}

#[derive(Clone, Debug, PartialEq)]
pub enum CommandEffect {
    FlowSet {
        path: String,
        from: f64,
        to: f64,
    },
    Saturated {
        path: String,
        from: f64,
        to: f64,
        bottleneck: String,
    },
    AlreadySaturated {
        path: String,
        flow: f64,
        bottleneck: String,
    },
    Cleared {
        paths: usize,
    },
    Distributed {
        per_path: f64,
        paths: usize,
    },
    EdgeDisabled {
        edge: String,
        cleared: Vec<String>,
    },
    EdgeEnabled {
        edge: String,
        capacity: f64,
    },
    Held,
}

impl fmt::Display for CommandEffect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommandEffect::FlowSet { path, from, to } => {
                write!(f, "Path {path} flow {from:.2} -> {to:.2}")
            }
            CommandEffect::Saturated {
                path,
                from,
                to,
                bottleneck,
            } => write!(
                f,
                "Path {path} saturated: {from:.2} -> {to:.2} (bottleneck: {bottleneck})"
            ),
            CommandEffect::AlreadySaturated {
                path,
                flow,
                bottleneck,
            } => write!(
                f,
                "Path {path} already saturated at {flow:.2} (bottleneck: {bottleneck})"
            ),
            CommandEffect::Cleared { paths } => write!(f, "Cleared flow on {paths} paths"),
            CommandEffect::Distributed { per_path, paths } => {
                write!(f, "Distributed {per_path:.2} to each of {paths} paths")
            }
            CommandEffect::EdgeDisabled { edge, cleared } if cleared.is_empty() => {
                write!(f, "Edge {edge} disabled")
            }
            CommandEffect::EdgeDisabled { edge, cleared } => {
                write!(f, "Edge {edge} disabled (cleared flows: {})", cleared.join(", "))
            }
            CommandEffect::EdgeEnabled { edge, capacity } => {
                write!(f, "Edge {edge} enabled (capacity: {capacity:.2})")
            }
            CommandEffect::Held => write!(f, "No change"),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct CommandReply {
    pub ok: bool,
    pub message: String,
}

impl CommandReply {
    pub fn rejected(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            message: message.into(),
        }
    }
}

impl From<Result<CommandEffect, CommandError>> for CommandReply {
    fn from(result: Result<CommandEffect, CommandError>) -> Self {
        match result {
            Ok(effect) => Self {
                ok: true,
                message: effect.to_string(),
            },
            Err(err) => Self::rejected(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{NotFoundError, ValidationError};

    #[test]
    fn test_reply_from_effect_and_error() {
        let ok = CommandReply::from(Ok(CommandEffect::EdgeDisabled {
            edge: "e3".to_string(),
            cleared: vec!["P1".to_string(), "P3".to_string()],
        }));
        assert!(ok.ok);
        assert_eq!("Edge e3 disabled (cleared flows: P1, P3)", ok.message);

        let rejected = CommandReply::from(Err(CommandError::from(
            ValidationError::CapacityExceeded {
                edge: "e3".to_string(),
                overflow: 2.0,
            },
        )));
        assert!(!rejected.ok);
        assert_eq!("edge e3 would exceed capacity by 2.00", rejected.message);

        let missing = CommandReply::from(Err(CommandError::from(NotFoundError::Path(
            "P9".to_string(),
        ))));
        assert_eq!("path P9 not found", missing.message);
    }
}
