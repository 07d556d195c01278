pub mod edge_state;
pub mod event;
pub mod network_state;
pub mod snapshot;
