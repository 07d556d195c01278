pub mod maxflow;
pub mod paths;
