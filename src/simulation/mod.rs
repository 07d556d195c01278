pub mod alerts;
pub mod dynamics;
pub mod engine;
