pub mod command;
pub mod controller;
pub mod flow_controller;
