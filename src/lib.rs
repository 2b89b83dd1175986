//! Kitchen Duo - Two-Agent Cooperative Kitchen Simulation

pub mod agent;
pub mod core;
pub mod kitchen;
pub mod simulation;
