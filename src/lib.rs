//! Repository Usage - learning object repository simulation with a main page feedback loop

pub mod core;
pub mod model;
pub mod report;
pub mod simulation;
