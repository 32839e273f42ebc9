//! Simulation engine
//!
//! The world owns all state; each tick activates agents in shuffled order
//! and every `max_steps_per_cycle` ticks the cycle manager re-ranks items.

pub mod cycle;
pub mod run;
pub mod scheduler;
pub mod targeting;
pub mod tick;
pub mod world;

pub use cycle::{CycleManager, CycleRecord, EscalationRule, Intervention};
pub use run::simulate;
pub use scheduler::{ActivationScheduler, Agent};
pub use targeting::{Occupant, RepositoryGrid, TargetSelector};
pub use tick::run_simulation_tick;
pub use world::{RepositoryWorld, TickTotals};
