pub mod config;
pub mod error;
pub mod types;

pub use config::SimulationConfig;
pub use error::{RepoError, Result};
pub use types::{Cycle, GridCoord, ItemId, Tick, UserId};
