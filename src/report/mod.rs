//! Run reporting: per-tick totals, per-cycle rows and export formats

pub mod output;

pub use output::{SimulationOutput, SimulationStats, CYCLE_CSV_HEADER};
