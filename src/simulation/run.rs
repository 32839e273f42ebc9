//! Main simulation loop

use crate::core::config::SimulationConfig;
use crate::core::error::Result;
use crate::report::output::SimulationOutput;
use crate::simulation::tick::run_simulation_tick;
use crate::simulation::world::RepositoryWorld;

/// Run `config.cycles` full cycles and collect the output
pub fn simulate(config: SimulationConfig) -> Result<SimulationOutput> {
    let start = std::time::Instant::now();
    let world = RepositoryWorld::new(config)?;
    run_world(world, start)
}

/// Drive an already built world to completion
pub fn run_world(mut world: RepositoryWorld, start: std::time::Instant) -> Result<SimulationOutput> {
    let total_ticks = world.config.total_ticks();
    let mut ticks = Vec::new();

    tracing::info!(
        cycles = world.config.cycles,
        steps_per_cycle = world.config.max_steps_per_cycle,
        "simulation starting"
    );

    for _ in 0..total_ticks {
        let report = run_simulation_tick(&mut world)?;
        ticks.push(report.totals);
    }

    let elapsed = start.elapsed();
    tracing::info!(
        ticks = world.current_tick(),
        elapsed_ms = elapsed.as_millis() as u64,
        "simulation complete"
    );

    Ok(SimulationOutput::new(&world, ticks, elapsed))
}
