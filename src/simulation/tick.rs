//! Tick system - one scheduler pass over every agent
//!
//! Draw order per tick is fixed: the roster shuffle first, then for each
//! activated user its target draw (only when free to move) followed by its
//! funnel draw. Cycle boundaries run after the last tick of a cycle.

use crate::core::error::{RepoError, Result};
use crate::core::types::{ItemId, UserId};
use crate::model::user::FunnelOutcome;
use crate::simulation::cycle::CycleRecord;
use crate::simulation::scheduler::Agent;
use crate::simulation::targeting::TargetSelector;
use crate::simulation::world::{RepositoryWorld, TickTotals};

/// Result of a single tick
#[derive(Debug, Clone)]
pub struct TickReport {
    pub totals: TickTotals,
    /// Present when this tick closed a cycle
    pub cycle: Option<CycleRecord>,
}

/// Advance the world by one tick, closing the cycle when it is due
pub fn run_simulation_tick(world: &mut RepositoryWorld) -> Result<TickReport> {
    let order = world.scheduler.next_order(&mut world.rng);

    for agent in order {
        match agent {
            Agent::Item(id) => activate_item(world, id)?,
            Agent::User(id) => {
                activate_user(world, id)?;
            }
        }
    }

    let tick = world.current_tick();
    let cycle = if tick % world.config.max_steps_per_cycle as u64 == 0 {
        Some(world.cycles.end_cycle(&mut world.items, tick, &mut world.rng)?)
    } else {
        None
    };

    Ok(TickReport {
        totals: world.totals(),
        cycle,
    })
}

fn activate_item(world: &mut RepositoryWorld, id: ItemId) -> Result<()> {
    let weights = world.weights;
    let item = world.get_item_mut(id).ok_or(RepoError::ItemNotFound(id))?;
    item.refresh_score(&weights);
    Ok(())
}

/// Re-target if free, then take one funnel step on the target item
pub fn activate_user(world: &mut RepositoryWorld, id: UserId) -> Result<FunnelOutcome> {
    let index = world.user_index(id)?;

    if world.users[index].needs_target() {
        let target = world.grid.select_target(id, &world.items, &mut world.rng)?;
        world.users[index].target = Some(target);
    }

    let Some(item_id) = world.users[index].target else {
        world.users[index].can_move = true;
        return Ok(FunnelOutcome::Idle);
    };
    if world.grid.item_under(id) != Some(item_id) {
        return Err(RepoError::Targeting(format!(
            "user {} is not on the cell of its target {}",
            id, item_id
        )));
    }

    let item = world
        .items
        .get_mut(item_id.0 as usize)
        .ok_or(RepoError::ItemNotFound(item_id))?;
    let user = &mut world.users[index];
    let outcome = world.funnel.advance(user, item, &mut world.rng);

    tracing::trace!(user = %id, item = %item_id, ?outcome, "funnel step");
    Ok(outcome)
}
