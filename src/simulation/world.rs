//! RepositoryWorld - the main simulation state container

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::core::config::SimulationConfig;
use crate::core::error::{RepoError, Result};
use crate::core::types::{ItemId, Tick, UserId};
use crate::model::funnel::EngagementFunnel;
use crate::model::item::{AttractivityBounds, Item, ScoreWeights};
use crate::model::user::User;
use crate::simulation::cycle::CycleManager;
use crate::simulation::scheduler::{ActivationScheduler, Agent};
use crate::simulation::targeting::{RepositoryGrid, TargetSelector};

/// Aggregate engagement counters across the repository
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct TickTotals {
    pub tick: Tick,
    pub views: u64,
    pub downloads: u64,
    pub rates: u64,
    pub likes: u64,
}

/// Everything a run mutates
pub struct RepositoryWorld {
    pub config: SimulationConfig,
    /// Items, indexed by `ItemId`
    pub items: Vec<Item>,
    /// Users, indexed by `UserId`
    pub users: Vec<User>,
    pub grid: RepositoryGrid,
    pub scheduler: ActivationScheduler,
    pub funnel: EngagementFunnel,
    pub cycles: CycleManager,
    pub weights: ScoreWeights,
    /// Random number generator (deterministic)
    pub rng: ChaCha8Rng,
}

impl RepositoryWorld {
    /// Build items, users and their placement from a validated config
    pub fn new(config: SimulationConfig) -> Result<Self> {
        config.validate()?;

        let mut rng = ChaCha8Rng::seed_from_u64(config.seed);
        let bounds = AttractivityBounds::from_config(&config);
        let mut grid = RepositoryGrid::new(config.grid_width, config.grid_height);
        let mut scheduler = ActivationScheduler::new(config.activate_items);

        let mut items = Vec::with_capacity(config.item_count());
        for index in 0..config.item_count() {
            let id = ItemId(index as u32);
            let intrinsic = rng.gen_range(config.intrinsic_min..=config.intrinsic_max);
            items.push(Item::new(id, intrinsic, bounds));
            grid.place_item(id, grid.slot_coord(index))?;
            scheduler.add(Agent::Item(id));
        }

        let mut users = Vec::with_capacity(config.init_users as usize);
        for index in 0..config.init_users {
            let id = UserId(index);
            grid.place_randomly(id, &mut rng)?;
            let mut user = User::new(id);
            // Starts out on the item of its random cell
            user.target = grid.item_under(id);
            user.can_move = user.target.is_none();
            users.push(user);
            scheduler.add(Agent::User(id));
        }

        tracing::info!(
            items = items.len(),
            users = users.len(),
            seed = config.seed,
            "repository world created"
        );

        Ok(Self {
            funnel: EngagementFunnel::new(&config),
            cycles: CycleManager::new(&config),
            weights: ScoreWeights::from_config(&config),
            config,
            items,
            users,
            grid,
            scheduler,
            rng,
        })
    }

    pub fn current_tick(&self) -> Tick {
        self.scheduler.tick()
    }

    pub fn get_item(&self, id: ItemId) -> Option<&Item> {
        self.items.get(id.0 as usize)
    }

    pub fn get_item_mut(&mut self, id: ItemId) -> Option<&mut Item> {
        self.items.get_mut(id.0 as usize)
    }

    pub fn get_user(&self, id: UserId) -> Option<&User> {
        self.users.get(id.0 as usize)
    }

    pub fn total_views(&self) -> u64 {
        self.items.iter().map(|i| i.views).sum()
    }

    pub fn total_downloads(&self) -> u64 {
        self.items.iter().map(|i| i.downloads).sum()
    }

    pub fn total_rates(&self) -> u64 {
        self.items.iter().map(|i| i.rates).sum()
    }

    pub fn total_likes(&self) -> u64 {
        self.items.iter().map(|i| i.likes).sum()
    }

    pub fn totals(&self) -> TickTotals {
        TickTotals {
            tick: self.current_tick(),
            views: self.total_views(),
            downloads: self.total_downloads(),
            rates: self.total_rates(),
            likes: self.total_likes(),
        }
    }

    pub(crate) fn user_index(&self, id: UserId) -> Result<usize> {
        let index = id.0 as usize;
        if index < self.users.len() {
            Ok(index)
        } else {
            Err(RepoError::UserNotFound(id))
        }
    }
}
