//! Positioning and targeting
//!
//! Each grid cell holds exactly one item plus any number of visiting users.
//! Users do not random-walk: when free to move they jump to an item drawn
//! with probability proportional to its attractivity.

use ahash::AHashMap;
use rand::distributions::{Distribution, WeightedIndex};
use rand::Rng;

use crate::core::error::{RepoError, Result};
use crate::core::types::{GridCoord, ItemId, UserId};
use crate::model::item::Item;

/// Anything that can sit in a grid cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Occupant {
    Item(ItemId),
    User(UserId),
}

/// Collaborator that knows where agents are and picks user targets
pub trait TargetSelector {
    /// Put (or move) a user on a cell
    fn place(&mut self, user: UserId, coord: GridCoord) -> Result<()>;

    /// Everything currently on a cell
    fn colocated(&self, coord: GridCoord) -> &[Occupant];

    /// Cell the user currently occupies
    fn position_of(&self, user: UserId) -> Option<GridCoord>;

    /// Draw a new target weighted by attractivity and move the user there
    fn select_target<R: Rng>(&mut self, user: UserId, items: &[Item], rng: &mut R) -> Result<ItemId>;

    /// The item sharing a cell with the user, if any
    fn item_under(&self, user: UserId) -> Option<ItemId> {
        let coord = self.position_of(user)?;
        self.colocated(coord).iter().find_map(|occupant| match occupant {
            Occupant::Item(id) => Some(*id),
            Occupant::User(_) => None,
        })
    }
}

/// Attractivity-weighted draw over all items
pub fn weighted_random_item<R: Rng>(items: &[Item], rng: &mut R) -> Result<ItemId> {
    let weights: Vec<f64> = items.iter().map(|item| item.attractivity).collect();
    let sampler = WeightedIndex::new(&weights)
        .map_err(|e| RepoError::Targeting(format!("attractivity weight error: {e}")))?;
    Ok(items[sampler.sample(rng)].id)
}

/// Grid with one item per cell
pub struct RepositoryGrid {
    width: u32,
    height: u32,
    cells: AHashMap<GridCoord, Vec<Occupant>>,
    item_cells: AHashMap<ItemId, GridCoord>,
    user_cells: AHashMap<UserId, GridCoord>,
}

impl RepositoryGrid {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            cells: AHashMap::new(),
            item_cells: AHashMap::new(),
            user_cells: AHashMap::new(),
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Coordinate of the n-th item when filling the grid column by column
    pub fn slot_coord(&self, index: usize) -> GridCoord {
        let height = self.height.max(1) as usize;
        GridCoord::new((index / height) as u32, (index % height) as u32)
    }

    pub fn place_item(&mut self, item: ItemId, coord: GridCoord) -> Result<()> {
        self.check_bounds(coord)?;
        if let Some(existing) = self.item_at(coord) {
            return Err(RepoError::InvariantViolation(format!(
                "cell ({}, {}) already holds item {}",
                coord.x, coord.y, existing
            )));
        }
        self.cells.entry(coord).or_default().push(Occupant::Item(item));
        self.item_cells.insert(item, coord);
        Ok(())
    }

    pub fn item_at(&self, coord: GridCoord) -> Option<ItemId> {
        self.colocated(coord).iter().find_map(|occupant| match occupant {
            Occupant::Item(id) => Some(*id),
            Occupant::User(_) => None,
        })
    }

    pub fn coord_of_item(&self, item: ItemId) -> Option<GridCoord> {
        self.item_cells.get(&item).copied()
    }

    /// Place a user on a uniformly random cell
    pub fn place_randomly<R: Rng>(&mut self, user: UserId, rng: &mut R) -> Result<()> {
        let x = rng.gen_range(0..self.width);
        let y = rng.gen_range(0..self.height);
        self.place(user, GridCoord::new(x, y))
    }

    fn check_bounds(&self, coord: GridCoord) -> Result<()> {
        if coord.x >= self.width || coord.y >= self.height {
            return Err(RepoError::InvariantViolation(format!(
                "cell ({}, {}) outside {}x{} grid",
                coord.x, coord.y, self.width, self.height
            )));
        }
        Ok(())
    }

    fn remove_user(&mut self, user: UserId) {
        if let Some(coord) = self.user_cells.remove(&user) {
            if let Some(cell) = self.cells.get_mut(&coord) {
                cell.retain(|&o| o != Occupant::User(user));
            }
        }
    }
}

impl TargetSelector for RepositoryGrid {
    fn place(&mut self, user: UserId, coord: GridCoord) -> Result<()> {
        self.check_bounds(coord)?;
        self.remove_user(user);
        self.cells.entry(coord).or_default().push(Occupant::User(user));
        self.user_cells.insert(user, coord);
        Ok(())
    }

    fn colocated(&self, coord: GridCoord) -> &[Occupant] {
        self.cells.get(&coord).map(Vec::as_slice).unwrap_or(&[])
    }

    fn position_of(&self, user: UserId) -> Option<GridCoord> {
        self.user_cells.get(&user).copied()
    }

    fn select_target<R: Rng>(&mut self, user: UserId, items: &[Item], rng: &mut R) -> Result<ItemId> {
        let target = weighted_random_item(items, rng)?;
        let coord = self
            .coord_of_item(target)
            .ok_or(RepoError::ItemNotFound(target))?;
        self.place(user, coord)?;
        Ok(target)
    }
}
