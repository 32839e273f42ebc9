//! Simulation configuration with documented constants
//!
//! Every tunable of the engagement funnel and of the ranking cycle lives
//! here. The struct is built once and handed to the world by value; nothing
//! reads parameters from global state.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::error::{RepoError, Result};

/// Upper bound on `cycles * max_steps_per_cycle` for a single run
pub const MAX_TOTAL_TICKS: u64 = 100_000_000;

/// Configuration for a repository usage run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    // === POPULATION ===
    /// Number of users placed on the grid at start
    pub init_users: u32,

    /// Grid width. Every cell holds exactly one item, so the item count is
    /// `grid_width * grid_height`.
    pub grid_width: u32,

    /// Grid height
    pub grid_height: u32,

    // === SCORE WEIGHTS ===
    /// Weight of views in the ranking score
    pub view_weight: f64,

    /// Weight of downloads in the ranking score
    pub download_weight: f64,

    /// Weight of rates in the ranking score
    ///
    /// Defaults to 0 so the score is the plain view/download/like average.
    pub rate_weight: f64,

    /// Weight of likes in the ranking score
    pub like_weight: f64,

    // === FUNNEL CHANCES (all in [0, 1]) ===
    /// Base chance that a user views the item it landed on
    pub view_chance: f64,

    /// Base chance that a viewer goes on to download
    pub download_chance: f64,

    /// Base chance that a downloader who did not like the item rates it.
    /// Applied conditionally on the like gate failing
    pub rate_chance: f64,

    /// Base chance that a downloader likes the item
    pub like_chance: f64,

    /// Added to the view chance while the item is on the main page
    pub main_page_view_bonus: f64,

    // === CYCLES ===
    /// Ticks per ranking cycle
    pub max_steps_per_cycle: u32,

    /// Number of cycles the driver runs
    pub cycles: u32,

    /// How many top items are promoted to the main page
    pub main_page_size: usize,

    /// Display flag only; the engine never reads it
    pub show_main_page: bool,

    /// Attractivity bonus held by an item while it is on the main page
    pub main_page_gain: f64,

    // === ESCALATION ===
    /// Consecutive main page cycles before the social network boost
    ///
    /// Zero disables the rule.
    pub social_window: usize,

    /// One-time attractivity bonus granted by the social network boost
    pub social_network_gain: f64,

    /// Consecutive main page cycles before a refactor
    ///
    /// Zero disables the rule.
    pub refactor_window: usize,

    /// Lower bound of the re-rolled refactor bonus (may be negative)
    pub refactor_min: f64,

    /// Upper bound of the re-rolled refactor bonus
    pub refactor_max: f64,

    // === ATTRACTIVITY BOUNDS ===
    /// Boosts only apply while attractivity is at or below this ceiling
    pub boost_ceiling: f64,

    /// Hard lower clamp on attractivity
    pub attractivity_floor: f64,

    /// Hard upper clamp on attractivity
    ///
    /// Must stay below 1.0: the funnel gate uses `1 - attractivity` as an
    /// exponent and needs it strictly positive.
    pub attractivity_cap: f64,

    /// Lower bound of the intrinsic value drawn per item
    pub intrinsic_min: f64,

    /// Upper bound of the intrinsic value drawn per item
    pub intrinsic_max: f64,

    // === DELTA BUMPS ===
    /// Downloads gained within one cycle that earn a bump
    pub download_delta_threshold: u64,

    /// Attractivity bump for crossing the download delta
    pub download_delta_gain: f64,

    /// Likes gained within one cycle that earn a bump
    pub like_delta_threshold: u64,

    /// Attractivity bump for crossing the like delta
    pub like_delta_gain: f64,

    // === SCHEDULING ===
    /// Whether items are activated by the scheduler (refreshes display score)
    pub activate_items: bool,

    /// Seed for the world RNG
    pub seed: u64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            init_users: 50,
            grid_width: 5,
            grid_height: 5,

            view_weight: 2.0,
            download_weight: 4.0,
            rate_weight: 0.0,
            like_weight: 7.0,

            view_chance: 0.5,
            download_chance: 0.3,
            rate_chance: 0.2,
            like_chance: 0.2,
            main_page_view_bonus: 0.3,

            max_steps_per_cycle: 100,
            cycles: 20,
            main_page_size: 5,
            show_main_page: false,
            main_page_gain: 0.1,

            social_window: 3,
            social_network_gain: 0.1,
            refactor_window: 5,
            refactor_min: -0.2,
            refactor_max: 0.3,

            boost_ceiling: 0.65,
            attractivity_floor: 0.05,
            attractivity_cap: 0.95,
            intrinsic_min: 0.1,
            intrinsic_max: 0.9,

            download_delta_threshold: 10,
            download_delta_gain: 0.1,
            like_delta_threshold: 5,
            like_delta_gain: 0.2,

            activate_items: true,
            seed: 42,
        }
    }
}

impl SimulationConfig {
    /// Create a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a config from TOML; missing keys fall back to defaults
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: SimulationConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a TOML config file
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Number of items implied by the grid size
    pub fn item_count(&self) -> usize {
        self.grid_width as usize * self.grid_height as usize
    }

    /// Sum of the four score weights
    pub fn weight_sum(&self) -> f64 {
        self.view_weight + self.download_weight + self.rate_weight + self.like_weight
    }

    /// Ticks a full run takes
    pub fn total_ticks(&self) -> u64 {
        self.cycles as u64 * self.max_steps_per_cycle as u64
    }

    /// Reject configurations the engine cannot run
    pub fn validate(&self) -> Result<()> {
        if self.item_count() == 0 {
            return Err(config_error(format!(
                "grid {}x{} holds no items",
                self.grid_width, self.grid_height
            )));
        }
        if self.init_users == 0 {
            return Err(config_error("init_users must be at least 1".into()));
        }
        if self.max_steps_per_cycle == 0 {
            return Err(config_error("max_steps_per_cycle must be at least 1".into()));
        }

        let weights = [
            ("view_weight", self.view_weight),
            ("download_weight", self.download_weight),
            ("rate_weight", self.rate_weight),
            ("like_weight", self.like_weight),
        ];
        for (name, weight) in weights {
            if !weight.is_finite() || weight < 0.0 {
                return Err(config_error(format!("{} ({}) must be >= 0", name, weight)));
            }
        }
        if self.weight_sum() <= 0.0 {
            return Err(config_error("score weights sum to zero".into()));
        }

        let chances = [
            ("view_chance", self.view_chance),
            ("download_chance", self.download_chance),
            ("rate_chance", self.rate_chance),
            ("like_chance", self.like_chance),
            ("main_page_view_bonus", self.main_page_view_bonus),
        ];
        for (name, chance) in chances {
            if !(0.0..=1.0).contains(&chance) {
                return Err(config_error(format!("{} ({}) must be in [0, 1]", name, chance)));
            }
        }

        if self.main_page_size > self.item_count() {
            return Err(config_error(format!(
                "main_page_size ({}) exceeds item count ({})",
                self.main_page_size,
                self.item_count()
            )));
        }

        let reals = [
            ("main_page_gain", self.main_page_gain),
            ("social_network_gain", self.social_network_gain),
            ("refactor_min", self.refactor_min),
            ("refactor_max", self.refactor_max),
            ("boost_ceiling", self.boost_ceiling),
            ("attractivity_floor", self.attractivity_floor),
            ("attractivity_cap", self.attractivity_cap),
            ("intrinsic_min", self.intrinsic_min),
            ("intrinsic_max", self.intrinsic_max),
            ("download_delta_gain", self.download_delta_gain),
            ("like_delta_gain", self.like_delta_gain),
        ];
        for (name, value) in reals {
            if !value.is_finite() {
                return Err(config_error(format!("{} ({}) must be finite", name, value)));
            }
        }

        if self.attractivity_floor <= 0.0
            || self.attractivity_cap >= 1.0
            || self.attractivity_floor >= self.attractivity_cap
        {
            return Err(config_error(format!(
                "attractivity bounds [{}, {}] must satisfy 0 < floor < cap < 1",
                self.attractivity_floor, self.attractivity_cap
            )));
        }
        if self.boost_ceiling > self.attractivity_cap {
            return Err(config_error(format!(
                "boost_ceiling ({}) exceeds attractivity_cap ({})",
                self.boost_ceiling, self.attractivity_cap
            )));
        }
        if self.intrinsic_min <= 0.0
            || self.intrinsic_max >= 1.0
            || self.intrinsic_min > self.intrinsic_max
        {
            return Err(config_error(format!(
                "intrinsic range [{}, {}] must satisfy 0 < min <= max < 1",
                self.intrinsic_min, self.intrinsic_max
            )));
        }
        if self.refactor_min > self.refactor_max {
            return Err(config_error(format!(
                "refactor range [{}, {}] is inverted",
                self.refactor_min, self.refactor_max
            )));
        }
        if self.total_ticks() > MAX_TOTAL_TICKS {
            return Err(config_error(format!(
                "cycles ({}) x max_steps_per_cycle ({}) exceeds {} ticks",
                self.cycles, self.max_steps_per_cycle, MAX_TOTAL_TICKS
            )));
        }

        Ok(())
    }
}

fn config_error(message: String) -> RepoError {
    RepoError::Configuration(message)
}
