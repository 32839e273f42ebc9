//! Learning objects - the static content items users engage with

use serde::{Deserialize, Serialize};

use crate::core::config::SimulationConfig;
use crate::core::types::{Cycle, ItemId};

/// Weights used to fold engagement counters into a single score
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreWeights {
    pub view: f64,
    pub download: f64,
    pub rate: f64,
    pub like: f64,
}

impl ScoreWeights {
    pub fn from_config(config: &SimulationConfig) -> Self {
        Self {
            view: config.view_weight,
            download: config.download_weight,
            rate: config.rate_weight,
            like: config.like_weight,
        }
    }

    pub fn sum(&self) -> f64 {
        self.view + self.download + self.rate + self.like
    }
}

/// Attractivity clamp bounds, taken from the config once
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AttractivityBounds {
    pub floor: f64,
    pub cap: f64,
}

impl AttractivityBounds {
    pub fn from_config(config: &SimulationConfig) -> Self {
        Self {
            floor: config.attractivity_floor,
            cap: config.attractivity_cap,
        }
    }

    /// The single clamp applied after every additive change
    pub fn clamp(&self, value: f64) -> f64 {
        value.clamp(self.floor, self.cap)
    }

    pub fn contains(&self, value: f64) -> bool {
        value.is_finite() && value >= self.floor && value <= self.cap
    }
}

/// A learning object sitting in one repository slot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Item {
    pub id: ItemId,

    // Engagement counters, never decrease
    pub views: u64,
    pub downloads: u64,
    pub rates: u64,
    pub likes: u64,

    /// Counters as of the previous cycle boundary
    pub last_cycle_downloads: u64,
    pub last_cycle_likes: u64,

    /// Baseline drawn once at creation
    pub intrinsic_value: f64,
    pub main_page_bonus: f64,
    pub social_network_bonus: f64,
    pub refactored_bonus: f64,
    /// Accumulated download/like delta bumps
    pub engagement_bonus: f64,

    /// Derived; only the cycle manager refreshes it
    pub attractivity: f64,
    /// Cached display score, refreshed on item activation
    pub score: f64,

    pub cycles_on_main_page: Vec<Cycle>,
    pub is_on_main_page: bool,
    pub is_on_social_network: bool,
}

impl Item {
    pub fn new(id: ItemId, intrinsic_value: f64, bounds: AttractivityBounds) -> Self {
        Self {
            id,
            views: 0,
            downloads: 0,
            rates: 0,
            likes: 0,
            last_cycle_downloads: 0,
            last_cycle_likes: 0,
            intrinsic_value,
            main_page_bonus: 0.0,
            social_network_bonus: 0.0,
            refactored_bonus: 0.0,
            engagement_bonus: 0.0,
            attractivity: bounds.clamp(intrinsic_value),
            score: 0.0,
            cycles_on_main_page: Vec::new(),
            is_on_main_page: false,
            is_on_social_network: false,
        }
    }

    /// Weighted average of the engagement counters
    ///
    /// Callers guarantee a positive weight sum (checked by config validation).
    pub fn compute_score(&self, weights: &ScoreWeights) -> f64 {
        let weighted = weights.view * self.views as f64
            + weights.download * self.downloads as f64
            + weights.rate * self.rates as f64
            + weights.like * self.likes as f64;
        weighted / weights.sum()
    }

    /// Refresh the cached display score
    pub fn refresh_score(&mut self, weights: &ScoreWeights) -> f64 {
        self.score = self.compute_score(weights);
        self.score
    }

    /// Raw sum of baseline and bonuses, before clamping
    pub fn raw_attractivity(&self) -> f64 {
        self.intrinsic_value
            + self.main_page_bonus
            + self.social_network_bonus
            + self.refactored_bonus
            + self.engagement_bonus
    }

    pub fn recompute_attractivity(&mut self, bounds: AttractivityBounds) -> f64 {
        self.attractivity = bounds.clamp(self.raw_attractivity());
        self.attractivity
    }

    pub fn download_delta(&self) -> u64 {
        self.downloads.saturating_sub(self.last_cycle_downloads)
    }

    pub fn like_delta(&self) -> u64 {
        self.likes.saturating_sub(self.last_cycle_likes)
    }

    pub fn snapshot_counters(&mut self) {
        self.last_cycle_downloads = self.downloads;
        self.last_cycle_likes = self.likes;
    }

    /// Whether the last `window` main page cycles form an unbroken run
    /// ending at `current_cycle`
    pub fn has_consecutive_run(&self, window: usize, current_cycle: Cycle) -> bool {
        if window == 0 || self.cycles_on_main_page.len() < window {
            return false;
        }
        let tail = &self.cycles_on_main_page[self.cycles_on_main_page.len() - window..];
        let sequential = tail.windows(2).all(|pair| pair[0] + 1 == pair[1]);
        sequential && tail.last() == Some(&current_cycle)
    }

    /// Whether the run was already longer than `window` one cycle ago,
    /// meaning an escalation for this run has already been evaluated
    pub fn run_extends_before_window(&self, window: usize) -> bool {
        let len = self.cycles_on_main_page.len();
        if len <= window {
            return false;
        }
        let before = self.cycles_on_main_page[len - window - 1];
        let first = self.cycles_on_main_page[len - window];
        before + 1 == first
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bounds() -> AttractivityBounds {
        AttractivityBounds { floor: 0.05, cap: 0.95 }
    }

    fn equal_weights() -> ScoreWeights {
        ScoreWeights { view: 1.0, download: 1.0, rate: 0.0, like: 1.0 }
    }

    #[test]
    fn test_zero_counters_score_zero() {
        let item = Item::new(ItemId(0), 0.5, bounds());
        assert_eq!(item.compute_score(&equal_weights()), 0.0);
    }

    #[test]
    fn test_equal_counters_equal_weights_score_is_counter() {
        let mut item = Item::new(ItemId(0), 0.5, bounds());
        item.views = 4;
        item.downloads = 4;
        item.likes = 4;
        assert!((item.compute_score(&equal_weights()) - 4.0).abs() < 1e-12);
    }

    #[test]
    fn test_weighted_score() {
        let mut item = Item::new(ItemId(0), 0.5, bounds());
        item.views = 10;
        item.downloads = 5;
        item.likes = 2;
        let weights = ScoreWeights { view: 2.0, download: 4.0, rate: 0.0, like: 7.0 };
        let expected = (20.0 + 20.0 + 14.0) / 13.0;
        assert!((item.compute_score(&weights) - expected).abs() < 1e-12);
    }

    #[test]
    fn test_attractivity_is_clamped() {
        let mut item = Item::new(ItemId(0), 0.9, bounds());
        item.main_page_bonus = 0.5;
        assert_eq!(item.recompute_attractivity(bounds()), 0.95);

        item.main_page_bonus = 0.0;
        item.refactored_bonus = -2.0;
        assert_eq!(item.recompute_attractivity(bounds()), 0.05);
    }

    #[test]
    fn test_consecutive_run_detected() {
        let mut item = Item::new(ItemId(0), 0.5, bounds());
        item.cycles_on_main_page = vec![3, 4, 5, 6];
        assert!(item.has_consecutive_run(4, 6));
        assert!(!item.has_consecutive_run(4, 7));
        assert!(!item.run_extends_before_window(4));
    }

    #[test]
    fn test_gap_breaks_run() {
        let mut item = Item::new(ItemId(0), 0.5, bounds());
        item.cycles_on_main_page = vec![3, 4, 6];
        assert!(!item.has_consecutive_run(4, 6));
        assert!(!item.has_consecutive_run(3, 6));
        assert!(!item.has_consecutive_run(0, 6));
    }

    #[test]
    fn test_run_extending_before_window() {
        let mut item = Item::new(ItemId(0), 0.5, bounds());
        item.cycles_on_main_page = vec![2, 3, 4, 5, 6];
        assert!(item.has_consecutive_run(4, 6));
        assert!(item.run_extends_before_window(4));

        item.cycles_on_main_page = vec![1, 3, 4, 5, 6];
        assert!(!item.run_extends_before_window(4));
    }

    #[test]
    fn test_deltas_since_snapshot() {
        let mut item = Item::new(ItemId(0), 0.5, bounds());
        item.downloads = 12;
        item.likes = 3;
        assert_eq!(item.download_delta(), 12);
        item.snapshot_counters();
        item.downloads = 15;
        assert_eq!(item.download_delta(), 3);
        assert_eq!(item.like_delta(), 0);
    }
}
