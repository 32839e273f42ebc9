//! Cycle boundary: ranking, main page promotion and escalation
//!
//! Runs once every `max_steps_per_cycle` ticks, in this order:
//! 1. score and rank every item
//! 2. promote the top items to the main page
//! 3. escalate long-running main page items (social network, refactor)
//! 4. recompute attractivity
//! 5. apply download/like delta bumps and snapshot the counters
//! 6. advance the cycle counter

use std::cmp::Reverse;

use ordered_float::OrderedFloat;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::core::config::SimulationConfig;
use crate::core::error::{RepoError, Result};
use crate::core::types::{Cycle, ItemId, Tick};
use crate::model::item::{AttractivityBounds, Item, ScoreWeights};

/// Intervention applied to items that stay on the main page long enough
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Intervention {
    /// One-time attractivity boost from social network exposure
    SocialNetwork { gain: f64 },
    /// Content overhaul that re-rolls the refactor bonus in `[min, max]`
    Refactor { min: f64, max: f64 },
}

/// An escalation rule: intervention after `window` consecutive cycles
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EscalationRule {
    pub window: usize,
    pub intervention: Intervention,
}

/// Score of one item at ranking time
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RankedItem {
    pub id: ItemId,
    pub score: f64,
}

/// One row of the per-cycle history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CycleRecord {
    pub cycle: Cycle,
    /// Total ticks elapsed when the cycle closed
    pub ticks: Tick,
    /// Lowest score
    pub first_score: f64,
    /// Highest score
    pub last_score: f64,
    pub delta_score: f64,
    pub main_page: Vec<ItemId>,
    /// Net main page bonus granted (entering minus leaving)
    pub main_page_gain: f64,
    pub social_gain: f64,
    /// Net change in refactor bonus across refactored items
    pub refactor_gain: f64,
}

/// Gain applied to a single item by an escalation pass
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EscalationEffect {
    pub id: ItemId,
    pub gain: f64,
}

/// Stable descending ranking; ties keep item order
pub fn rank_items(items: &[Item], weights: &ScoreWeights) -> Vec<RankedItem> {
    let mut ranking: Vec<RankedItem> = items
        .iter()
        .map(|item| RankedItem {
            id: item.id,
            score: item.compute_score(weights),
        })
        .collect();
    ranking.sort_by_key(|r| Reverse(OrderedFloat(r.score)));
    ranking
}

pub struct CycleManager {
    weights: ScoreWeights,
    bounds: AttractivityBounds,
    main_page_size: usize,
    main_page_gain: f64,
    boost_ceiling: f64,
    escalations: Vec<EscalationRule>,
    download_delta_threshold: u64,
    download_delta_gain: f64,
    like_delta_threshold: u64,
    like_delta_gain: f64,
    current_cycle: Cycle,
    main_page: Vec<ItemId>,
    history: Vec<CycleRecord>,
}

impl CycleManager {
    pub fn new(config: &SimulationConfig) -> Self {
        let mut escalations = Vec::new();
        if config.social_window > 0 {
            escalations.push(EscalationRule {
                window: config.social_window,
                intervention: Intervention::SocialNetwork {
                    gain: config.social_network_gain,
                },
            });
        }
        if config.refactor_window > 0 {
            escalations.push(EscalationRule {
                window: config.refactor_window,
                intervention: Intervention::Refactor {
                    min: config.refactor_min,
                    max: config.refactor_max,
                },
            });
        }

        Self {
            weights: ScoreWeights::from_config(config),
            bounds: AttractivityBounds::from_config(config),
            main_page_size: config.main_page_size,
            main_page_gain: config.main_page_gain,
            boost_ceiling: config.boost_ceiling,
            escalations,
            download_delta_threshold: config.download_delta_threshold,
            download_delta_gain: config.download_delta_gain,
            like_delta_threshold: config.like_delta_threshold,
            like_delta_gain: config.like_delta_gain,
            current_cycle: 0,
            main_page: Vec::new(),
            history: Vec::new(),
        }
    }

    pub fn current_cycle(&self) -> Cycle {
        self.current_cycle
    }

    pub fn main_page(&self) -> &[ItemId] {
        &self.main_page
    }

    pub fn history(&self) -> &[CycleRecord] {
        &self.history
    }

    pub fn escalations(&self) -> &[EscalationRule] {
        &self.escalations
    }

    /// Run every boundary step and record the cycle
    pub fn end_cycle<R: Rng>(&mut self, items: &mut [Item], ticks: Tick, rng: &mut R) -> Result<CycleRecord> {
        if items.is_empty() {
            return Err(RepoError::Configuration("cannot rank an empty repository".into()));
        }
        self.check_counters(items)?;

        // 1. Snapshot & rank
        let ranking = rank_items(items, &self.weights);
        let last_score = ranking.first().map(|r| r.score).unwrap_or(0.0);
        let first_score = ranking.last().map(|r| r.score).unwrap_or(0.0);

        // 2. Promote
        let main_page_gain = self.promote(items, &ranking);

        // 3. Escalate
        let mut social_gain = 0.0;
        let mut refactor_gain = 0.0;
        for rule in &self.escalations {
            let effects = self.check_consecutive_promotions(items, rule.window, rule.intervention, rng);
            let total: f64 = effects.iter().map(|e| e.gain).sum();
            match rule.intervention {
                Intervention::SocialNetwork { .. } => social_gain += total,
                Intervention::Refactor { .. } => refactor_gain += total,
            }
        }

        // 4. Recompute attractivity
        for item in items.iter_mut() {
            item.recompute_attractivity(self.bounds);
        }

        // 5. Delta bumps, then snapshot
        self.apply_delta_bumps(items);
        self.check_attractivity(items)?;

        let record = CycleRecord {
            cycle: self.current_cycle,
            ticks,
            first_score,
            last_score,
            delta_score: last_score - first_score,
            main_page: self.main_page.clone(),
            main_page_gain,
            social_gain,
            refactor_gain,
        };
        tracing::info!(
            cycle = record.cycle,
            ticks = record.ticks,
            delta = record.delta_score,
            main_page = ?record.main_page,
            "cycle closed"
        );
        self.history.push(record.clone());

        // 6. Advance
        self.current_cycle += 1;
        Ok(record)
    }

    /// Replace the main page with the top of `ranking`
    ///
    /// Returns the net attractivity bonus granted.
    pub fn promote(&mut self, items: &mut [Item], ranking: &[RankedItem]) -> f64 {
        let selected: Vec<ItemId> = ranking
            .iter()
            .take(self.main_page_size)
            .map(|r| r.id)
            .collect();

        let mut net_gain = 0.0;
        for item in items.iter_mut() {
            let was_on = item.is_on_main_page;
            let now_on = selected.contains(&item.id);
            item.is_on_main_page = now_on;

            if now_on {
                item.cycles_on_main_page.push(self.current_cycle);
            }
            match (was_on, now_on) {
                (false, true) => {
                    item.main_page_bonus += self.main_page_gain;
                    net_gain += self.main_page_gain;
                    tracing::debug!(item = %item.id, cycle = self.current_cycle, "promoted to main page");
                }
                (true, false) => {
                    item.main_page_bonus -= self.main_page_gain;
                    net_gain -= self.main_page_gain;
                    tracing::debug!(item = %item.id, cycle = self.current_cycle, "dropped from main page");
                }
                _ => {}
            }
        }

        self.main_page = selected;
        net_gain
    }

    /// Apply `intervention` to items on the main page for `window`
    /// consecutive cycles ending now
    pub fn check_consecutive_promotions<R: Rng>(
        &self,
        items: &mut [Item],
        window: usize,
        intervention: Intervention,
        rng: &mut R,
    ) -> Vec<EscalationEffect> {
        let mut effects = Vec::new();

        for item in items.iter_mut() {
            if !item.has_consecutive_run(window, self.current_cycle) {
                continue;
            }
            // Already evaluated for this run one cycle ago
            if item.run_extends_before_window(window) {
                continue;
            }

            match intervention {
                Intervention::SocialNetwork { gain } => {
                    if item.is_on_social_network || item.attractivity > self.boost_ceiling {
                        continue;
                    }
                    item.social_network_bonus += gain;
                    item.is_on_social_network = true;
                    item.recompute_attractivity(self.bounds);
                    tracing::debug!(item = %item.id, gain, "shared on social network");
                    effects.push(EscalationEffect { id: item.id, gain });
                }
                Intervention::Refactor { min, max } => {
                    let previous = item.refactored_bonus;
                    item.cycles_on_main_page.clear();
                    item.refactored_bonus = rng.gen_range(min..=max);
                    item.recompute_attractivity(self.bounds);
                    let gain = item.refactored_bonus - previous;
                    tracing::debug!(item = %item.id, bonus = item.refactored_bonus, "refactored");
                    effects.push(EscalationEffect { id: item.id, gain });
                }
            }
        }

        effects
    }

    fn apply_delta_bumps(&self, items: &mut [Item]) {
        for item in items.iter_mut() {
            if item.download_delta() >= self.download_delta_threshold
                && item.attractivity < self.boost_ceiling
            {
                item.engagement_bonus += self.download_delta_gain;
                item.recompute_attractivity(self.bounds);
            }
            if item.like_delta() >= self.like_delta_threshold && item.attractivity < self.boost_ceiling {
                item.engagement_bonus += self.like_delta_gain;
                item.recompute_attractivity(self.bounds);
            }
            item.snapshot_counters();
        }
    }

    fn check_counters(&self, items: &[Item]) -> Result<()> {
        for item in items {
            if item.downloads < item.last_cycle_downloads || item.likes < item.last_cycle_likes {
                return Err(RepoError::InvariantViolation(format!(
                    "item {} counters decreased since cycle {}",
                    item.id, self.current_cycle
                )));
            }
        }
        Ok(())
    }

    fn check_attractivity(&self, items: &[Item]) -> Result<()> {
        for item in items {
            if !self.bounds.contains(item.attractivity) {
                return Err(RepoError::InvariantViolation(format!(
                    "item {} attractivity {} outside [{}, {}]",
                    item.id, item.attractivity, self.bounds.floor, self.bounds.cap
                )));
            }
        }
        Ok(())
    }
}
