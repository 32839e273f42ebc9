//! Simulation output and serialization

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::core::config::SimulationConfig;
use crate::core::error::Result;
use crate::core::types::{ItemId, Tick};
use crate::model::item::Item;
use crate::simulation::cycle::CycleRecord;
use crate::simulation::world::{RepositoryWorld, TickTotals};

/// Header of the per-cycle CSV export
pub const CYCLE_CSV_HEADER: &str =
    "cycle,ticks,first_score,last_score,delta_score,main_page_ids,main_page_gain,social_gain,refactor_gain";

/// Complete simulation output
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SimulationOutput {
    pub config: SimulationConfig,
    pub final_items: Vec<Item>,
    pub main_page: Vec<ItemId>,
    pub cycles: Vec<CycleRecord>,
    /// Repository totals collected after every tick
    pub ticks: Vec<TickTotals>,
    pub statistics: SimulationStats,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SimulationStats {
    pub ticks_simulated: Tick,
    pub cycles_completed: u32,
    pub simulation_time_ms: u64,
    pub total_views: u64,
    pub total_downloads: u64,
    pub total_rates: u64,
    pub total_likes: u64,
    pub items_ever_promoted: u32,
    pub items_on_social_network: u32,
}

impl SimulationOutput {
    pub fn new(world: &RepositoryWorld, ticks: Vec<TickTotals>, elapsed: Duration) -> Self {
        let cycles = world.cycles.history().to_vec();

        let mut promoted: Vec<ItemId> = cycles.iter().flat_map(|c| c.main_page.iter().copied()).collect();
        promoted.sort();
        promoted.dedup();

        let items_on_social_network = world
            .items
            .iter()
            .filter(|i| i.is_on_social_network)
            .count() as u32;

        Self {
            config: world.config.clone(),
            final_items: world.items.clone(),
            main_page: world.cycles.main_page().to_vec(),
            statistics: SimulationStats {
                ticks_simulated: world.current_tick(),
                cycles_completed: cycles.len() as u32,
                simulation_time_ms: elapsed.as_millis() as u64,
                total_views: world.total_views(),
                total_downloads: world.total_downloads(),
                total_rates: world.total_rates(),
                total_likes: world.total_likes(),
                items_ever_promoted: promoted.len() as u32,
                items_on_social_network,
            },
            cycles,
            ticks,
        }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self)?)
    }

    /// One row per cycle; main page ids are space separated
    pub fn to_csv(&self) -> String {
        let mut out = String::new();
        out.push_str(CYCLE_CSV_HEADER);
        out.push('\n');
        for record in &self.cycles {
            let ids: Vec<String> = record.main_page.iter().map(|id| id.to_string()).collect();
            out.push_str(&format!(
                "{},{},{:.4},{:.4},{:.4},{},{:.4},{:.4},{:.4}\n",
                record.cycle,
                record.ticks,
                record.first_score,
                record.last_score,
                record.delta_score,
                ids.join(" "),
                record.main_page_gain,
                record.social_gain,
                record.refactor_gain,
            ));
        }
        out
    }

    pub fn summary(&self) -> String {
        format!(
            "Simulated {} ticks ({} cycles) in {}ms\n{} views, {} downloads, {} rates, {} likes\n{} items reached the main page, {} shared on social network",
            self.statistics.ticks_simulated,
            self.statistics.cycles_completed,
            self.statistics.simulation_time_ms,
            self.statistics.total_views,
            self.statistics.total_downloads,
            self.statistics.total_rates,
            self.statistics.total_likes,
            self.statistics.items_ever_promoted,
            self.statistics.items_on_social_network,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulation::simulate;

    fn small_output() -> SimulationOutput {
        simulate(SimulationConfig {
            init_users: 10,
            cycles: 3,
            max_steps_per_cycle: 20,
            ..Default::default()
        })
        .unwrap()
    }

    #[test]
    fn test_csv_has_row_per_cycle() {
        let output = small_output();
        let csv = output.to_csv();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0], CYCLE_CSV_HEADER);
        assert!(lines[1].starts_with("0,20,"));
        assert_eq!(lines[1].split(',').count(), 9);
    }

    #[test]
    fn test_csv_rows_list_main_page_ids() {
        let output = small_output();
        let csv = output.to_csv();
        assert!(csv.ends_with('\n'));
        for (line, record) in csv.lines().skip(1).zip(&output.cycles) {
            let ids = line.split(',').nth(5).unwrap();
            assert_eq!(ids.split(' ').count(), record.main_page.len());
        }
    }

    #[test]
    fn test_json_round_trips_statistics() {
        let output = small_output();
        let json = output.to_json().unwrap();
        let parsed: SimulationOutput = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.statistics.ticks_simulated, 60);
        assert_eq!(parsed.cycles.len(), 3);
    }

    #[test]
    fn test_tick_series_matches_final_totals() {
        let output = small_output();
        assert_eq!(output.ticks.len(), 60);
        let last = output.ticks.last().unwrap();
        assert_eq!(last.views, output.statistics.total_views);
        assert_eq!(last.likes, output.statistics.total_likes);
    }
}
