//! Engagement funnel - view, download, like state machine
//!
//! One uniform draw per activation decides a single transition:
//!
//! ```text
//! None --view--> Viewed --download--> Downloaded --like--> (Liked) --> None
//!   \_fail: unlock    \_fail: None        \_fail: rate or drop --> None
//! ```
//!
//! Every gate uses the same attractivity-scaled test
//! `p < base ^ (1 - attractivity)`. A base chance of 0 never passes and 1
//! always passes; in between, attractive items convert better.
//!
//! The rate gate is conditional on the like gate failing. The failed part of
//! the draw, `[t_like, 1)`, is stretched back onto `[0, 1)` and tested against
//! the rate threshold, so a downloader still costs a single draw.

use rand::Rng;

use crate::core::config::SimulationConfig;
use crate::model::item::Item;
use crate::model::user::{FunnelOutcome, User, UserAction};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EngagementFunnel {
    view_chance: f64,
    download_chance: f64,
    rate_chance: f64,
    like_chance: f64,
    main_page_view_bonus: f64,
}

impl EngagementFunnel {
    pub fn new(config: &SimulationConfig) -> Self {
        Self {
            view_chance: config.view_chance,
            download_chance: config.download_chance,
            rate_chance: config.rate_chance,
            like_chance: config.like_chance,
            main_page_view_bonus: config.main_page_view_bonus,
        }
    }

    /// Success threshold for a gate with the given base chance
    pub fn threshold(base: f64, attractivity: f64) -> f64 {
        let base = base.clamp(0.0, 1.0);
        if base == 0.0 {
            return 0.0;
        }
        base.powf(1.0 - attractivity)
    }

    fn passes(p: f64, base: f64, attractivity: f64) -> bool {
        p < Self::threshold(base, attractivity)
    }

    /// Base view chance for an item, including the main page bonus
    pub fn view_base(&self, item: &Item) -> f64 {
        let bonus = if item.is_on_main_page {
            self.main_page_view_bonus
        } else {
            0.0
        };
        (self.view_chance + bonus).min(1.0)
    }

    /// Outcome of the final step for a downloader
    fn judge(&self, p: f64, attractivity: f64) -> FunnelOutcome {
        let like = Self::threshold(self.like_chance, attractivity);
        if p < like {
            return FunnelOutcome::Liked;
        }
        if like >= 1.0 {
            return FunnelOutcome::Dropped;
        }
        let q = (p - like) / (1.0 - like);
        if Self::passes(q, self.rate_chance, attractivity) {
            FunnelOutcome::Rated
        } else {
            FunnelOutcome::Dropped
        }
    }

    /// Draw once and advance
    pub fn advance<R: Rng>(&self, user: &mut User, item: &mut Item, rng: &mut R) -> FunnelOutcome {
        let p: f64 = rng.gen();
        self.step(user, item, p)
    }

    /// Apply one transition for the draw `p` in `[0, 1)`
    pub fn step(&self, user: &mut User, item: &mut Item, p: f64) -> FunnelOutcome {
        let attractivity = item.attractivity;

        let outcome = match user.action {
            UserAction::None => {
                if Self::passes(p, self.view_base(item), attractivity) {
                    item.views += 1;
                    user.action = UserAction::Viewed;
                    user.can_move = false;
                    FunnelOutcome::Viewed
                } else {
                    user.can_move = true;
                    FunnelOutcome::Idle
                }
            }
            UserAction::Viewed => {
                if Self::passes(p, self.download_chance, attractivity) {
                    item.downloads += 1;
                    user.action = UserAction::Downloaded;
                    user.can_move = false;
                    FunnelOutcome::Downloaded
                } else {
                    user.action = UserAction::None;
                    user.can_move = true;
                    FunnelOutcome::Dropped
                }
            }
            UserAction::Downloaded => {
                let outcome = self.judge(p, attractivity);
                match outcome {
                    FunnelOutcome::Liked => item.likes += 1,
                    FunnelOutcome::Rated => item.rates += 1,
                    _ => {}
                }
                // Episode is over whatever the outcome
                user.action = UserAction::None;
                user.can_move = true;
                outcome
            }
        };

        user.last_outcome = outcome;
        outcome
    }
}
