//! Repository users - the only agents that act

use serde::{Deserialize, Serialize};

use crate::core::types::{ItemId, UserId};

/// Persistent position in the engagement funnel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum UserAction {
    #[default]
    None,
    Viewed,
    Downloaded,
}

/// What happened on the user's most recent activation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum FunnelOutcome {
    /// Not yet activated, or the view gate failed
    #[default]
    Idle,
    Viewed,
    Downloaded,
    /// Like gate failed and the rest of the draw passed the rate gate
    Rated,
    Liked,
    /// A download or like gate failed and the episode ended
    Dropped,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub action: UserAction,
    pub last_outcome: FunnelOutcome,
    /// False while locked onto the current target mid-episode
    pub can_move: bool,
    /// Item the user engages with; the user stands on its cell
    pub target: Option<ItemId>,
}

impl User {
    pub fn new(id: UserId) -> Self {
        Self {
            id,
            action: UserAction::None,
            last_outcome: FunnelOutcome::Idle,
            can_move: true,
            target: None,
        }
    }

    /// A user picks a new target when unlocked or never targeted
    pub fn needs_target(&self) -> bool {
        self.can_move || self.target.is_none()
    }
}
