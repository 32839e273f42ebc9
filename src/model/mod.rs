//! Repository entities
//!
//! Items are passive learning objects; users walk the engagement funnel
//! against whichever item they currently target.

pub mod funnel;
pub mod item;
pub mod user;

pub use funnel::EngagementFunnel;
pub use item::{AttractivityBounds, Item, ScoreWeights};
pub use user::{FunnelOutcome, User, UserAction};
