//! View models backing the rider and administrator screens.
//!
//! Views own their data and a [`CancelToken`](crate::gateway::CancelToken);
//! closing (or dropping) a view cancels its outstanding calls so late
//! results are never applied.

pub mod cooperative;
pub mod members;
pub mod stats;
pub mod toggle;

pub use cooperative::CooperativeView;
pub use members::{aggregate_members, try_aggregate_members, MembersView};
pub use toggle::{ToggleKey, ToggleOutcome, ToggleTracker};
