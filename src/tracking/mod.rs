//! Motion-smoothed pose tracking.
//!
//! Three layers, leaf to root:
//! - [`PositionTracker`]: smoothed world/local linear velocity of one node
//! - [`AngleTracker`]: signed per-axis angles and smoothed angular velocity
//!   of a tracking node relative to an aligned surface transform
//! - [`NodeTracker`]: the per-frame pose composer that ray-casts for a
//!   surface, feeds the trackers, and writes the final transform back

pub mod angle_tracker;
pub mod node_tracker;
pub mod position_tracker;

pub use angle_tracker::AngleTracker;
pub use node_tracker::NodeTracker;
pub use position_tracker::PositionTracker;
