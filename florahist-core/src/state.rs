//! Flowering state sum type
//!
//! The three period states plus the `NotFlowering` sentinel. Keeping this a
//! closed enum makes the resolver's priority ladder exhaustive: adding a
//! state forces every match over it to be revisited at compile time.

use serde::{Deserialize, Serialize};

/// Flowering state of a plant at a point in time.
///
/// `NotFlowering` is output-only: it is never stored in a period, only
/// returned by the resolver when no period covers the query date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlowerState {
    InflorescenceGrowing,
    Flowering,
    SeedsRipening,
    NotFlowering,
}

impl FlowerState {
    /// Resolver precedence when several periods cover the same date.
    ///
    /// Overlap between states only arises from estimation-derived
    /// boundaries (e.g. a ripening estimate overlapping a still-open
    /// flowering window); the more advanced, more visible state wins.
    pub(crate) fn priority(self) -> u8 {
        match self {
            FlowerState::Flowering => 3,
            FlowerState::SeedsRipening => 2,
            FlowerState::InflorescenceGrowing => 1,
            FlowerState::NotFlowering => 0,
        }
    }
}
