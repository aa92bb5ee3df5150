//! Point-in-time state resolution
//!
//! Given all periods of one plant, pick the single state applicable at a
//! query date. Estimation-derived periods of different states may overlap;
//! the fixed priority in `FlowerState::priority` decides which one a viewer
//! gets to see.

use chrono::NaiveDate;

use crate::period::FloweringPeriod;
use crate::state::FlowerState;

/// Resolve the flowering state of a plant at `at`.
///
/// Every period containing `at` (inclusive on both ends) is considered;
/// with no match the result is `NotFlowering`. Overlapping periods of the
/// same state are legal and do not change the outcome.
pub fn resolve_state(periods: &[FloweringPeriod], at: NaiveDate) -> FlowerState {
    periods
        .iter()
        .filter(|period| period.contains(at))
        .map(|period| period.state)
        .max_by_key(|state| state.priority())
        .unwrap_or(FlowerState::NotFlowering)
}
