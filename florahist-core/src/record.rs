//! Input model for the period inference engine
//!
//! A `FloweringCycleRecord` is one reproductive cycle of one plant, as
//! recorded by the caller: up to five optionally-known calendar dates plus
//! the cycle's lifecycle status. Records are read-only to this crate; the
//! caller fetches them once (typically pre-filtered to cycles it considers
//! relevant) and the engine processes whatever it is given.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Lifecycle status of a flowering cycle.
///
/// Wire form matches the record store (`"inflorescence_appeared"`,
/// `"flowering"`, `"finished"`, `"aborted"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlorescenceStatus {
    /// Inflorescence visible, no flower has opened yet
    InflorescenceAppeared,
    /// At least one flower currently open
    Flowering,
    /// Last flower has closed
    Finished,
    /// Cycle ended before any flower opened
    Aborted,
}

/// One flowering cycle of one plant.
///
/// Where two dates are both present, the earlier-named one is assumed to be
/// chronologically <= the later-named one; the engine trusts the caller's
/// data and does not validate this. A plant may own zero or many records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FloweringCycleRecord {
    pub plant_id: i32,
    pub plant_name: String,
    pub status: FlorescenceStatus,
    /// Day the inflorescence became visible
    pub inflorescence_appeared_at: Option<NaiveDate>,
    /// Day the first flower opened
    pub first_flower_opened_at: Option<NaiveDate>,
    /// Day the last flower closed
    pub last_flower_closed_at: Option<NaiveDate>,
    /// Day the first seed capsule finished ripening
    pub first_seed_ripening_at: Option<NaiveDate>,
    /// Day the last seed capsule finished ripening
    pub last_seed_ripening_at: Option<NaiveDate>,
}

impl FloweringCycleRecord {
    /// True when the record carries no seed-ripening date at all.
    ///
    /// Used by the period builder's tie-break: an open-ended flowering
    /// window may only be closed with "today" when no later-chain date
    /// exists anywhere in the record.
    pub(crate) fn has_no_seed_dates(&self) -> bool {
        self.first_seed_ripening_at.is_none() && self.last_seed_ripening_at.is_none()
    }
}
