//! # Florahist Core
//!
//! Flowering life-cycle period inference engine:
//! - Input model for flowering-cycle records (`FloweringCycleRecord`)
//! - Corpus-wide average-gap estimation (`GapEstimates`)
//! - Per-record period derivation with provenance flags (`FloweringPeriod`)
//! - Point-in-time state resolution (`resolve_state`)
//! - Collection-wide monthly history assembly (`FlowerHistory`)
//!
//! The engine is purely functional over an in-memory batch: no persistence,
//! no network, no shared mutable state. The caller fetches records once and
//! hands them over; everything else happens here.

pub mod gaps;
pub mod history;
pub mod period;
pub mod record;
pub mod resolve;
pub mod state;

pub use gaps::GapEstimates;
pub use history::{
    assemble_history, flower_history, FlowerHistory, FlowerHistoryMonth, FlowerHistoryRow,
    FloweringPlant,
};
pub use period::{build_periods, FloweringPeriod};
pub use record::{FlorescenceStatus, FloweringCycleRecord};
pub use resolve::resolve_state;
pub use state::FlowerState;
