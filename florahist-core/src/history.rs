//! Collection-wide monthly flowering history
//!
//! Builds one `FloweringPlant` per distinct plant from its records, spans a
//! shared month axis from the earliest inferred period start through the
//! current month, and resolves every plant's state at the first of each
//! month. Plants that end up with no period are dropped; a batch that
//! retains no plant at all yields an empty history rather than an error.

use std::collections::BTreeMap;

use chrono::{Datelike, Days, Months, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::gaps::GapEstimates;
use crate::period::{build_periods, FloweringPeriod};
use crate::record::FloweringCycleRecord;
use crate::resolve::resolve_state;
use crate::state::FlowerState;

/// A plant with all periods inferred from its records in one run.
#[derive(Debug, Clone)]
pub struct FloweringPlant {
    pub plant_id: i32,
    pub plant_name: String,
    pub periods: Vec<FloweringPeriod>,
}

impl FloweringPlant {
    /// Earliest period start, `None` when the plant has no period.
    pub fn earliest_period_start(&self) -> Option<NaiveDate> {
        self.periods.iter().map(|period| period.start).min()
    }
}

/// One cell of a history row: a month label plus the resolved state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlowerHistoryMonth {
    /// `"YYYY-MM"`, matching the shared axis
    pub month: String,
    pub flowering_state: FlowerState,
}

/// One plant's row across the shared month axis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlowerHistoryRow {
    pub plant_id: i32,
    pub plant_name: String,
    pub months: Vec<FlowerHistoryMonth>,
}

/// Monthly flowering-state table for a whole collection.
///
/// `months` is the shared axis (`"YYYY-MM"`, strictly increasing); every
/// row carries exactly one state per axis entry, rows ordered by each
/// plant's earliest period start. The default value is the "no flowering
/// history available" result.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlowerHistory {
    pub months: Vec<String>,
    pub rows: Vec<FlowerHistoryRow>,
}

/// Assemble the monthly history for a batch of records.
///
/// `today` bounds the month axis and closes still-open flowering windows;
/// passing it explicitly keeps the whole pipeline deterministic. Use
/// [`flower_history`] for the current-date convenience form.
pub fn assemble_history(records: &[FloweringCycleRecord], today: NaiveDate) -> FlowerHistory {
    let gaps = GapEstimates::from_records(records);

    // Group by plant; BTreeMap keeps grouping order independent of input order
    let mut by_plant: BTreeMap<i32, FloweringPlant> = BTreeMap::new();
    for record in records {
        let plant = by_plant
            .entry(record.plant_id)
            .or_insert_with(|| FloweringPlant {
                plant_id: record.plant_id,
                plant_name: record.plant_name.clone(),
                periods: Vec::new(),
            });
        plant.periods.extend(build_periods(record, &gaps, today));
    }

    let mut plants: Vec<FloweringPlant> = by_plant
        .into_values()
        .filter(|plant| !plant.periods.is_empty())
        .collect();

    let Some(earliest) = plants
        .iter()
        .filter_map(FloweringPlant::earliest_period_start)
        .min()
    else {
        debug!("No plant with a valid period in batch of {} records", records.len());
        return FlowerHistory::default();
    };

    // Earliest-flowering plant first; plant id breaks ties deterministically
    plants.sort_by_key(|plant| (plant.earliest_period_start(), plant.plant_id));

    let axis = month_axis(earliest, today);
    let months: Vec<String> = axis.iter().map(month_label).collect();

    let rows = plants
        .iter()
        .map(|plant| FlowerHistoryRow {
            plant_id: plant.plant_id,
            plant_name: plant.plant_name.clone(),
            months: axis
                .iter()
                .map(|first_of_month| FlowerHistoryMonth {
                    month: month_label(first_of_month),
                    flowering_state: resolve_state(&plant.periods, *first_of_month),
                })
                .collect(),
        })
        .collect();

    FlowerHistory { months, rows }
}

/// Assemble the monthly history up to the current UTC date.
pub fn flower_history(records: &[FloweringCycleRecord]) -> FlowerHistory {
    assemble_history(records, Utc::now().date_naive())
}

/// First-of-month dates from `from`'s month through `until`'s month,
/// inclusive. Empty when `from` lies in a later month than `until`.
fn month_axis(from: NaiveDate, until: NaiveDate) -> Vec<NaiveDate> {
    let mut axis = Vec::new();
    let mut cursor = first_of_month(from);
    let last = first_of_month(until);
    while cursor <= last {
        axis.push(cursor);
        cursor = cursor + Months::new(1);
    }
    axis
}

fn first_of_month(date: NaiveDate) -> NaiveDate {
    date - Days::new(u64::from(date.day0()))
}

fn month_label(first_of_month: &NaiveDate) -> String {
    first_of_month.format("%Y-%m").to_string()
}

#[cfg(test)]
#[path = "history_tests.rs"]
mod history_tests;
