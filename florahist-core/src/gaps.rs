//! Corpus-wide average-gap estimation
//!
//! Whenever a record is missing a boundary date needed to anchor a period,
//! the builder falls back to an average duration between two transition
//! events, measured across the whole input batch. Medians rather than means:
//! a few multi-year neglected specimens must not distort the fallback.
//!
//! A gap with zero qualifying samples is `None`; the builder treats that as
//! "cannot estimate this boundary" and abandons the affected period rather
//! than failing the batch.

use chrono::NaiveDate;

use crate::record::FloweringCycleRecord;

/// Median day-counts between transition events, derived once per batch.
///
/// Computed up front and passed explicitly into the period builder; never
/// cached process-wide, so per-plant computation stays freely
/// parallelizable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GapEstimates {
    /// Inflorescence appearance to first flower opening
    pub inflorescence_to_first_flower: Option<i64>,
    /// Inflorescence appearance to last flower closing
    pub inflorescence_to_last_flower: Option<i64>,
    /// First flower opening to last flower closing
    pub first_flower_to_last_flower: Option<i64>,
    /// First flower opening to first seed ripening
    pub first_flower_to_first_seed: Option<i64>,
    /// First flower opening to last seed ripening
    pub first_flower_to_last_seed: Option<i64>,
    /// First seed ripening to last seed ripening
    pub first_seed_to_last_seed: Option<i64>,
}

impl GapEstimates {
    /// Derive all gap estimates from the batch.
    ///
    /// Pure and deterministic: same batch, same estimates. Each gap only
    /// considers records where both of its dates are present.
    pub fn from_records(records: &[FloweringCycleRecord]) -> Self {
        GapEstimates {
            inflorescence_to_first_flower: median_gap(records, |r| {
                (r.inflorescence_appeared_at, r.first_flower_opened_at)
            }),
            inflorescence_to_last_flower: median_gap(records, |r| {
                (r.inflorescence_appeared_at, r.last_flower_closed_at)
            }),
            first_flower_to_last_flower: median_gap(records, |r| {
                (r.first_flower_opened_at, r.last_flower_closed_at)
            }),
            first_flower_to_first_seed: median_gap(records, |r| {
                (r.first_flower_opened_at, r.first_seed_ripening_at)
            }),
            first_flower_to_last_seed: median_gap(records, |r| {
                (r.first_flower_opened_at, r.last_seed_ripening_at)
            }),
            first_seed_to_last_seed: median_gap(records, |r| {
                (r.first_seed_ripening_at, r.last_seed_ripening_at)
            }),
        }
    }
}

/// Median day-count between a pair of dates over all records where both
/// are present. `None` when no record qualifies.
fn median_gap(
    records: &[FloweringCycleRecord],
    pair: impl Fn(&FloweringCycleRecord) -> (Option<NaiveDate>, Option<NaiveDate>),
) -> Option<i64> {
    let mut samples: Vec<i64> = records
        .iter()
        .filter_map(|record| {
            let (from, to) = pair(record);
            Some(to?.signed_duration_since(from?).num_days())
        })
        .collect();

    if samples.is_empty() {
        return None;
    }

    samples.sort_unstable();
    let mid = samples.len() / 2;
    if samples.len() % 2 == 1 {
        Some(samples[mid])
    } else {
        // Even count: truncating average of the two middle samples
        Some((samples[mid - 1] + samples[mid]) / 2)
    }
}
