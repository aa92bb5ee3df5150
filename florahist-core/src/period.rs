//! Per-record period derivation
//!
//! For one `FloweringCycleRecord` the builder attempts, independently, one
//! period per state: inflorescence growing, flowering, seeds ripening. Each
//! attempt can succeed with verified boundaries (taken directly from input
//! dates), succeed with estimated boundaries (average-gap fallbacks or
//! "today"), or be abandoned when no estimation strategy applies.
//!
//! Boundary convention: the day a flower opens (or a seed capsule finishes)
//! is the first day of the *next* state, so ends derived from a next-state
//! date are shifted back by one day. A record contributing no period at all
//! is logged and skipped, never an error.

use chrono::{Duration, NaiveDate};
use tracing::{debug, warn};

use crate::gaps::GapEstimates;
use crate::record::{FlorescenceStatus, FloweringCycleRecord};
use crate::state::FlowerState;

/// One contiguous interval in which a plant is in a single flowering state.
///
/// Derived and ephemeral: owned by the computation that created it, never
/// persisted. `start_verified` / `end_verified` are true iff the boundary
/// came directly from an input date rather than an estimate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FloweringPeriod {
    pub start: NaiveDate,
    pub start_verified: bool,
    pub end: NaiveDate,
    pub end_verified: bool,
    /// Never `NotFlowering`; that sentinel is resolver output only
    pub state: FlowerState,
}

impl FloweringPeriod {
    /// Construct a period, rejecting inverted intervals.
    ///
    /// Inversion can happen when the caller's dates disagree with the
    /// corpus gaps (e.g. an estimated end landing before a known start);
    /// the period is dropped like any other abandoned estimate.
    fn checked(
        start: NaiveDate,
        start_verified: bool,
        end: NaiveDate,
        end_verified: bool,
        state: FlowerState,
    ) -> Option<FloweringPeriod> {
        if start > end {
            debug!(
                "Dropping inverted {:?} period: start={} end={}",
                state, start, end
            );
            return None;
        }
        Some(FloweringPeriod {
            start,
            start_verified,
            end,
            end_verified,
            state,
        })
    }

    /// True when `date` falls inside the period, both ends inclusive.
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

/// Derive all periods (zero to three) for one record.
///
/// `gaps` is the batch-wide estimate set from [`GapEstimates::from_records`];
/// `today` closes a still-open flowering window when no later date exists
/// anywhere in the record.
pub fn build_periods(
    record: &FloweringCycleRecord,
    gaps: &GapEstimates,
    today: NaiveDate,
) -> Vec<FloweringPeriod> {
    let mut periods = Vec::with_capacity(3);
    periods.extend(inflorescence_period(record, gaps));
    periods.extend(flowering_period(record, gaps, today));
    periods.extend(seed_ripening_period(record, gaps));

    if periods.is_empty() {
        warn!(
            "Record for plant {} ({}) yields no period at all",
            record.plant_id, record.plant_name
        );
    }
    periods
}

/// Shift a known date back by an average gap. Fails when either the date
/// or the gap is unavailable; one link of an estimation chain.
fn date_minus_gap(date: Option<NaiveDate>, gap: Option<i64>) -> Option<NaiveDate> {
    Some(date? - Duration::days(gap?))
}

/// Shift a known date forward by an average gap.
fn date_plus_gap(date: Option<NaiveDate>, gap: Option<i64>) -> Option<NaiveDate> {
    Some(date? + Duration::days(gap?))
}

/// Estimate the first-flower-opening date from later-chain dates, nearest
/// link first. Shared by the inflorescence end and flowering start paths.
fn estimated_first_flower(
    record: &FloweringCycleRecord,
    gaps: &GapEstimates,
) -> Option<NaiveDate> {
    date_minus_gap(record.last_flower_closed_at, gaps.first_flower_to_last_flower)
        .or_else(|| {
            date_minus_gap(record.first_seed_ripening_at, gaps.first_flower_to_first_seed)
        })
        .or_else(|| date_minus_gap(record.last_seed_ripening_at, gaps.first_flower_to_last_seed))
}

/// Inflorescence-growing period: from inflorescence appearance until the
/// day before the first flower opens.
fn inflorescence_period(
    record: &FloweringCycleRecord,
    gaps: &GapEstimates,
) -> Option<FloweringPeriod> {
    match (record.inflorescence_appeared_at, record.first_flower_opened_at) {
        // Both boundary dates known
        (Some(appeared), Some(first_flower)) => FloweringPeriod::checked(
            appeared,
            true,
            first_flower - Duration::days(1),
            true,
            FlowerState::InflorescenceGrowing,
        ),
        // Start known, end estimated through the later-date chain
        (Some(appeared), None) => {
            let Some(first_flower) = estimated_first_flower(record, gaps) else {
                debug!(
                    "Abandoned inflorescence period for plant {} ({}): no estimate for first flower",
                    record.plant_id, record.plant_name
                );
                return None;
            };
            FloweringPeriod::checked(
                appeared,
                true,
                first_flower - Duration::days(1),
                false,
                FlowerState::InflorescenceGrowing,
            )
        }
        // End known, start estimated one average gap back
        (None, Some(first_flower)) => {
            let Some(appeared) =
                date_minus_gap(Some(first_flower), gaps.inflorescence_to_first_flower)
            else {
                debug!(
                    "Abandoned inflorescence period for plant {} ({}): no appearance gap available",
                    record.plant_id, record.plant_name
                );
                return None;
            };
            FloweringPeriod::checked(
                appeared,
                false,
                first_flower - Duration::days(1),
                true,
                FlowerState::InflorescenceGrowing,
            )
        }
        (None, None) => None,
    }
}

/// Flowering period: from first flower opening through last flower closing.
///
/// The closing date itself stays inside the period; only estimated ends and
/// next-state hand-offs use the exclusive-end shift.
fn flowering_period(
    record: &FloweringCycleRecord,
    gaps: &GapEstimates,
    today: NaiveDate,
) -> Option<FloweringPeriod> {
    match (record.first_flower_opened_at, record.last_flower_closed_at) {
        (Some(opened), Some(closed)) => {
            FloweringPeriod::checked(opened, true, closed, true, FlowerState::Flowering)
        }
        (Some(opened), None) => {
            // Later seed dates first; "today" only for a cycle that is
            // still flowering with no later date anywhere in the record.
            let estimated_end = date_minus_gap(
                record.first_seed_ripening_at,
                gaps.first_flower_to_first_seed,
            )
            .or_else(|| {
                date_minus_gap(record.last_seed_ripening_at, gaps.first_flower_to_last_seed)
            })
            .map(|estimated_close| estimated_close - Duration::days(1))
            .or_else(|| {
                (record.status == FlorescenceStatus::Flowering && record.has_no_seed_dates())
                    .then_some(today)
            });

            let Some(end) = estimated_end else {
                debug!(
                    "Abandoned flowering period for plant {} ({}): no estimate for last flower",
                    record.plant_id, record.plant_name
                );
                return None;
            };
            FloweringPeriod::checked(opened, true, end, false, FlowerState::Flowering)
        }
        (None, Some(closed)) => {
            let Some(opened) = date_minus_gap(Some(closed), gaps.first_flower_to_last_flower)
            else {
                debug!(
                    "Abandoned flowering period for plant {} ({}): no flower-span gap available",
                    record.plant_id, record.plant_name
                );
                return None;
            };
            FloweringPeriod::checked(
                opened,
                false,
                closed - Duration::days(1),
                true,
                FlowerState::Flowering,
            )
        }
        (None, None) => None,
    }
}

/// Seed-ripening period.
///
/// The start is never taken from an input field directly: with both flower
/// dates known it is the midpoint between them, marked verified by
/// convention so downstream consumers keep their provenance branching.
fn seed_ripening_period(
    record: &FloweringCycleRecord,
    gaps: &GapEstimates,
) -> Option<FloweringPeriod> {
    let midpoint = match (record.first_flower_opened_at, record.last_flower_closed_at) {
        (Some(opened), Some(closed)) => {
            Some(opened + Duration::days(closed.signed_duration_since(opened).num_days() / 2))
        }
        _ => None,
    };

    if let Some(start) = midpoint {
        let (end, end_verified) = if let Some(last_seed) = record.last_seed_ripening_at {
            (last_seed, true)
        } else if let Some(end) =
            date_plus_gap(record.first_seed_ripening_at, gaps.first_seed_to_last_seed)
        {
            (end, false)
        } else if let Some(end) = date_plus_gap(Some(start), gaps.first_seed_to_last_seed) {
            (end, false)
        } else {
            debug!(
                "Abandoned seed ripening period for plant {} ({}): no seed-span gap available",
                record.plant_id, record.plant_name
            );
            return None;
        };
        return FloweringPeriod::checked(start, true, end, end_verified, FlowerState::SeedsRipening);
    }

    // No midpoint available: anchor on the last ripening date if present
    if let Some(last_seed) = record.last_seed_ripening_at {
        let Some(start) = date_minus_gap(Some(last_seed), gaps.first_seed_to_last_seed) else {
            debug!(
                "Abandoned seed ripening period for plant {} ({}): no seed-span gap available",
                record.plant_id, record.plant_name
            );
            return None;
        };
        return FloweringPeriod::checked(start, false, last_seed, true, FlowerState::SeedsRipening);
    }

    debug!(
        "No seed ripening period for plant {} ({}): no usable dates",
        record.plant_id, record.plant_name
    );
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    fn record(
        inflorescence: Option<&str>,
        first_flower: Option<&str>,
        last_flower: Option<&str>,
        first_seed: Option<&str>,
        last_seed: Option<&str>,
    ) -> FloweringCycleRecord {
        FloweringCycleRecord {
            plant_id: 7,
            plant_name: "Haworthia truncata".to_string(),
            status: FlorescenceStatus::Finished,
            inflorescence_appeared_at: inflorescence.map(d),
            first_flower_opened_at: first_flower.map(d),
            last_flower_closed_at: last_flower.map(d),
            first_seed_ripening_at: first_seed.map(d),
            last_seed_ripening_at: last_seed.map(d),
        }
    }

    fn period_for(periods: &[FloweringPeriod], state: FlowerState) -> Option<FloweringPeriod> {
        periods.iter().copied().find(|p| p.state == state)
    }

    const TODAY: &str = "2021-08-15";

    // ========================================================================
    // Fully dated records
    // ========================================================================

    #[test]
    fn test_fully_dated_record_growing_and_flowering() {
        let rec = record(
            Some("2021-03-01"),
            Some("2021-05-01"),
            Some("2021-06-01"),
            None,
            None,
        );
        let gaps = GapEstimates::from_records(std::slice::from_ref(&rec));
        let periods = build_periods(&rec, &gaps, d(TODAY));

        let growing = period_for(&periods, FlowerState::InflorescenceGrowing).unwrap();
        assert_eq!(growing.start, d("2021-03-01"));
        assert_eq!(growing.end, d("2021-04-30"));
        assert!(growing.start_verified);
        assert!(growing.end_verified);

        let flowering = period_for(&periods, FlowerState::Flowering).unwrap();
        assert_eq!(flowering.start, d("2021-05-01"));
        assert_eq!(flowering.end, d("2021-06-01"));
        assert!(flowering.start_verified);
        assert!(flowering.end_verified);

        // No seed dates in the whole batch: no seed-span gap, no seed period
        assert!(period_for(&periods, FlowerState::SeedsRipening).is_none());
    }

    #[test]
    fn test_seed_period_starts_at_flowering_midpoint() {
        let rec = record(
            Some("2021-03-01"),
            Some("2021-05-01"),
            Some("2021-06-01"),
            None,
            Some("2021-07-01"),
        );
        let gaps = GapEstimates::from_records(std::slice::from_ref(&rec));
        let periods = build_periods(&rec, &gaps, d(TODAY));

        let ripening = period_for(&periods, FlowerState::SeedsRipening).unwrap();
        // Midpoint of 2021-05-01..2021-06-01 (31 days, truncating half)
        assert_eq!(ripening.start, d("2021-05-16"));
        assert_eq!(ripening.end, d("2021-07-01"));
        assert!(ripening.start_verified);
        assert!(ripening.end_verified);
    }

    // ========================================================================
    // Estimated boundaries
    // ========================================================================

    #[test]
    fn test_open_flowering_of_active_plant_ends_today() {
        let mut rec = record(None, Some("2021-05-01"), None, None, None);
        rec.status = FlorescenceStatus::Flowering;
        let gaps = GapEstimates::default();
        let periods = build_periods(&rec, &gaps, d(TODAY));

        let flowering = period_for(&periods, FlowerState::Flowering).unwrap();
        assert_eq!(flowering.start, d("2021-05-01"));
        assert!(flowering.start_verified);
        assert_eq!(flowering.end, d(TODAY));
        assert!(!flowering.end_verified);
    }

    #[test]
    fn test_later_chain_date_beats_today_for_open_flowering() {
        let mut rec = record(None, Some("2021-05-01"), None, Some("2021-06-17"), None);
        rec.status = FlorescenceStatus::Flowering;
        let gaps = GapEstimates {
            first_flower_to_first_seed: Some(30),
            ..GapEstimates::default()
        };
        let periods = build_periods(&rec, &gaps, d(TODAY));

        let flowering = period_for(&periods, FlowerState::Flowering).unwrap();
        // 2021-06-17 - 30d - 1d, not "today"
        assert_eq!(flowering.end, d("2021-05-17"));
        assert!(!flowering.end_verified);
    }

    #[test]
    fn test_unusable_later_chain_date_suppresses_today_fallback() {
        // A seed date exists but the batch has no sample for its gap, so
        // neither the estimate nor "today" applies: the period is abandoned.
        let mut rec = record(None, Some("2021-05-01"), None, Some("2021-06-17"), None);
        rec.status = FlorescenceStatus::Flowering;
        let periods = build_periods(&rec, &GapEstimates::default(), d(TODAY));
        assert!(period_for(&periods, FlowerState::Flowering).is_none());
    }

    #[test]
    fn test_finished_record_without_close_date_is_abandoned() {
        let rec = record(None, Some("2021-05-01"), None, None, None);
        let periods = build_periods(&rec, &GapEstimates::default(), d(TODAY));
        assert!(period_for(&periods, FlowerState::Flowering).is_none());
    }

    #[test]
    fn test_growing_end_estimated_through_last_flower() {
        let rec = record(Some("2021-03-01"), None, Some("2021-06-01"), None, None);
        let gaps = GapEstimates {
            first_flower_to_last_flower: Some(18),
            ..GapEstimates::default()
        };
        let periods = build_periods(&rec, &gaps, d(TODAY));

        let growing = period_for(&periods, FlowerState::InflorescenceGrowing).unwrap();
        assert_eq!(growing.start, d("2021-03-01"));
        assert!(growing.start_verified);
        // Estimated first flower 2021-05-14, minus the hand-off day
        assert_eq!(growing.end, d("2021-05-13"));
        assert!(!growing.end_verified);
    }

    #[test]
    fn test_growing_end_chain_falls_through_to_seed_dates() {
        let rec = record(Some("2021-03-01"), None, None, None, Some("2021-06-25"));
        let gaps = GapEstimates {
            first_flower_to_last_seed: Some(55),
            ..GapEstimates::default()
        };
        let periods = build_periods(&rec, &gaps, d(TODAY));

        let growing = period_for(&periods, FlowerState::InflorescenceGrowing).unwrap();
        // 2021-06-25 - 55d = 2021-05-01, minus the hand-off day
        assert_eq!(growing.end, d("2021-04-30"));
        assert!(!growing.end_verified);
    }

    #[test]
    fn test_growing_start_estimated_from_first_flower() {
        let rec = record(None, Some("2021-05-01"), Some("2021-06-01"), None, None);
        let gaps = GapEstimates {
            inflorescence_to_first_flower: Some(38),
            ..GapEstimates::default()
        };
        let periods = build_periods(&rec, &gaps, d(TODAY));

        let growing = period_for(&periods, FlowerState::InflorescenceGrowing).unwrap();
        assert_eq!(growing.start, d("2021-03-24"));
        assert!(!growing.start_verified);
        assert_eq!(growing.end, d("2021-04-30"));
        assert!(growing.end_verified);
    }

    #[test]
    fn test_flowering_start_estimated_from_close_date() {
        let rec = record(None, None, Some("2021-06-01"), None, None);
        let gaps = GapEstimates {
            first_flower_to_last_flower: Some(18),
            ..GapEstimates::default()
        };
        let periods = build_periods(&rec, &gaps, d(TODAY));

        let flowering = period_for(&periods, FlowerState::Flowering).unwrap();
        assert_eq!(flowering.start, d("2021-05-14"));
        assert!(!flowering.start_verified);
        assert_eq!(flowering.end, d("2021-05-31"));
        assert!(flowering.end_verified);
    }

    #[test]
    fn test_seed_end_estimated_from_first_ripening() {
        let rec = record(
            None,
            Some("2021-05-01"),
            Some("2021-06-01"),
            Some("2021-06-17"),
            None,
        );
        let gaps = GapEstimates {
            first_seed_to_last_seed: Some(8),
            ..GapEstimates::default()
        };
        let periods = build_periods(&rec, &gaps, d(TODAY));

        let ripening = period_for(&periods, FlowerState::SeedsRipening).unwrap();
        assert_eq!(ripening.start, d("2021-05-16"));
        assert_eq!(ripening.end, d("2021-06-25"));
        assert!(ripening.start_verified);
        assert!(!ripening.end_verified);
    }

    #[test]
    fn test_seed_end_estimated_from_midpoint_when_no_ripening_dates() {
        let rec = record(None, Some("2021-05-01"), Some("2021-06-01"), None, None);
        let gaps = GapEstimates {
            first_seed_to_last_seed: Some(8),
            ..GapEstimates::default()
        };
        let periods = build_periods(&rec, &gaps, d(TODAY));

        let ripening = period_for(&periods, FlowerState::SeedsRipening).unwrap();
        assert_eq!(ripening.start, d("2021-05-16"));
        assert_eq!(ripening.end, d("2021-05-24"));
        assert!(!ripening.end_verified);
    }

    #[test]
    fn test_seed_period_anchored_on_last_ripening_only() {
        let rec = record(None, None, None, None, Some("2021-06-25"));
        let gaps = GapEstimates {
            first_seed_to_last_seed: Some(8),
            ..GapEstimates::default()
        };
        let periods = build_periods(&rec, &gaps, d(TODAY));

        let ripening = period_for(&periods, FlowerState::SeedsRipening).unwrap();
        assert_eq!(ripening.start, d("2021-06-17"));
        assert!(!ripening.start_verified);
        assert_eq!(ripening.end, d("2021-06-25"));
        assert!(ripening.end_verified);
    }

    // ========================================================================
    // Abandonment and invariants
    // ========================================================================

    #[test]
    fn test_bare_record_yields_nothing() {
        let rec = record(None, None, None, None, None);
        assert!(build_periods(&rec, &GapEstimates::default(), d(TODAY)).is_empty());
    }

    #[test]
    fn test_gap_starved_batch_abandons_periods_quietly() {
        let rec = record(None, Some("2021-05-01"), None, None, Some("2021-06-25"));
        // No gap has a sample: every estimation link fails
        let periods = build_periods(&rec, &GapEstimates::default(), d(TODAY));
        assert!(periods.is_empty());
    }

    #[test]
    fn test_inverted_estimate_is_dropped() {
        // Known appearance after the estimated first flower
        let rec = record(Some("2021-06-01"), None, Some("2021-06-03"), None, None);
        let gaps = GapEstimates {
            first_flower_to_last_flower: Some(18),
            ..GapEstimates::default()
        };
        let periods = build_periods(&rec, &gaps, d(TODAY));
        assert!(period_for(&periods, FlowerState::InflorescenceGrowing).is_none());
    }

    #[test]
    fn test_all_produced_periods_are_well_ordered() {
        let rec = record(
            Some("2021-03-01"),
            Some("2021-05-01"),
            Some("2021-06-01"),
            Some("2021-06-17"),
            Some("2021-06-25"),
        );
        let gaps = GapEstimates::from_records(std::slice::from_ref(&rec));
        let periods = build_periods(&rec, &gaps, d(TODAY));
        assert_eq!(periods.len(), 3);
        for period in &periods {
            assert!(period.start <= period.end, "{period:?}");
        }
    }
}
